//! services/api/src/adapters/identity.rs
//!
//! Email/password identity backed by the database: argon2 password hashes and
//! server-side browser sessions. Implements the `IdentityService` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use study_planner_core::domain::{SignedIn, UserProfile};
use study_planner_core::ports::{IdentityService, PortError, PortResult};
use tracing::{info, warn};
use uuid::Uuid;

use crate::adapters::db::DbAdapter;

/// How long a browser session stays valid after sign-in.
pub const SESSION_TTL_DAYS: i64 = 30;

#[derive(Clone)]
pub struct PasswordIdentityAdapter {
    db: DbAdapter,
}

impl PasswordIdentityAdapter {
    pub fn new(db: DbAdapter) -> Self {
        Self { db }
    }

    async fn open_session(&self, profile: UserProfile) -> PortResult<SignedIn> {
        let session_token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        self.db
            .create_auth_session(&session_token, profile.id, expires_at)
            .await?;

        Ok(SignedIn {
            profile,
            session_token,
            expires_at,
        })
    }
}

fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hashed_password: &str) -> PortResult<bool> {
    let parsed_hash = PasswordHash::new(hashed_password)
        .map_err(|e| PortError::Unexpected(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[async_trait]
impl IdentityService for PasswordIdentityAdapter {
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        picture: Option<&str>,
    ) -> PortResult<SignedIn> {
        let hashed_password = hash_password(password)?;
        let profile = self
            .db
            .create_user(name, email, picture, &hashed_password)
            .await?;
        info!("Created user {}", profile.id);
        self.open_session(profile).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<SignedIn> {
        let credentials = self.db.get_user_by_email(email).await.map_err(|e| match e {
            PortError::NotFound(_) => PortError::Unauthorized,
            other => other,
        })?;

        if !verify_password(password, &credentials.hashed_password)? {
            warn!("Rejected sign-in for user {}", credentials.profile.id);
            return Err(PortError::Unauthorized);
        }

        self.open_session(credentials.profile).await
    }

    async fn sign_out(&self, session_token: &str) -> PortResult<()> {
        self.db.delete_auth_session(session_token).await
    }

    async fn authenticate(&self, session_token: &str) -> PortResult<Uuid> {
        self.db.validate_auth_session(session_token).await
    }

    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile> {
        self.db.get_user_by_id(user_id).await
    }
}
