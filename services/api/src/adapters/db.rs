//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `PlanRepository` port from the `core` crate. It also stores the users and
//! browser sessions behind the password identity adapter. All interactions go to
//! PostgreSQL through `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use study_planner_core::domain::{HistoryItem, StudyPlanResponse, UserCredentials, UserProfile};
use study_planner_core::ports::{PlanRepository, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `PlanRepository` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    name: String,
    email: String,
    picture: Option<String>,
    hashed_password: String,
}
impl UserRecord {
    fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            picture: self.picture.clone(),
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            profile: self.to_profile(),
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct StudyPlanRecord {
    id: Uuid,
    user_id: Uuid,
    goal: String,
    response: Json<StudyPlanResponse>,
    created_at: DateTime<Utc>,
}
impl StudyPlanRecord {
    fn to_domain(self) -> HistoryItem {
        HistoryItem {
            id: self.id,
            user_id: self.user_id,
            goal: self.goal,
            response: self.response.0,
            timestamp: self.created_at,
        }
    }
}

//=========================================================================================
// Users and Browser Sessions
//=========================================================================================

impl DbAdapter {
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        picture: Option<&str>,
        hashed_password: &str,
    ) -> PortResult<UserProfile> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, name, email, picture, hashed_password) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING user_id, name, email, picture, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(picture)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_profile())
    }

    pub async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, name, email, picture, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_credentials())
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<UserProfile> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, name, email, picture, hashed_password FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", user_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_profile())
    }

    pub async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    /// Returns the owner of a session that has not yet expired.
    pub async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        user_id.ok_or(PortError::Unauthorized)
    }

    pub async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// `PlanRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlanRepository for DbAdapter {
    async fn create_plan(&self, item: &HistoryItem) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO study_plans (id, user_id, goal, response, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.goal)
        .bind(Json(&item.response))
        .bind(item.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn list_plans_by_user(&self, user_id: Uuid) -> PortResult<Vec<HistoryItem>> {
        let records = sqlx::query_as::<_, StudyPlanRecord>(
            "SELECT id, user_id, goal, response, created_at FROM study_plans \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let items = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(items)
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<HistoryItem> {
        let record = sqlx::query_as::<_, StudyPlanRecord>(
            "SELECT id, user_id, goal, response, created_at FROM study_plans \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(plan_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Study plan {} not found", plan_id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn update_plan_response(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        response: &StudyPlanResponse,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE study_plans SET response = $1 WHERE id = $2 AND user_id = $3")
            .bind(Json(response))
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Study plan {} not found", plan_id)));
        }
        Ok(())
    }

    async fn clear_plans_for_user(&self, user_id: Uuid) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM study_plans WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(result.rows_affected())
    }
}
