//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout and the current profile.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::{domain::SignedIn, PortError, UserProfile};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::adapters::identity::SESSION_TTL_DAYS;
use crate::web::middleware::{session_token, SESSION_COOKIE};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub picture: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

impl From<UserProfile> for AuthResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            picture: profile.picture,
        }
    }
}

fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

fn signed_in_response(status: StatusCode, signed_in: SignedIn) -> impl IntoResponse {
    let cookie = session_cookie(
        &signed_in.session_token,
        Duration::days(SESSION_TTL_DAYS).num_seconds(),
    );
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(signed_in.profile)),
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Name, email and password are required".to_string(),
        ));
    }

    let signed_in = state
        .identity
        .sign_up(req.name.trim(), req.email.trim(), &req.password, req.picture.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
        })?;

    Ok(signed_in_response(StatusCode::CREATED, signed_in))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Sign-in failed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let signed_in = state
        .identity
        .sign_in(req.email.trim(), &req.password)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign-in failed".to_string()),
            other => {
                error!("Failed to sign in: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Sign-in failed".to_string())
            }
        })?;

    Ok(signed_in_response(StatusCode::OK, signed_in))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.identity.sign_out(token).await.map_err(|e| {
        error!("Failed to delete auth session: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
    })?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, session_cookie("", 0))]))
}

/// GET /auth/me - The signed-in user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let profile = state.identity.get_profile(user_id).await.map_err(|e| {
        error!("Failed to load profile for user {}: {:?}", user_id, e);
        (StatusCode::UNAUTHORIZED, "Not signed in".to_string())
    })?;

    Ok(Json(AuthResponse::from(profile)))
}
