//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the study plan endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::auth::{self, AuthResponse, LoginRequest, SignupRequest};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_planner_core::{
    GenerationPhase, HistoryItem, PlanProgress, PlannerError, StudyPlanResponse,
};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_plan_handler,
        list_plans_handler,
        generation_status_handler,
        toggle_day_handler,
        clear_history_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
    ),
    components(
        schemas(
            CreatePlanRequest,
            CreatePlanResponse,
            HistoryEntry,
            ProgressResponse,
            GenerationStatusResponse,
            ClearHistoryResponse,
            SignupRequest,
            LoginRequest,
            AuthResponse,
        )
    ),
    tags(
        (name = "Study Planner API", description = "Generate study plans and track their completion.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreatePlanRequest {
    /// What the user wants to learn, e.g. "Learn Go in 5 days".
    pub goal: String,
}

/// The response payload sent after a plan was generated and saved.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanResponse {
    pub plan_id: Uuid,
    #[schema(value_type = Object)]
    pub response: StudyPlanResponse,
}

#[derive(Serialize, ToSchema)]
pub struct ProgressResponse {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl From<PlanProgress> for ProgressResponse {
    fn from(progress: PlanProgress) -> Self {
        Self {
            completed: progress.completed,
            total: progress.total,
            percent: progress.percent,
        }
    }
}

/// One past plan as shown in the history list.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal: String,
    #[schema(value_type = Object)]
    pub response: StudyPlanResponse,
    pub timestamp: DateTime<Utc>,
    pub progress: ProgressResponse,
}

impl From<HistoryItem> for HistoryEntry {
    fn from(item: HistoryItem) -> Self {
        let progress = item.response.progress().into();
        Self {
            id: item.id,
            user_id: item.user_id,
            goal: item.goal,
            response: item.response,
            timestamp: item.timestamp,
            progress,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GenerationStatusResponse {
    /// One of `idle`, `requesting`, `succeeded`, `failed`.
    #[schema(value_type = String)]
    pub phase: GenerationPhase,
}

#[derive(Serialize, ToSchema)]
pub struct ClearHistoryResponse {
    pub cleared: u64,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a core error to the status code and message the client sees.
fn planner_error_response(e: PlannerError) -> (StatusCode, String) {
    match e {
        PlannerError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        PlannerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PlannerError::Auth(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PlannerError::GenerationFailed(_)
        | PlannerError::RemoteCall(_)
        | PlannerError::MalformedResponse(_) => {
            error!("Study plan generation failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to generate a study plan. Please try again.".to_string(),
            )
        }
        PlannerError::Persistence(_) => {
            error!("Study plan storage failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save or load study plans".to_string(),
            )
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a study plan for a learning goal and add it to the user's history.
#[utoipa::path(
    post,
    path = "/plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan generated and saved", body = CreatePlanResponse),
        (status = 400, description = "Empty goal"),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "A generation is already in progress for this user"),
        (status = 502, description = "The generative service failed or replied with an invalid plan"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let _guard = app_state.in_flight.try_acquire(user_id).ok_or_else(|| {
        warn!("Rejected concurrent generation for user {}", user_id);
        (
            StatusCode::CONFLICT,
            "A study plan is already being generated".to_string(),
        )
    })?;

    let generated = app_state
        .orchestrator
        .generate(user_id, &req.goal)
        .await
        .map_err(planner_error_response)?;

    let response = CreatePlanResponse {
        plan_id: generated.plan_id,
        response: generated.response,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List the user's study plans, newest first, with their progress.
#[utoipa::path(
    get,
    path = "/plans",
    responses(
        (status = 200, description = "The user's plan history", body = [HistoryEntry]),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_plans_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<HistoryEntry>>, (StatusCode, String)> {
    let items = app_state
        .history
        .list(user_id)
        .await
        .map_err(planner_error_response)?;

    Ok(Json(items.into_iter().map(HistoryEntry::from).collect()))
}

/// Report where the user's latest generation request stands.
#[utoipa::path(
    get,
    path = "/plans/status",
    responses(
        (status = 200, description = "Phase of the latest generation", body = GenerationStatusResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn generation_status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Json<GenerationStatusResponse> {
    Json(GenerationStatusResponse {
        phase: app_state.orchestrator.phase(user_id),
    })
}

/// Toggle completion of one study day. Break days are left unchanged.
#[utoipa::path(
    patch,
    path = "/plans/{plan_id}/days/{day_index}",
    params(
        ("plan_id" = Uuid, Path, description = "The plan to update."),
        ("day_index" = usize, Path, description = "Zero-based position of the day in the plan.")
    ),
    responses(
        (status = 200, description = "Progress after the update", body = ProgressResponse),
        (status = 400, description = "Day index out of range"),
        (status = 404, description = "Plan not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn toggle_day_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path((plan_id, day_index)): Path<(Uuid, usize)>,
) -> Result<Json<ProgressResponse>, (StatusCode, String)> {
    let progress = app_state
        .history
        .update_completion(user_id, plan_id, day_index)
        .await
        .map_err(planner_error_response)?;

    Ok(Json(progress.into()))
}

/// Delete the user's entire plan history.
#[utoipa::path(
    delete,
    path = "/plans",
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn clear_history_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<ClearHistoryResponse>, (StatusCode, String)> {
    let cleared = app_state
        .history
        .clear(user_id)
        .await
        .map_err(planner_error_response)?;

    Ok(Json(ClearHistoryResponse { cleared }))
}
