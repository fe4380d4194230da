//! crates/study_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the generative API, the database and the identity provider.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{GenerationRequest, HistoryItem, RawGeneration, SignedIn, StudyPlanResponse, UserProfile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait PlanGenerationService: Send + Sync {
    /// Sends one request to the generative service and returns its raw reply.
    async fn generate_plan(&self, request: &GenerationRequest) -> PortResult<RawGeneration>;
}

/// Document store for generated plans, keyed by `(user_id, plan_id)`.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn create_plan(&self, item: &HistoryItem) -> PortResult<()>;

    async fn list_plans_by_user(&self, user_id: Uuid) -> PortResult<Vec<HistoryItem>>;

    /// Fails with `NotFound` when the plan does not exist or belongs to another user.
    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<HistoryItem>;

    /// Replaces only the stored response of an existing plan.
    async fn update_plan_response(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        response: &StudyPlanResponse,
    ) -> PortResult<()>;

    /// Deletes every plan owned by the user, returning how many were removed.
    async fn clear_plans_for_user(&self, user_id: Uuid) -> PortResult<u64>;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        picture: Option<&str>,
    ) -> PortResult<SignedIn>;

    async fn sign_in(&self, email: &str, password: &str) -> PortResult<SignedIn>;

    async fn sign_out(&self, session_token: &str) -> PortResult<()>;

    /// Resolves a session token to the user it belongs to.
    async fn authenticate(&self, session_token: &str) -> PortResult<Uuid>;

    async fn get_profile(&self, user_id: Uuid) -> PortResult<UserProfile>;
}
