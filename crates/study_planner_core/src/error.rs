//! crates/study_planner_core/src/error.rs
//!
//! The error type returned by the core planning operations.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Rejected locally, before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generative service was unreachable or refused the request.
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    /// The generative service replied with something that is not a study plan.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A generation attempt failed; nothing was persisted.
    #[error("Failed to generate study plan: {0}")]
    GenerationFailed(#[source] Box<PlannerError>),
}

impl PlannerError {
    pub(crate) fn generation_failed(cause: PlannerError) -> Self {
        Self::GenerationFailed(Box::new(cause))
    }
}

/// Port failures seen by the history store and identity calls.
impl From<PortError> for PlannerError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => Self::NotFound(what),
            PortError::Unauthorized => Self::Auth("unauthorized".to_string()),
            PortError::Unexpected(msg) => Self::Persistence(msg),
        }
    }
}
