//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::web::in_flight::InFlightRequests;
use study_planner_core::{
    GenerationOrchestrator, HistoryStore, IdentityService, PlanGenerationService, PlanRepository,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityService>,
    pub history: HistoryStore,
    pub orchestrator: Arc<GenerationOrchestrator>,
    pub in_flight: InFlightRequests,
}

impl AppState {
    /// Wires the core services on top of the given ports.
    pub fn new(
        identity: Arc<dyn IdentityService>,
        repository: Arc<dyn PlanRepository>,
        generator: Arc<dyn PlanGenerationService>,
    ) -> Self {
        let history = HistoryStore::new(repository);
        let orchestrator = Arc::new(GenerationOrchestrator::new(generator, history.clone()));
        Self {
            identity,
            history,
            orchestrator,
            in_flight: InFlightRequests::default(),
        }
    }
}
