//! crates/study_planner_core/src/orchestrator.rs
//!
//! Runs one plan generation end to end: prompt, remote call, normalization, save.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::GeneratedPlan;
use crate::error::PlannerError;
use crate::history::HistoryStore;
use crate::normalizer::PlanNormalizer;
use crate::ports::PlanGenerationService;
use crate::prompt::PromptBuilder;

/// Where a user's most recent generation request stands.
///
/// `Succeeded` and `Failed` are terminal; a new request starts again from `Requesting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

impl GenerationPhase {
    fn is_terminal(self) -> bool {
        matches!(self, GenerationPhase::Succeeded | GenerationPhase::Failed)
    }
}

/// Number of users whose phase is tracked before finished entries are pruned.
const PHASE_CAPACITY: usize = 10_000;

pub struct GenerationOrchestrator {
    generator: Arc<dyn PlanGenerationService>,
    history: HistoryStore,
    phases: Mutex<HashMap<Uuid, GenerationPhase>>,
    phase_capacity: usize,
}

/// Holds a user's phase at `Requesting` for the lifetime of one request.
///
/// If the request future is dropped before `finish` runs, the phase is recorded
/// as `Failed` so it never stays `Requesting`.
struct PhaseGuard<'a> {
    orchestrator: &'a GenerationOrchestrator,
    user_id: Uuid,
    finished: bool,
}

impl<'a> PhaseGuard<'a> {
    fn start(orchestrator: &'a GenerationOrchestrator, user_id: Uuid) -> Self {
        orchestrator.set_phase(user_id, GenerationPhase::Requesting);
        Self {
            orchestrator,
            user_id,
            finished: false,
        }
    }

    fn finish(mut self, phase: GenerationPhase) {
        self.finished = true;
        self.orchestrator.set_phase(self.user_id, phase);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Generation for user {} was abandoned before completing", self.user_id);
            self.orchestrator.set_phase(self.user_id, GenerationPhase::Failed);
        }
    }
}

impl GenerationOrchestrator {
    pub fn new(generator: Arc<dyn PlanGenerationService>, history: HistoryStore) -> Self {
        Self {
            generator,
            history,
            phases: Mutex::new(HashMap::new()),
            phase_capacity: PHASE_CAPACITY,
        }
    }

    /// The phase of the user's latest request; `Idle` if they never made one.
    pub fn phase(&self, user_id: Uuid) -> GenerationPhase {
        self.phases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .copied()
            .unwrap_or(GenerationPhase::Idle)
    }

    fn set_phase(&self, user_id: Uuid, phase: GenerationPhase) {
        let mut phases = self.phases.lock().unwrap_or_else(PoisonError::into_inner);
        if phases.len() >= self.phase_capacity && !phases.contains_key(&user_id) {
            let before = phases.len();
            phases.retain(|_, tracked| !tracked.is_terminal());
            debug!("Pruned {} finished generation phases", before - phases.len());
        }
        phases.insert(user_id, phase);
    }

    /// Generates a plan for `goal` and records it in the user's history.
    ///
    /// A blank goal is rejected before any remote call. Remote and parse failures
    /// come back as `GenerationFailed`, and nothing is saved for them.
    pub async fn generate(&self, user_id: Uuid, goal: &str) -> Result<GeneratedPlan, PlannerError> {
        if goal.trim().is_empty() {
            return Err(PlannerError::Validation("goal must not be empty".to_string()));
        }

        let phase = PhaseGuard::start(self, user_id);
        info!("Generating study plan for user {}", user_id);

        let result = self.run(user_id, goal).await;
        match &result {
            Ok(plan) => {
                phase.finish(GenerationPhase::Succeeded);
                info!("Study plan {} generated for user {}", plan.plan_id, user_id);
            }
            Err(e) => {
                phase.finish(GenerationPhase::Failed);
                error!("Study plan generation failed for user {}: {}", user_id, e);
            }
        }
        result
    }

    async fn run(&self, user_id: Uuid, goal: &str) -> Result<GeneratedPlan, PlannerError> {
        let request = PromptBuilder::build(goal);

        let raw = self
            .generator
            .generate_plan(&request)
            .await
            .map_err(|e| PlannerError::generation_failed(PlannerError::RemoteCall(e.to_string())))?;

        let response = PlanNormalizer::parse(&raw.text, &raw.grounding_references).map_err(|e| {
            warn!("Generator reply could not be normalized: {}", e);
            PlannerError::generation_failed(e)
        })?;

        let plan_id = self.history.append(user_id, goal, response.clone()).await?;

        Ok(GeneratedPlan { plan_id, response })
    }
}
