pub mod domain;
pub mod error;
pub mod history;
pub mod normalizer;
pub mod orchestrator;
pub mod ports;
pub mod prompt;

pub use domain::{
    GeneratedPlan, GenerationRequest, GroundingReference, HistoryItem, PlanProgress, RawGeneration,
    Resource, ResourceType, SignedIn, Source, StudyDay, StudyPlanResponse, UserCredentials,
    UserProfile,
};
pub use error::PlannerError;
pub use history::HistoryStore;
pub use normalizer::PlanNormalizer;
pub use orchestrator::{GenerationOrchestrator, GenerationPhase};
pub use ports::{IdentityService, PlanGenerationService, PlanRepository, PortError, PortResult};
pub use prompt::PromptBuilder;
