//! crates/study_planner_core/src/domain.rs
//!
//! Defines the core data structures for the application.
//!
//! The plan types carry serde derives because their JSON shape *is* the contract
//! with the generative service and the stored document; everything else stays
//! independent of any database or transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Study Plan Types
//=========================================================================================

/// One study session or break within a plan, in the order the generator returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDay {
    pub day: u32,
    pub topic: String,
    pub duration: String,
    pub is_break: bool,
    pub details: String,
    #[serde(default)]
    pub completed: bool,
}

/// The kinds of learning resource the generator is allowed to recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Video,
    Article,
    #[serde(rename = "Interactive Tutorial")]
    InteractiveTutorial,
    Documentation,
    Book,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub url: String,
    pub description: String,
}

/// A web page the generator consulted while building the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// A complete, validated study plan.
///
/// `sources` is `None` rather than an empty list when nothing was cited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlanResponse {
    pub study_plan: Vec<StudyDay>,
    pub resources: Vec<Resource>,
    pub wellness_tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl StudyPlanResponse {
    /// Completion summary over the non-break days of the plan.
    pub fn progress(&self) -> PlanProgress {
        PlanProgress::of(&self.study_plan)
    }
}

/// How far a user has worked through a plan. Break days are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanProgress {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl PlanProgress {
    pub fn of(days: &[StudyDay]) -> Self {
        let (completed, total) = days
            .iter()
            .filter(|day| !day.is_break)
            .fold((0, 0), |(done, all), day| (done + usize::from(day.completed), all + 1));

        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u8
        };

        Self { completed, total, percent }
    }
}

//=========================================================================================
// History and Identity
//=========================================================================================

/// A past generation: the goal a user asked for and the plan they got back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal: String,
    pub response: StudyPlanResponse,
    pub timestamp: DateTime<Utc>,
}

/// The public view of a signed-in user, as supplied by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

// Only used internally for sign-in - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub profile: UserProfile,
    pub hashed_password: String,
}

/// The outcome of a successful sign-in: who the user is and the session that now identifies them.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub profile: UserProfile,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Generation Exchange
//=========================================================================================

/// Everything the generative service needs for one plan request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub instruction_text: String,
    pub enable_web_search: bool,
    pub temperature: f32,
}

/// A web citation attached to the generator's answer. The title may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingReference {
    pub uri: String,
    pub title: Option<String>,
}

/// The generator's unprocessed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGeneration {
    pub text: String,
    pub grounding_references: Vec<GroundingReference>,
}

/// The result of a successful generation: the stored plan's id and its content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub plan_id: Uuid,
    pub response: StudyPlanResponse,
}
