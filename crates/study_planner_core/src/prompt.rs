//! crates/study_planner_core/src/prompt.rs
//!
//! Turns a learning goal into the request sent to the generative service.

use crate::domain::GenerationRequest;

/// Sampling temperature used for every plan request.
pub const PLAN_TEMPERATURE: f32 = 0.7;

const PLAN_INSTRUCTIONS_TEMPLATE: &str = r#"You are a study assistant. Analyze the student's learning goal below, then search the web for the most relevant, high-quality and current learning resources for it. Your "resources" recommendations must come from what you find.

**Learning Goal:** "{goal}"

Then build a personalized study plan. Reply with pure JSON only, with no markdown formatting and no ```json fences. The JSON object must have exactly three top-level keys: "studyPlan", "resources" and "wellnessTips".

1. "studyPlan": an array of objects, one per study session or break, each with:
   * "day" (number): the day of the plan this session belongs to, starting at 1.
   * "topic" (string): the session topic, or the kind of break (e.g. "Lunch Break").
   * "duration" (string): an estimate such as "2 hours" or "45 minutes".
   * "isBreak" (boolean): true for a break, false for a study session.
   * "details" (string): sub-topics, exercises or activities for the session.

2. "resources": an array of 3 to 5 objects taken from your search results, each with:
   * "title" (string): the resource title.
   * "type" (string): exactly one of "Video", "Article", "Interactive Tutorial", "Documentation", "Book".
   * "url" (string): a direct link to the resource.
   * "description" (string): one short sentence on why it helps.

3. "wellnessTips": an array of 3 distinct, actionable wellness tips for students (breaks, mindfulness, sleep, exercise), each a string."#;

pub struct PromptBuilder;

impl PromptBuilder {
    /// Builds the plan request for `goal`.
    ///
    /// The goal is embedded verbatim; callers are expected to have rejected blank goals already.
    pub fn build(goal: &str) -> GenerationRequest {
        GenerationRequest {
            instruction_text: PLAN_INSTRUCTIONS_TEMPLATE.replacen("{goal}", goal, 1),
            enable_web_search: true,
            temperature: PLAN_TEMPERATURE,
        }
    }
}
