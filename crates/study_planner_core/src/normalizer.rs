//! crates/study_planner_core/src/normalizer.rs
//!
//! Converts the generator's raw reply into a validated `StudyPlanResponse`.
//! This is the only place that knows what the generator's output looks like.

use std::borrow::Cow;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::domain::{GroundingReference, Resource, Source, StudyDay, StudyPlanResponse};
use crate::error::PlannerError;

/// Matches an opening ```` ``` ```` / ```` ```json ```` fence or a closing fence.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^```(?:json)?\s*|\s*```\s*$").expect("code fence pattern is valid")
});

/// The plan body as the generator writes it. Any `sources` key it invents is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedBody {
    study_plan: Vec<StudyDay>,
    resources: Vec<Resource>,
    wellness_tips: Vec<String>,
}

pub struct PlanNormalizer;

impl PlanNormalizer {
    /// Parses `raw_text` into a plan and attaches de-duplicated sources built from
    /// `references`.
    pub fn parse(
        raw_text: &str,
        references: &[GroundingReference],
    ) -> Result<StudyPlanResponse, PlannerError> {
        let cleaned = strip_code_fence(raw_text);
        let body: GeneratedBody = serde_json::from_str(&cleaned)
            .map_err(|e| PlannerError::MalformedResponse(e.to_string()))?;
        check_day_numbers(&body.study_plan)?;

        Ok(StudyPlanResponse {
            study_plan: body.study_plan,
            resources: body.resources,
            wellness_tips: body.wellness_tips,
            sources: collect_sources(references),
        })
    }
}

/// Day numbers start at 1 and never go backwards in presentation order.
fn check_day_numbers(study_plan: &[StudyDay]) -> Result<(), PlannerError> {
    if let Some(position) = study_plan.iter().position(|d| d.day == 0) {
        return Err(PlannerError::MalformedResponse(format!(
            "studyPlan entry {} has day 0; days start at 1",
            position
        )));
    }
    if let Some(position) = study_plan.windows(2).position(|w| w[1].day < w[0].day) {
        return Err(PlannerError::MalformedResponse(format!(
            "studyPlan entry {} goes back from day {} to day {}",
            position + 1,
            study_plan[position].day,
            study_plan[position + 1].day
        )));
    }
    Ok(())
}

/// Removes a surrounding markdown code fence, if any. Unfenced input comes back trimmed.
pub fn strip_code_fence(raw_text: &str) -> Cow<'_, str> {
    CODE_FENCE.replace_all(raw_text.trim(), "")
}

/// Builds the source list: one entry per distinct URI, first occurrence wins, in order.
fn collect_sources(references: &[GroundingReference]) -> Option<Vec<Source>> {
    let mut unique: IndexMap<&str, Source> = IndexMap::new();
    for reference in references.iter().filter(|r| !r.uri.trim().is_empty()) {
        unique
            .entry(reference.uri.as_str())
            .or_insert_with(|| Source {
                title: source_title(reference),
                uri: reference.uri.clone(),
            });
    }

    if unique.is_empty() {
        None
    } else {
        Some(unique.into_values().collect())
    }
}

fn source_title(reference: &GroundingReference) -> String {
    match reference.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => Url::parse(&reference.uri)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| reference.uri.clone()),
    }
}
