//! services/api/src/adapters/plan_llm.rs
//!
//! This module contains the adapter for the plan-generating LLM.
//! It implements the `PlanGenerationService` port from the `core` crate using the
//! Responses API, with the web search tool enabled so the reply carries citations.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::responses::{CreateResponseArgs, Tool, WebSearchTool},
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use study_planner_core::{
    domain::{GenerationRequest, GroundingReference, RawGeneration},
    ports::{PlanGenerationService, PortError, PortResult},
};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PlanGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPlanAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiPlanAdapter {
    /// Creates a new `OpenAiPlanAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Collects the `url_citation` annotations attached to the output messages of a response.
fn url_citations(response: &Value) -> Vec<GroundingReference> {
    response["output"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|item| item["content"].as_array().into_iter().flatten())
        .flat_map(|content| content["annotations"].as_array().into_iter().flatten())
        .filter(|annotation| annotation["type"] == "url_citation")
        .filter_map(|annotation| {
            Some(GroundingReference {
                uri: annotation["url"].as_str()?.to_string(),
                title: annotation["title"].as_str().map(str::to_string),
            })
        })
        .collect()
}

//=========================================================================================
// `PlanGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlanGenerationService for OpenAiPlanAdapter {
    async fn generate_plan(&self, request: &GenerationRequest) -> PortResult<RawGeneration> {
        let tools = if request.enable_web_search {
            vec![Tool::WebSearch(WebSearchTool::default())]
        } else {
            Vec::new()
        };

        let api_request = CreateResponseArgs::default()
            .model(&self.model)
            .input(request.instruction_text.clone())
            .tools(tools)
            .temperature(request.temperature)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .responses()
            .create(api_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let text = response.output_text().ok_or_else(|| {
            PortError::Unexpected("Plan generation LLM response contained no text content.".to_string())
        })?;

        let grounding_references = serde_json::to_value(&response)
            .map(|value| url_citations(&value))
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!("Plan generation returned {} citations", grounding_references.len());

        Ok(RawGeneration {
            text,
            grounding_references,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_url_citations_in_order() {
        let response = json!({
            "output": [
                {"type": "web_search_call", "id": "ws_1", "status": "completed"},
                {
                    "type": "message",
                    "content": [{
                        "type": "output_text",
                        "text": "{}",
                        "annotations": [
                            {"type": "url_citation", "url": "https://go.dev/tour", "title": "A Tour of Go", "start_index": 0, "end_index": 1},
                            {"type": "file_citation", "file_id": "f_1", "index": 2},
                            {"type": "url_citation", "url": "https://gobyexample.com"}
                        ]
                    }]
                }
            ]
        });

        assert_eq!(
            url_citations(&response),
            vec![
                GroundingReference {
                    uri: "https://go.dev/tour".to_string(),
                    title: Some("A Tour of Go".to_string()),
                },
                GroundingReference {
                    uri: "https://gobyexample.com".to_string(),
                    title: None,
                },
            ]
        );
    }

    #[test]
    fn response_without_output_has_no_citations() {
        assert!(url_citations(&json!({"id": "resp_1"})).is_empty());
    }
}
