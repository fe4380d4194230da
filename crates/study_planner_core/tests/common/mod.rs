//! In-memory port implementations shared by the integration tests.

#![allow(dead_code)]

use std::future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use study_planner_core::{
    GenerationRequest, GroundingReference, HistoryItem, PlanGenerationService, PlanRepository,
    PortError, PortResult, RawGeneration, StudyPlanResponse,
};

pub const GO_PLAN: &str = r#"```json
{
    "studyPlan": [
        {"day": 1, "topic": "Syntax and types", "duration": "2 hours", "isBreak": false, "details": "Tour of Go basics"},
        {"day": 1, "topic": "Coffee Break", "duration": "15 minutes", "isBreak": true, "details": "Rest your eyes"},
        {"day": 2, "topic": "Goroutines", "duration": "3 hours", "isBreak": false, "details": "Channels and select"}
    ],
    "resources": [
        {"title": "A Tour of Go", "type": "Interactive Tutorial", "url": "https://go.dev/tour", "description": "Official interactive intro"},
        {"title": "Effective Go", "type": "Documentation", "url": "https://go.dev/doc/effective_go", "description": "Idioms"},
        {"title": "Go by Example", "type": "Article", "url": "https://gobyexample.com", "description": "Annotated programs"}
    ],
    "wellnessTips": ["Take short breaks", "Drink water", "Sleep eight hours"]
}
```"#;

//=========================================================================================
// Plan Repository
//=========================================================================================

#[derive(Default)]
pub struct InMemoryPlanRepository {
    pub items: Mutex<Vec<HistoryItem>>,
    pub fail_writes: bool,
    pub fail_reads: AtomicBool,
    pub fail_updates: AtomicBool,
    pub updates: AtomicUsize,
}

impl InMemoryPlanRepository {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Makes every later `list_plans_by_user` and `get_plan` call fail.
    pub fn break_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    /// Makes every later `update_plan_response` call fail.
    pub fn break_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> PortResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("read timed out".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn create_plan(&self, item: &HistoryItem) -> PortResult<()> {
        if self.fail_writes {
            return Err(PortError::Unexpected("store unreachable".to_string()));
        }
        self.items.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn list_plans_by_user(&self, user_id: Uuid) -> PortResult<Vec<HistoryItem>> {
        self.check_reads()?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> PortResult<HistoryItem> {
        self.check_reads()?;
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == plan_id && item.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Study plan {} not found", plan_id)))
    }

    async fn update_plan_response(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        response: &StudyPlanResponse,
    ) -> PortResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("write rejected".to_string()));
        }
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|item| item.id == plan_id && item.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Study plan {} not found", plan_id)))?;
        item.response = response.clone();
        Ok(())
    }

    async fn clear_plans_for_user(&self, user_id: Uuid) -> PortResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item.user_id != user_id);
        Ok((before - items.len()) as u64)
    }
}

//=========================================================================================
// Plan Generation
//=========================================================================================

/// Replies from a script, one entry per call (the last entry repeats), and
/// remembers every request it saw.
pub struct ScriptedGenerator {
    replies: Vec<Result<RawGeneration, String>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn scripted(replies: Vec<Result<RawGeneration, String>>) -> Self {
        assert!(!replies.is_empty(), "a script needs at least one reply");
        Self {
            replies,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str, grounding_references: Vec<GroundingReference>) -> Self {
        Self::scripted(vec![Ok(RawGeneration {
            text: text.to_string(),
            grounding_references,
        })])
    }

    pub fn failing(message: &str) -> Self {
        Self::scripted(vec![Err(message.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PlanGenerationService for ScriptedGenerator {
    async fn generate_plan(&self, request: &GenerationRequest) -> PortResult<RawGeneration> {
        let mut requests = self.requests.lock().unwrap();
        let reply = &self.replies[requests.len().min(self.replies.len() - 1)];
        requests.push(request.clone());
        reply.clone().map_err(PortError::Unexpected)
    }
}

/// Never answers; used to abandon a request mid-flight.
pub struct SilentGenerator;

#[async_trait]
impl PlanGenerationService for SilentGenerator {
    async fn generate_plan(&self, _request: &GenerationRequest) -> PortResult<RawGeneration> {
        future::pending::<PortResult<RawGeneration>>().await
    }
}
