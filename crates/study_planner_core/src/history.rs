//! crates/study_planner_core/src/history.rs
//!
//! The user's plan history: every generated plan, most recent first, with the
//! completion state of its study days. Backed by a `PlanRepository`; nothing is cached.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{HistoryItem, PlanProgress, StudyPlanResponse};
use crate::error::PlannerError;
use crate::ports::PlanRepository;

#[derive(Clone)]
pub struct HistoryStore {
    repository: Arc<dyn PlanRepository>,
}

impl HistoryStore {
    pub fn new(repository: Arc<dyn PlanRepository>) -> Self {
        Self { repository }
    }

    /// Stores a freshly generated plan and returns its new id.
    pub async fn append(
        &self,
        user_id: Uuid,
        goal: &str,
        response: StudyPlanResponse,
    ) -> Result<Uuid, PlannerError> {
        let item = HistoryItem {
            id: Uuid::new_v4(),
            user_id,
            goal: goal.to_string(),
            response,
            timestamp: Utc::now(),
        };

        self.repository
            .create_plan(&item)
            .await
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        info!("Saved study plan {} for user {}", item.id, user_id);
        Ok(item.id)
    }

    /// All of the user's plans, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<HistoryItem>, PlannerError> {
        let mut items = self
            .repository
            .list_plans_by_user(user_id)
            .await
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(items)
    }

    /// Flips the `completed` flag of the study day at `day_index` and returns the
    /// plan's progress afterwards.
    ///
    /// Break days cannot be completed; asking to toggle one leaves the plan untouched.
    pub async fn update_completion(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        day_index: usize,
    ) -> Result<PlanProgress, PlannerError> {
        let mut item = self.repository.get_plan(user_id, plan_id).await?;

        let day_count = item.response.study_plan.len();
        let day = item.response.study_plan.get_mut(day_index).ok_or_else(|| {
            PlannerError::Validation(format!(
                "day index {} is out of range for a plan with {} entries",
                day_index, day_count
            ))
        })?;

        if day.is_break {
            debug!("Ignoring completion toggle on break day {} of plan {}", day_index, plan_id);
            return Ok(item.response.progress());
        }

        day.completed = !day.completed;
        self.repository
            .update_plan_response(user_id, plan_id, &item.response)
            .await?;

        Ok(item.response.progress())
    }

    /// Deletes the user's entire history.
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, PlannerError> {
        let removed = self
            .repository
            .clear_plans_for_user(user_id)
            .await
            .map_err(|e| PlannerError::Persistence(e.to_string()))?;

        info!("Cleared {} study plans for user {}", removed, user_id);
        Ok(removed)
    }
}
