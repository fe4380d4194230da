//! Integration tests for plan generation: prompt, remote call, normalization and save.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{InMemoryPlanRepository, ScriptedGenerator, SilentGenerator, GO_PLAN};
use study_planner_core::{
    GenerationOrchestrator, GenerationPhase, GroundingReference, HistoryStore, PlannerError,
    RawGeneration, Source,
};

fn orchestrator(
    generator: Arc<ScriptedGenerator>,
    repository: Arc<InMemoryPlanRepository>,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(generator, HistoryStore::new(repository))
}

#[tokio::test]
async fn generates_and_records_plan() {
    let generator = Arc::new(ScriptedGenerator::replying(
        GO_PLAN,
        vec![
            GroundingReference { uri: "https://go.dev/tour".to_string(), title: Some("A Tour of Go".to_string()) },
            GroundingReference { uri: "https://gobyexample.com/".to_string(), title: None },
            GroundingReference { uri: "https://go.dev/tour".to_string(), title: Some("Tour (dup)".to_string()) },
        ],
    ));
    let repository = Arc::new(InMemoryPlanRepository::default());
    let orchestrator = orchestrator(generator.clone(), repository.clone());
    let user_id = Uuid::new_v4();

    let generated = orchestrator.generate(user_id, "Learn Go in 5 days").await.unwrap();

    assert!(!generated.response.study_plan.is_empty());
    assert_eq!(generated.response.resources.len(), 3);
    assert_eq!(
        generated.response.sources,
        Some(vec![
            Source { title: "A Tour of Go".to_string(), uri: "https://go.dev/tour".to_string() },
            Source { title: "gobyexample.com".to_string(), uri: "https://gobyexample.com/".to_string() },
        ])
    );
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Succeeded);

    let requests = generator.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].instruction_text.contains("Learn Go in 5 days"));
    assert!(requests[0].enable_web_search);
    drop(requests);

    let history = HistoryStore::new(repository).list(user_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, generated.plan_id);
    assert_eq!(history[0].goal, "Learn Go in 5 days");
    assert_eq!(history[0].response, generated.response);
}

#[tokio::test]
async fn blank_goal_never_reaches_the_generator() {
    let generator = Arc::new(ScriptedGenerator::replying(GO_PLAN, vec![]));
    let repository = Arc::new(InMemoryPlanRepository::default());
    let orchestrator = orchestrator(generator.clone(), repository);
    let user_id = Uuid::new_v4();

    let err = orchestrator.generate(user_id, "   \n\t").await.unwrap_err();

    assert!(matches!(err, PlannerError::Validation(_)));
    assert_eq!(generator.call_count(), 0);
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Idle);
}

#[tokio::test]
async fn remote_failure_persists_nothing() {
    let generator = Arc::new(ScriptedGenerator::failing("quota exceeded"));
    let repository = Arc::new(InMemoryPlanRepository::default());
    let orchestrator = orchestrator(generator, repository.clone());
    let user_id = Uuid::new_v4();
    let history = HistoryStore::new(repository);
    let before = history.list(user_id).await.unwrap();

    let err = orchestrator.generate(user_id, "Learn Go in 5 days").await.unwrap_err();

    match err {
        PlannerError::GenerationFailed(cause) => {
            assert!(matches!(*cause, PlannerError::RemoteCall(msg) if msg.contains("quota exceeded")))
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
    assert_eq!(history.list(user_id).await.unwrap(), before);
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Failed);
}

#[tokio::test]
async fn malformed_reply_persists_nothing() {
    let generator = Arc::new(ScriptedGenerator::replying("I could not build a plan, sorry.", vec![]));
    let repository = Arc::new(InMemoryPlanRepository::default());
    let orchestrator = orchestrator(generator, repository.clone());
    let user_id = Uuid::new_v4();

    let err = orchestrator.generate(user_id, "Learn Go in 5 days").await.unwrap_err();

    match err {
        PlannerError::GenerationFailed(cause) => {
            assert!(matches!(*cause, PlannerError::MalformedResponse(_)))
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
    assert!(repository.items.lock().unwrap().is_empty());
}

#[tokio::test]
async fn save_failure_surfaces_as_persistence_error() {
    let generator = Arc::new(ScriptedGenerator::replying(GO_PLAN, vec![]));
    let repository = Arc::new(InMemoryPlanRepository::failing());
    let orchestrator = orchestrator(generator, repository);
    let user_id = Uuid::new_v4();

    let err = orchestrator.generate(user_id, "Learn Go in 5 days").await.unwrap_err();

    assert!(matches!(err, PlannerError::Persistence(_)));
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Failed);
}

#[tokio::test]
async fn phase_restarts_with_each_new_request() {
    let generator = Arc::new(ScriptedGenerator::scripted(vec![
        Err("offline".to_string()),
        Ok(RawGeneration {
            text: GO_PLAN.to_string(),
            grounding_references: vec![],
        }),
    ]));
    let orchestrator = orchestrator(generator, Arc::new(InMemoryPlanRepository::default()));
    let user_id = Uuid::new_v4();

    assert!(orchestrator.generate(user_id, "Learn SQL").await.is_err());
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Failed);

    assert!(orchestrator.generate(user_id, "Learn SQL").await.is_ok());
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Succeeded);
    assert_eq!(orchestrator.phase(Uuid::new_v4()), GenerationPhase::Idle);
}

#[tokio::test]
async fn abandoned_request_ends_failed() {
    let repository = Arc::new(InMemoryPlanRepository::default());
    let orchestrator =
        GenerationOrchestrator::new(Arc::new(SilentGenerator), HistoryStore::new(repository.clone()));
    let user_id = Uuid::new_v4();

    let outcome =
        tokio::time::timeout(Duration::from_millis(10), orchestrator.generate(user_id, "Learn Go")).await;

    assert!(outcome.is_err());
    assert_eq!(orchestrator.phase(user_id), GenerationPhase::Failed);
    assert!(repository.items.lock().unwrap().is_empty());
}
