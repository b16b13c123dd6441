use board_model::{FilterCriteria, FilterPatch, Task};
use board_search::{Pipeline, SearchEngine, SearchError, StandardPipeline};
use board_store::MemoryStore;
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Fails only when tags are present, so the simplified retry (which strips
/// query and tags) succeeds.
struct FailsOnTags;

impl Pipeline for FailsOnTags {
    fn apply(&self, tasks: &[Task], criteria: &FilterCriteria) -> board_search::Result<Vec<Task>> {
        if criteria.tags.is_empty() {
            StandardPipeline.apply(tasks, criteria)
        } else {
            Err(SearchError::Pipeline("tag index corrupted".to_string()))
        }
    }
}

struct AlwaysFails;

impl Pipeline for AlwaysFails {
    fn apply(&self, _: &[Task], _: &FilterCriteria) -> board_search::Result<Vec<Task>> {
        Err(SearchError::Pipeline("predicate evaluation failed".to_string()))
    }
}

struct FatalPipeline;

impl Pipeline for FatalPipeline {
    fn apply(&self, _: &[Task], _: &FilterCriteria) -> board_search::Result<Vec<Task>> {
        Err(SearchError::Fatal("filter state unrecoverable".to_string()))
    }
}

async fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::with_tasks(vec![
            Task::new("t1", "Alpha", "p1"),
            Task::new("t2", "Beta", "p1"),
            Task::new("t3", "Gamma", "p2"),
        ])
        .await,
    )
}

#[tokio::test]
async fn simplified_retry_publishes_with_notice() {
    let engine = SearchEngine::with_pipeline(seeded_store().await, Box::new(FailsOnTags));
    engine.load().await.expect("load");
    engine
        .set_filters(FilterPatch {
            tags: Some(vec!["urgent".into()]),
            ..FilterPatch::default()
        })
        .await;

    // Simplified criteria drop the tags, so the retry returns everything.
    assert_eq!(engine.results().await.len(), 3);
    let session = engine.session().await;
    assert_eq!(session.notice.as_deref(), Some("search temporarily simplified"));
    assert!(session.error.is_some());
    assert!(!session.is_searching);
    // The criteria themselves are untouched by the first tier.
    assert_eq!(session.criteria.tags, vec!["urgent".to_string()]);
}

#[tokio::test]
async fn double_failure_shows_all_and_collapses_criteria() {
    let engine = SearchEngine::with_pipeline(seeded_store().await, Box::new(AlwaysFails));
    engine.load().await.expect("load");
    engine
        .set_filters(FilterPatch {
            board_id: Some(Some("p1".into())),
            tags: Some(vec!["urgent".into()]),
            ..FilterPatch::default()
        })
        .await;

    // Last tier: entire unfiltered collection, criteria down to board/scope.
    assert_eq!(engine.results().await.len(), 3);
    let session = engine.session().await;
    assert_eq!(session.notice.as_deref(), Some("filters failed, showing all tasks"));
    assert_eq!(session.criteria.board_id, Some("p1".to_string()));
    assert!(session.criteria.tags.is_empty());
    assert!(!session.is_searching);
}

#[tokio::test]
async fn fatal_error_surfaces_then_recovery_resets() {
    let engine = SearchEngine::with_pipeline(seeded_store().await, Box::new(FatalPipeline));
    engine.load().await.expect("load");
    engine.apply_filters().await;

    let session = engine.session().await;
    assert!(session.error.as_deref().is_some_and(|e| e.contains("fatal")));
    assert!(!session.is_searching);

    // The recovery re-run fails too, so the last-resort reset kicks in:
    // unfiltered collection published, terminal error, never a panic.
    engine.recover_from_search_error().await;
    let session = engine.session().await;
    assert_eq!(engine.results().await.len(), 3);
    assert!(session
        .error
        .as_deref()
        .is_some_and(|e| e.contains("temporarily unavailable")));
    assert_eq!(session.criteria.query, "");
    assert!(!session.is_searching);
}

#[tokio::test]
async fn recovery_restores_usable_session_with_healthy_pipeline() {
    let engine = SearchEngine::new(seeded_store().await);
    engine.load().await.expect("load");

    // Simulate a stuck session.
    engine
        .set_filters(FilterPatch {
            tags: Some(vec!["urgent".into()]),
            ..FilterPatch::default()
        })
        .await;
    engine.recover_from_search_error().await;

    let session = engine.session().await;
    assert_eq!(session.error, None);
    assert!(!session.is_searching);
    // Tag filter still applies; only query/error/cache were reset.
    assert_eq!(engine.results().await.len(), 0);
}

#[tokio::test]
async fn force_recovery_is_idempotent() {
    let engine = SearchEngine::new(seeded_store().await);
    engine.load().await.expect("load");

    engine.recover_from_search_error().await;
    engine.recover_from_search_error().await;

    assert_eq!(engine.session().await.error, None);
    assert_eq!(engine.results().await.len(), 3);
}
