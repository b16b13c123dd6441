use board_model::{unix_ms_now, Board, FilterPatch, ScopeMode, ScopePreferences, Task};
use board_search::{SearchEngine, SearchError, SearchInputController};
use board_store::{BoardStore, MemoryStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn task(id: &str, title: &str, board: &str) -> Task {
    Task::new(id, title, board)
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(
        MemoryStore::with_tasks(vec![
            task("t1", "Alpha launch", "p1"),
            task("t2", "Beta work", "p1"),
            task("t3", "Gamma fix", "p2"),
            task("t4", "Alpha retro", "p2"),
            task("t5", "Delta spike", "p3"),
            task("t6", "Epsilon chore", "p1"),
        ])
        .await,
    );
    store.insert_board(Board::new("p1", "One")).await;
    store.insert_board(Board::new("p2", "Two")).await;
    store.insert_board(Board::new("p3", "Three")).await;
    store
}

async fn search(controller: &SearchInputController, query: &str) {
    controller.set_query(query).await;
    tokio::time::sleep(Duration::from_millis(350)).await;
}

#[tokio::test]
async fn board_scope_returns_only_that_boards_tasks() -> anyhow::Result<()> {
    init_logs();
    let engine = SearchEngine::new(seeded_store().await);
    engine.load().await?;
    engine
        .set_filters(FilterPatch {
            board_id: Some(Some("p1".into())),
            ..FilterPatch::default()
        })
        .await;

    let results = engine.results().await;
    let mut result_ids = ids(&results);
    result_ids.sort_unstable();
    assert_eq!(result_ids, vec!["t1", "t2", "t6"]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn cross_board_query_matches_across_boards() {
    let engine = Arc::new(SearchEngine::new(seeded_store().await));
    engine.load().await.expect("load");
    let controller = SearchInputController::new(engine.clone());

    engine
        .set_filters(FilterPatch {
            board_id: Some(Some("p1".into())),
            ..FilterPatch::default()
        })
        .await;
    engine.toggle_cross_board().await;
    search(&controller, "alpha").await;

    let results = engine.results().await;
    let mut result_ids = ids(&results);
    result_ids.sort_unstable();
    // Both Alpha tasks, regardless of the p1 restriction.
    assert_eq!(result_ids, vec!["t1", "t4"]);
    assert!(!engine.session().await.is_searching);
}

#[tokio::test(start_paused = true)]
async fn scope_bypass_equals_unscoped_result() {
    let engine = Arc::new(SearchEngine::new(seeded_store().await));
    engine.load().await.expect("load");
    let controller = SearchInputController::new(engine.clone());

    engine
        .set_filters(FilterPatch {
            board_id: Some(Some("p2".into())),
            ..FilterPatch::default()
        })
        .await;
    engine.toggle_cross_board().await;
    search(&controller, "alpha").await;
    let with_board = ids(&engine.results().await).len();

    engine
        .set_filters(FilterPatch {
            board_id: Some(None),
            ..FilterPatch::default()
        })
        .await;
    search(&controller, "alpha").await;
    let without_board = ids(&engine.results().await).len();

    assert_eq!(with_board, without_board);
}

#[tokio::test]
async fn archived_board_tasks_dropped_under_cross_board() {
    let store = seeded_store().await;
    let mut archived = Board::new("p3", "Three");
    archived.archived_ms = Some(unix_ms_now());
    store.insert_board(archived).await;

    let engine = SearchEngine::new(store);
    engine.load().await.expect("load");
    engine.toggle_cross_board().await;

    // t5 lives on the archived board; the drop is permanent.
    assert!(!engine.live_tasks().await.iter().any(|t| t.id == "t5"));
    assert_eq!(engine.live_tasks().await.len(), 5);
}

#[tokio::test]
async fn board_list_failure_degrades_silently() {
    let store = seeded_store().await;
    store.set_boards_failing(true);

    let engine = SearchEngine::new(store);
    engine.load().await.expect("load");
    engine.toggle_cross_board().await;

    // The unvalidated set survives and no error surfaces.
    assert_eq!(engine.live_tasks().await.len(), 6);
    assert_eq!(engine.session().await.error, None);
    assert_eq!(engine.results().await.len(), 6);
}

#[tokio::test]
async fn invalid_record_is_dropped_from_live_set() {
    let engine = SearchEngine::new(seeded_store().await);
    engine.load().await.expect("load");
    let before = engine.live_tasks().await.len();

    let mut tasks = engine.live_tasks().await;
    let mut broken = task("t-bad", "placeholder", "p1");
    broken.title = String::new();
    tasks.push(broken);
    engine.replace_tasks(tasks).await;

    assert_eq!(engine.live_tasks().await.len(), before);
    assert!(!engine.results().await.iter().any(|t| t.id == "t-bad"));
    assert!(engine.check_task(&task("ok", "Fine", "p1")));
}

#[tokio::test]
async fn toggle_persists_scope_when_remembered() {
    let store = seeded_store().await;
    store
        .set_preferences(ScopePreferences {
            default_scope: ScopeMode::CurrentBoard,
            remember_scope: true,
        })
        .await
        .expect("prefs");

    let engine = SearchEngine::new(store.clone());
    engine.load().await.expect("load");
    let scope = engine.toggle_cross_board().await;
    assert_eq!(scope, ScopeMode::AllBoards);

    let stored = store.preferences().await.expect("prefs").expect("some");
    assert_eq!(stored.default_scope, ScopeMode::AllBoards);
}

#[tokio::test]
async fn load_restores_remembered_scope() {
    let store = seeded_store().await;
    store
        .set_preferences(ScopePreferences {
            default_scope: ScopeMode::AllBoards,
            remember_scope: true,
        })
        .await
        .expect("prefs");

    let engine = SearchEngine::new(store);
    engine.load().await.expect("load");
    assert_eq!(engine.session().await.scope(), ScopeMode::AllBoards);
}

#[tokio::test]
async fn navigate_returns_board_and_highlights() {
    let engine = SearchEngine::new(seeded_store().await);
    engine.load().await.expect("load");

    let board = engine.navigate_to_task_board("t3").await.expect("navigate");
    assert_eq!(board, "p2");
    assert_eq!(engine.session().await.highlighted_id, Some("t3".to_string()));
}

#[tokio::test]
async fn navigate_fails_closed_on_archived_board() {
    let store = seeded_store().await;
    let mut archived = Board::new("p2", "Two");
    archived.archived_ms = Some(unix_ms_now());
    store.insert_board(archived).await;

    let engine = SearchEngine::new(store);
    engine.load().await.expect("load");
    let err = engine
        .navigate_to_task_board("t3")
        .await
        .expect_err("archived board");
    assert!(matches!(err, SearchError::BoardInaccessible(_)));
}

#[tokio::test(start_paused = true)]
async fn clear_search_resets_query_and_highlight_only() {
    let engine = Arc::new(SearchEngine::new(seeded_store().await));
    engine.load().await.expect("load");
    let controller = SearchInputController::new(engine.clone());

    engine
        .set_filters(FilterPatch {
            board_id: Some(Some("p1".into())),
            ..FilterPatch::default()
        })
        .await;
    search(&controller, "alpha").await;
    engine.set_highlighted(Some("t1".to_string())).await;

    engine.clear_search().await;
    let session = engine.session().await;
    assert_eq!(session.criteria.query, "");
    assert_eq!(session.highlighted_id, None);
    assert_eq!(session.criteria.board_id, Some("p1".to_string()));
}
