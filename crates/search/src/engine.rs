use crate::access::BoardAccess;
use crate::cache::{SearchCache, MAX_CACHEABLE_RESULTS};
use crate::error::{Result, SearchError};
use crate::integrity;
use crate::pipeline::{Pipeline, StandardPipeline};
use crate::session::SearchSession;
use board_model::{FilterCriteria, FilterPatch, ScopeMode, ScopePreferences, Task};
use board_store::BoardStore;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Searches above this collection size are treated as complex and get a
/// loading-affordance tick before the synchronous filtering work.
const COMPLEX_COLLECTION: usize = 200;

pub(crate) const NOTICE_SIMPLIFIED: &str = "search temporarily simplified";
pub(crate) const NOTICE_SHOWING_ALL: &str = "filters failed, showing all tasks";
pub(crate) const ERR_TERMINAL: &str = "search temporarily unavailable, refresh to continue";

/// The filter orchestrator: sequences integrity revalidation, cross-board
/// revalidation, cache probe, pipeline execution with recovery, cache write,
/// and the probabilistic cache sweep, then publishes the result set.
///
/// All public entry points map failures into session state; none of them
/// propagate an error to the UI layer except the explicitly fallible
/// navigation query.
pub struct SearchEngine {
    store: Arc<dyn BoardStore>,
    access: BoardAccess,
    pipeline: Box<dyn Pipeline>,
    tasks: RwLock<Vec<Task>>,
    results: RwLock<Vec<Task>>,
    cache: Mutex<SearchCache>,
    session: Mutex<SearchSession>,
    passes: AtomicU64,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self::with_pipeline(store, Box::new(StandardPipeline))
    }

    pub fn with_pipeline(store: Arc<dyn BoardStore>, pipeline: Box<dyn Pipeline>) -> Self {
        Self {
            access: BoardAccess::new(store.clone()),
            store,
            pipeline,
            tasks: RwLock::new(Vec::new()),
            results: RwLock::new(Vec::new()),
            cache: Mutex::new(SearchCache::new()),
            session: Mutex::new(SearchSession::default()),
            passes: AtomicU64::new(0),
        }
    }

    /// Pulls the task collection and scope preferences from the store.
    /// Invalid records are dropped on the way in.
    pub async fn load(&self) -> Result<()> {
        let fetched = self.store.all_tasks().await?;
        let (valid, dropped) = integrity::retain_valid(fetched);
        info!("loaded {} tasks ({dropped} dropped)", valid.len());
        *self.tasks.write().await = valid;
        self.cache.lock().await.clear();

        if let Ok(Some(prefs)) = self.store.preferences().await {
            if prefs.remember_scope {
                self.session.lock().await.criteria.scope = prefs.default_scope;
            }
        }
        Ok(())
    }

    /// Wholesale collection swap (import, bulk CRUD, board deletion). Cached
    /// result sets reference tasks by identifier and cannot be trusted
    /// across a swap, so the cache is cleared before the re-apply.
    pub async fn replace_tasks(&self, tasks: Vec<Task>) {
        *self.tasks.write().await = tasks;
        self.cache.lock().await.clear();
        self.apply_filters().await;
    }

    /// Runs one orchestrator pass, mapping any failure into session state.
    pub async fn apply_filters(&self) {
        if let Err(err) = self.run_filter_pass().await {
            warn!("filter pass failed: {err}");
            let mut session = self.session.lock().await;
            session.error = Some(err.to_string());
            session.is_searching = false;
        }
    }

    /// Merges a partial criteria update and re-applies.
    pub async fn set_filters(&self, patch: FilterPatch) {
        self.session.lock().await.criteria.merge(patch);
        self.apply_filters().await;
    }

    /// Flips the cross-board scope. When preferences ask to remember the
    /// scope, the new value is pushed to the store once per toggle, not on
    /// every filter pass.
    pub async fn toggle_cross_board(&self) -> ScopeMode {
        let new_scope = {
            let mut session = self.session.lock().await;
            session.criteria.scope = match session.criteria.scope {
                ScopeMode::CurrentBoard => ScopeMode::AllBoards,
                ScopeMode::AllBoards => ScopeMode::CurrentBoard,
            };
            session.criteria.scope
        };

        match self.store.preferences().await {
            Ok(Some(prefs)) if prefs.remember_scope => {
                let update = ScopePreferences {
                    default_scope: new_scope,
                    remember_scope: true,
                };
                if let Err(err) = self.store.set_preferences(update).await {
                    warn!("failed to persist scope preference: {err}");
                }
            }
            Ok(_) => {}
            Err(err) => warn!("failed to read scope preferences: {err}"),
        }

        self.apply_filters().await;
        new_scope
    }

    /// Resets everything except the board id and scope.
    pub async fn clear_filters(&self) {
        {
            let mut session = self.session.lock().await;
            let board_id = session.criteria.board_id.clone();
            let scope = session.criteria.scope;
            session.criteria = FilterCriteria {
                board_id,
                scope,
                ..FilterCriteria::default()
            };
            session.notice = None;
        }
        self.apply_filters().await;
    }

    /// Resets only the free-text query and the highlighted task.
    pub async fn clear_search(&self) {
        {
            let mut session = self.session.lock().await;
            session.criteria.query.clear();
            session.highlighted_id = None;
        }
        self.apply_filters().await;
    }

    /// Resolves the board owning `task_id`, validating that the board is
    /// still accessible, and highlights the task for navigation.
    pub async fn navigate_to_task_board(&self, task_id: &str) -> Result<String> {
        let board_id = self
            .tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.board_id.clone())
            .ok_or_else(|| SearchError::TaskNotFound(task_id.to_string()))?;

        if !self.access.is_accessible(&board_id).await {
            return Err(SearchError::BoardInaccessible(board_id));
        }

        self.session.lock().await.highlighted_id = Some(task_id.to_string());
        Ok(board_id)
    }

    /// Explicitly invokable reset for a stuck or errored session. Clears the
    /// query, error, searching flag, and the whole cache, then re-runs the
    /// orchestrator; if that re-run itself fails, falls back to a last-resort
    /// reset that publishes the unfiltered collection. This path never
    /// propagates an error.
    pub async fn recover_from_search_error(&self) {
        info!("recovering search session");
        {
            let mut session = self.session.lock().await;
            session.criteria.query.clear();
            session.error = None;
            session.notice = None;
            session.is_searching = false;
        }
        self.cache.lock().await.clear();

        if let Err(err) = self.run_filter_pass().await {
            error!("recovery pass failed, resetting session: {err}");
            let snapshot = self.tasks.read().await.clone();
            *self.results.write().await = snapshot;

            let mut session = self.session.lock().await;
            let board_id = session.criteria.board_id.clone();
            let scope = session.criteria.scope;
            session.criteria = FilterCriteria {
                board_id,
                scope,
                ..FilterCriteria::default()
            };
            session.is_searching = false;
            session.error = Some(ERR_TERMINAL.to_string());
            session.notice = None;
            drop(session);

            self.cache.lock().await.clear();
        }
    }

    /// Ad-hoc record-level integrity check for the UI.
    #[must_use]
    pub fn check_task(&self, task: &Task) -> bool {
        integrity::validate(task)
    }

    pub async fn set_highlighted(&self, task_id: Option<String>) {
        self.session.lock().await.highlighted_id = task_id;
    }

    pub async fn results(&self) -> Vec<Task> {
        self.results.read().await.clone()
    }

    pub async fn live_tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    pub async fn session(&self) -> SearchSession {
        self.session.lock().await.clone()
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.session.lock().await.criteria.clone()
    }

    /// Completed orchestrator passes, for diagnostics and tests.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    pub(crate) async fn set_session_error(&self, message: impl Into<String>) {
        self.session.lock().await.error = Some(message.into());
    }

    pub(crate) async fn update_query(&self, query: String, is_searching: bool) {
        let mut session = self.session.lock().await;
        session.criteria.query = query;
        session.is_searching = is_searching;
        if is_searching {
            session.error = None;
        }
    }

    async fn run_filter_pass(&self) -> Result<()> {
        self.passes.fetch_add(1, Ordering::Relaxed);

        // 1. Integrity revalidation: failures are dropped from the live
        // collection permanently, not hidden behind the filtered view.
        {
            let mut tasks = self.tasks.write().await;
            let (valid, dropped) = integrity::retain_valid(std::mem::take(&mut *tasks));
            *tasks = valid;
            if dropped > 0 {
                debug!("pass dropped {dropped} invalid tasks");
            }
        }

        let criteria = self.session.lock().await.criteria.clone();

        // 2. Cross-board revalidation. A whole-list failure is swallowed: a
        // stale cross-board view beats blocking search entirely.
        if criteria.scope == ScopeMode::AllBoards {
            match self.access.accessible_ids().await {
                Ok(live_boards) => {
                    // Re-acquire after the await; the collection may have
                    // changed while the store round-trip was in flight.
                    let mut tasks = self.tasks.write().await;
                    tasks.retain(|t| live_boards.contains(&t.board_id));
                }
                Err(err) => {
                    warn!("cross-board revalidation unavailable, proceeding unvalidated: {err}");
                }
            }
        }

        // 3. Cache probe, only for the expensive free-text case.
        if criteria.has_query() {
            let snapshot = self.tasks.read().await.clone();
            let mut cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&criteria, &snapshot) {
                drop(cache);
                debug!("cache hit for query {:?}", criteria.query);
                *self.results.write().await = hit;
                let mut session = self.session.lock().await;
                session.is_searching = false;
                session.error = None;
                return Ok(());
            }
        }

        // 4. Complexity signal: one tick so the UI can paint a loading
        // affordance before the synchronous filtering work.
        let collection_len = self.tasks.read().await.len();
        let complex = criteria.has_query()
            && (collection_len > COMPLEX_COLLECTION
                || criteria.scope == ScopeMode::AllBoards
                || !criteria.tags.is_empty()
                || criteria.has_date_range());
        if complex {
            let needs_tick = {
                let mut session = self.session.lock().await;
                if session.is_searching {
                    false
                } else {
                    session.is_searching = true;
                    true
                }
            };
            if needs_tick {
                tokio::task::yield_now().await;
            }
        }

        // 5. Pipeline with recovery. The snapshot is taken after the yield,
        // never captured across a suspension point.
        let snapshot = self.tasks.read().await.clone();
        let (mut results, notice, collapsed) = self.execute_with_recovery(&snapshot, &criteria)?;

        // 6. Post-validation of pipeline output.
        results.retain(integrity::validate);

        // 7. Cache write for the expensive case only.
        if criteria.has_query() && !results.is_empty() && results.len() < MAX_CACHEABLE_RESULTS {
            self.cache.lock().await.set(&criteria, &results);
        }

        // 8. Probabilistic expiry sweep (~10% of passes).
        if cleanup_roll_hits() {
            self.cache.lock().await.cleanup_expired();
        }

        // 9. Publish. Error state is preserved unless a step above set or
        // cleared it; the notice reflects this pass's recovery outcome.
        *self.results.write().await = results;
        let mut session = self.session.lock().await;
        session.is_searching = false;
        if let Some(collapsed) = collapsed {
            session.criteria = collapsed;
        }
        if let Some(notice) = notice {
            session.error = Some(notice.clone());
            session.notice = Some(notice);
        } else {
            session.notice = None;
        }
        Ok(())
    }

    /// Two-tier pipeline recovery: simplified retry first, then the whole
    /// unfiltered collection with criteria collapsed to board/scope. Fatal
    /// errors skip both tiers and reach the orchestrator-level guard.
    fn execute_with_recovery(
        &self,
        tasks: &[Task],
        criteria: &FilterCriteria,
    ) -> Result<(Vec<Task>, Option<String>, Option<FilterCriteria>)> {
        match self.pipeline.apply(tasks, criteria) {
            Ok(results) => Ok((results, None, None)),
            Err(SearchError::Fatal(msg)) => Err(SearchError::Fatal(msg)),
            Err(err) => {
                warn!("filter pipeline failed ({err}); retrying with simplified criteria");
                match self.pipeline.apply(tasks, &criteria.simplified()) {
                    Ok(results) => {
                        Ok((results, Some(NOTICE_SIMPLIFIED.to_string()), None))
                    }
                    Err(SearchError::Fatal(msg)) => Err(SearchError::Fatal(msg)),
                    Err(retry_err) => {
                        error!("simplified retry failed ({retry_err}); showing unfiltered collection");
                        Ok((
                            tasks.to_vec(),
                            Some(NOTICE_SHOWING_ALL.to_string()),
                            Some(criteria.scope_only()),
                        ))
                    }
                }
            }
        }
    }
}

/// Roll for the ~10% expiry sweep. Best effort: if the entropy source is
/// unavailable the sweep is skipped, never forced.
fn cleanup_roll_hits() -> bool {
    let mut byte = [0u8; 1];
    getrandom::getrandom(&mut byte).is_ok() && byte[0] < 26
}
