use crate::engine::SearchEngine;
use crate::limiter::FixedWindowLimiter;
use log::debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Quiet window after the last keystroke before a search runs.
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Longest accepted query; anything beyond is truncated during sanitizing.
const MAX_QUERY_LEN: usize = 256;

pub(crate) const ERR_RATE_LIMITED: &str = "search rate limit exceeded, try again shortly";

const SEARCH_ACTION: &str = "search";

/// Owns debounce timing and rate limiting for the free-text query.
///
/// The pending debounce task is an instance-owned handle, so independent
/// controllers (parallel tests, multiple sessions) never interfere. Only the
/// most recently scheduled task survives; earlier ones are aborted outright.
pub struct SearchInputController {
    engine: Arc<SearchEngine>,
    limiter: Mutex<FixedWindowLimiter>,
    pending: Mutex<Option<JoinHandle<()>>>,
    window: Duration,
}

impl SearchInputController {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self::with_window(engine, DEBOUNCE)
    }

    pub fn with_window(engine: Arc<SearchEngine>, window: Duration) -> Self {
        Self {
            engine,
            limiter: Mutex::new(FixedWindowLimiter::default()),
            pending: Mutex::new(None),
            window,
        }
    }

    /// Accepts a raw keystroke-level query. The criteria's query field
    /// updates immediately so the displayed input never lags; the actual
    /// filter pass is deferred by the debounce window.
    pub async fn set_query(&self, raw: &str) {
        let sanitized = sanitize_query(raw);

        if !self.limiter.lock().await.check(SEARCH_ACTION) {
            debug!("search input rate limited");
            self.engine.set_session_error(ERR_RATE_LIMITED).await;
            return;
        }

        // Supersede any scheduled run; no stacked executions, no
        // out-of-order publication of an older query's results.
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }

        if sanitized.is_empty() {
            self.engine.update_query(String::new(), false).await;
            self.engine.apply_filters().await;
            return;
        }

        self.engine.update_query(sanitized, true).await;

        let engine = self.engine.clone();
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // apply_filters maps any failure into session state and always
            // leaves is_searching false.
            engine.apply_filters().await;
        });
        *self.pending.lock().await = Some(handle);
    }

    /// Cancels a scheduled run without touching the criteria.
    pub async fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().await.take() {
            handle.abort();
        }
    }
}

/// Strips control characters, collapses whitespace runs, trims, and caps
/// length. Keeps the query safe to log and to embed in cache keys.
#[must_use]
pub fn sanitize_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_QUERY_LEN));
    let mut last_was_space = true;
    for c in raw.chars() {
        if out.chars().count() >= MAX_QUERY_LEN {
            break;
        }
        if c.is_control() {
            continue;
        }
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
            continue;
        }
        out.push(c);
        last_was_space = false;
    }
    out.trim_end().to_string()
}
