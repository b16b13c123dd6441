use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_MAX_CALLS: u32 = 30;
const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Fixed-window rate limiter keyed by action name.
///
/// Counts reset when a window elapses; a burst right at a window boundary
/// can briefly see up to twice the limit, which is acceptable for keystroke
/// throttling.
pub struct FixedWindowLimiter {
    max_calls: u32,
    window: Duration,
    windows: HashMap<String, WindowState>,
}

struct WindowState {
    started: Instant,
    calls: u32,
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALLS, DEFAULT_WINDOW)
    }
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            windows: HashMap::new(),
        }
    }

    /// Records one call for `action`; returns false when the current window
    /// is over limit.
    pub fn check(&mut self, action: &str) -> bool {
        let now = Instant::now();
        let state = self
            .windows
            .entry(action.to_string())
            .or_insert(WindowState { started: now, calls: 0 });

        if now.duration_since(state.started) >= self.window {
            state.started = now;
            state.calls = 0;
        }

        if state.calls >= self.max_calls {
            return false;
        }
        state.calls += 1;
        true
    }
}
