use board_model::{FilterCriteria, ScopeMode};

/// Search-session state published to the UI layer.
///
/// Mutated only by the orchestrator and the input controller; consumers get
/// snapshots. `is_searching` is transient and never survives a completed
/// orchestrator pass.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    pub criteria: FilterCriteria,
    pub is_searching: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub highlighted_id: Option<String>,
}

impl SearchSession {
    #[must_use]
    pub const fn scope(&self) -> ScopeMode {
        self.criteria.scope
    }
}
