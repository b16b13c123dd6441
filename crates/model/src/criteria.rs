use crate::{TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};

/// Search scope across boards.
///
/// `AllBoards` bypasses the `board_id` restriction without clearing it, so
/// toggling back to `CurrentBoard` restores the previous scoping.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeMode {
    CurrentBoard,
    AllBoards,
}

impl Default for ScopeMode {
    fn default() -> Self {
        Self::CurrentBoard
    }
}

/// The full set of filter criteria applied by the pipeline.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub scope: ScopeMode,
    #[serde(default)]
    pub created_after_ms: Option<u64>,
    #[serde(default)]
    pub created_before_ms: Option<u64>,
}

impl FilterCriteria {
    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    #[must_use]
    pub const fn has_date_range(&self) -> bool {
        self.created_after_ms.is_some() || self.created_before_ms.is_some()
    }

    /// Criteria with the expensive stages stripped, used by the first
    /// recovery tier.
    #[must_use]
    pub fn simplified(&self) -> Self {
        Self {
            query: String::new(),
            tags: Vec::new(),
            ..self.clone()
        }
    }

    /// Criteria collapsed to bare board/scope, used by the last recovery tier.
    #[must_use]
    pub fn scope_only(&self) -> Self {
        Self {
            board_id: self.board_id.clone(),
            scope: self.scope,
            ..Self::default()
        }
    }

    /// Canonical form used for cache keying: tags sorted and deduplicated,
    /// query trimmed and lowercased. Field order is fixed by the struct, so
    /// serializing the canonical form yields a stable key.
    #[must_use]
    pub fn canonical(&self) -> CanonicalCriteria {
        let mut tags: Vec<String> = self.tags.iter().map(|t| t.trim().to_lowercase()).collect();
        tags.sort_unstable();
        tags.dedup();
        CanonicalCriteria {
            query: self.query.trim().to_lowercase(),
            status: self.status,
            priority: self.priority,
            tags,
            board_id: self.board_id.clone(),
            scope: self.scope,
            created_after_ms: self.created_after_ms,
            created_before_ms: self.created_before_ms,
        }
    }
}

/// Order-normalized criteria; exists only to produce stable cache keys.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CanonicalCriteria {
    pub query: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Vec<String>,
    pub board_id: Option<String>,
    pub scope: ScopeMode,
    pub created_after_ms: Option<u64>,
    pub created_before_ms: Option<u64>,
}

/// Partial update merged into existing criteria by the engine's
/// `set_filters`. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub status: Option<Option<TaskStatus>>,
    pub priority: Option<Option<TaskPriority>>,
    pub tags: Option<Vec<String>>,
    pub board_id: Option<Option<String>>,
    pub created_after_ms: Option<Option<u64>>,
    pub created_before_ms: Option<Option<u64>>,
}

impl FilterCriteria {
    pub fn merge(&mut self, patch: FilterPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(board_id) = patch.board_id {
            self.board_id = board_id;
        }
        if let Some(after) = patch.created_after_ms {
            self.created_after_ms = after;
        }
        if let Some(before) = patch.created_before_ms {
            self.created_before_ms = before;
        }
    }
}
