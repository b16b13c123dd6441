use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

mod criteria;

pub use criteria::{CanonicalCriteria, FilterCriteria, FilterPatch, ScopeMode};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// A single task record as stored and filtered.
///
/// Timestamps are unix milliseconds. A `Done` task should carry
/// `progress == Some(100)` and a completion timestamp; a task in any other
/// status must not carry `completed_ms`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    pub board_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_ms: u64,
    pub updated_ms: u64,
    #[serde(default)]
    pub completed_ms: Option<u64>,
    #[serde(default)]
    pub archived_ms: Option<u64>,
    #[serde(default)]
    pub progress: Option<u8>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, board_id: impl Into<String>) -> Self {
        let now = unix_ms_now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::Todo,
            priority: None,
            board_id: board_id.into(),
            tags: Vec::new(),
            created_ms: now,
            updated_ms: now,
            completed_ms: None,
            archived_ms: None,
            progress: None,
        }
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archived_ms.is_some()
    }

    /// Marks the task done, refreshing the update timestamp and keeping the
    /// progress/completion invariant.
    pub fn complete(&mut self) {
        let now = unix_ms_now();
        self.status = TaskStatus::Done;
        self.progress = Some(100);
        self.completed_ms = Some(now);
        self.updated_ms = now;
    }
}

/// A board ("partition") owning a set of tasks.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archived_ms: Option<u64>,
}

impl Board {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            archived_ms: None,
        }
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archived_ms.is_some()
    }
}

/// Persisted search-scope preferences.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ScopePreferences {
    pub default_scope: ScopeMode,
    pub remember_scope: bool,
}

impl Default for ScopePreferences {
    fn default() -> Self {
        Self {
            default_scope: ScopeMode::CurrentBoard,
            remember_scope: false,
        }
    }
}

pub fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
