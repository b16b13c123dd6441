use crate::{BoardStore, Result, StoreError};
use async_trait::async_trait;
use board_model::{Board, ScopePreferences, Task};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory store backend.
///
/// Serves as the embedded default and as the test double: `fail_boards`
/// makes `all_boards` reject, which exercises the engine's fail-closed
/// cross-board degradation paths.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<String, Task>>,
    boards: RwLock<HashMap<String, Board>>,
    prefs: RwLock<Option<ScopePreferences>>,
    fail_boards: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_tasks(tasks: Vec<Task>) -> Self {
        let store = Self::new();
        for task in tasks {
            let mut guard = store.tasks.write().await;
            guard.insert(task.id.clone(), task);
        }
        store
    }

    pub async fn insert_board(&self, board: Board) {
        self.boards.write().await.insert(board.id.clone(), board);
    }

    /// Makes subsequent `all_boards` calls fail; used to simulate an
    /// unreachable store.
    pub fn set_boards_failing(&self, failing: bool) {
        self.fail_boards.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn all_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.read().await.get(id).cloned())
    }

    async fn put_task(&self, task: Task) -> Result<()> {
        self.tasks.write().await.insert(task.id.clone(), task);
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        if self.tasks.write().await.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn all_boards(&self) -> Result<Vec<Board>> {
        if self.fail_boards.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("board list unreachable".to_string()));
        }
        Ok(self.boards.read().await.values().cloned().collect())
    }

    async fn preferences(&self) -> Result<Option<ScopePreferences>> {
        Ok(*self.prefs.read().await)
    }

    async fn set_preferences(&self, prefs: ScopePreferences) -> Result<()> {
        *self.prefs.write().await = Some(prefs);
        Ok(())
    }
}
