mod error;
mod memory;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;

use async_trait::async_trait;
use board_model::{Board, ScopePreferences, Task};

/// Narrow async contract to the persistent record store.
///
/// The search engine only reads through this trait; the surrounding CRUD
/// layer owns writes. Every method may fail (store unreachable, corrupted
/// collection) and callers decide whether failure is fatal.
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn all_tasks(&self) -> Result<Vec<Task>>;
    async fn get_task(&self, id: &str) -> Result<Option<Task>>;
    async fn put_task(&self, task: Task) -> Result<()>;
    async fn delete_task(&self, id: &str) -> Result<()>;

    async fn all_boards(&self) -> Result<Vec<Board>>;

    async fn preferences(&self) -> Result<Option<ScopePreferences>>;
    async fn set_preferences(&self, prefs: ScopePreferences) -> Result<()>;
}
