use crate::error::Result;
use board_store::BoardStore;
use log::warn;
use std::collections::HashSet;
use std::sync::Arc;

/// Validates that referenced boards still exist and are not archived.
pub struct BoardAccess {
    store: Arc<dyn BoardStore>,
}

impl BoardAccess {
    pub fn new(store: Arc<dyn BoardStore>) -> Self {
        Self { store }
    }

    /// True iff the board exists and carries no archival timestamp. Any
    /// fetch failure is treated as inaccessible (fail-closed) and logged as
    /// a warning; the caller decides whether that is fatal.
    pub async fn is_accessible(&self, board_id: &str) -> bool {
        match self.store.all_boards().await {
            Ok(boards) => boards
                .iter()
                .any(|b| b.id == board_id && !b.is_archived()),
            Err(err) => {
                warn!("board access check failed for {board_id}: {err}");
                false
            }
        }
    }

    /// Ids of all live (non-archived) boards, for bulk revalidation. A
    /// whole-list failure propagates; the orchestrator swallows it in favor
    /// of a degraded cross-board view.
    pub async fn accessible_ids(&self) -> Result<HashSet<String>> {
        let boards = self.store.all_boards().await?;
        Ok(boards
            .into_iter()
            .filter(|b| !b.is_archived())
            .map(|b| b.id)
            .collect())
    }
}
