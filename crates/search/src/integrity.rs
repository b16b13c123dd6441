use board_model::Task;
use log::warn;

/// Checks a single task against the structural contract.
///
/// Returns false and logs a warning on any violation; never panics. Enum
/// fields and the tag list are already enforced by the type system at
/// deserialization, so this covers the semantic residue: non-empty
/// identifiers and title, plausible timestamps, bounded progress.
#[must_use]
pub fn validate(task: &Task) -> bool {
    if task.id.trim().is_empty() {
        warn!("dropping task with empty id (title: {:?})", task.title);
        return false;
    }
    if task.title.trim().is_empty() {
        warn!("dropping task {}: empty title", task.id);
        return false;
    }
    if task.board_id.trim().is_empty() {
        warn!("dropping task {}: empty board reference", task.id);
        return false;
    }
    if task.created_ms == 0 || task.updated_ms == 0 {
        warn!("dropping task {}: invalid timestamps", task.id);
        return false;
    }
    if let Some(progress) = task.progress {
        if progress > 100 {
            warn!("dropping task {}: progress {} out of range", task.id, progress);
            return false;
        }
    }
    true
}

/// Drops invalid tasks from the collection, returning the valid subset and
/// the number of records dropped. The caller replaces the live collection
/// with the returned subset (permanent drop, not a filtered view).
pub fn retain_valid(tasks: Vec<Task>) -> (Vec<Task>, usize) {
    let before = tasks.len();
    let valid: Vec<Task> = tasks.into_iter().filter(validate).collect();
    let dropped = before - valid.len();
    if dropped > 0 {
        warn!("integrity check dropped {dropped} of {before} tasks");
    }
    (valid, dropped)
}
