use crate::error::Result;
use board_model::{FilterCriteria, ScopeMode, Task};

/// Collections above this size use the indexed text-search loop that avoids
/// building the concatenated haystack for title-only matches.
const LARGE_COLLECTION: usize = 500;

/// Ordered, synchronous filter stages over the live collection.
///
/// Behind a trait so the orchestrator's recovery chain can be exercised with
/// an injected failing implementation.
pub trait Pipeline: Send + Sync {
    fn apply(&self, tasks: &[Task], criteria: &FilterCriteria) -> Result<Vec<Task>>;
}

/// The production pipeline. Stage order is fixed, cheapest rejection first:
/// board scope, status, priority, tags, date range, then free-text search
/// last because it is the most expensive. After each stage an empty
/// intermediate set short-circuits the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardPipeline;

impl Pipeline for StandardPipeline {
    fn apply(&self, tasks: &[Task], criteria: &FilterCriteria) -> Result<Vec<Task>> {
        let mut current: Vec<Task> = tasks.to_vec();

        // Board scope applies only when a board is set and the search is not
        // cross-board; under AllBoards the restriction is bypassed, not
        // cleared.
        if let Some(board_id) = &criteria.board_id {
            if criteria.scope == ScopeMode::CurrentBoard {
                current.retain(|t| &t.board_id == board_id);
                if current.is_empty() {
                    return Ok(current);
                }
            }
        }

        if let Some(status) = criteria.status {
            current.retain(|t| t.status == status);
            if current.is_empty() {
                return Ok(current);
            }
        }

        if let Some(priority) = criteria.priority {
            current.retain(|t| t.priority == Some(priority));
            if current.is_empty() {
                return Ok(current);
            }
        }

        // Tags compare case-insensitively, so criteria that canonicalize to
        // the same cache key also select the same tasks.
        if !criteria.tags.is_empty() {
            let wanted: Vec<String> = criteria.tags.iter().map(|t| t.to_lowercase()).collect();
            current.retain(|t| t.tags.iter().any(|tag| wanted.contains(&tag.to_lowercase())));
            if current.is_empty() {
                return Ok(current);
            }
        }

        if criteria.has_date_range() {
            let after = criteria.created_after_ms.unwrap_or(0);
            let before = criteria.created_before_ms.unwrap_or(u64::MAX);
            current.retain(|t| t.created_ms >= after && t.created_ms <= before);
            if current.is_empty() {
                return Ok(current);
            }
        }

        if criteria.has_query() {
            current = text_search(current, &criteria.query);
        }

        Ok(current)
    }
}

/// Free-text matching: a task matches if its title contains the full query
/// as a substring (fast path), otherwise if every query word appears in the
/// concatenation of title, description, and tags.
fn text_search(tasks: Vec<Task>, raw_query: &str) -> Vec<Task> {
    let query = raw_query.trim().to_lowercase();
    if query.is_empty() {
        return tasks;
    }
    let words: Vec<&str> = query.split_whitespace().collect();

    if tasks.len() > LARGE_COLLECTION {
        // Indexed loop with early continue on title match, so the haystack
        // allocation is skipped for the common case under load.
        let mut out = Vec::new();
        for task in tasks {
            if task.title.to_lowercase().contains(&query) {
                out.push(task);
                continue;
            }
            if words_match(&task, &words) {
                out.push(task);
            }
        }
        out
    } else {
        tasks
            .into_iter()
            .filter(|t| t.title.to_lowercase().contains(&query) || words_match(t, &words))
            .collect()
    }
}

fn words_match(task: &Task, words: &[&str]) -> bool {
    let haystack = searchable_text(task);
    words.iter().all(|w| haystack.contains(w))
}

fn searchable_text(task: &Task) -> String {
    let mut text = task.title.to_lowercase();
    if let Some(description) = &task.description {
        text.push(' ');
        text.push_str(&description.to_lowercase());
    }
    for tag in &task.tags {
        text.push(' ');
        text.push_str(&tag.to_lowercase());
    }
    text
}
