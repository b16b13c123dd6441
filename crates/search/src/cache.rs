use board_model::{unix_ms_now, FilterCriteria, Task};
use log::{debug, warn};
use std::collections::{HashMap, HashSet, VecDeque};

/// Entry age limit. Repeated identical searches are common; anything older
/// than this is recomputed.
const TTL_MS: u64 = 5 * 60 * 1000;

/// Maximum number of cached result sets.
const MAX_ENTRIES: usize = 50;

/// Result sets at or above this size are never cached, to bound memory use.
pub const MAX_CACHEABLE_RESULTS: usize = 1000;

struct CacheEntry {
    tasks: Vec<Task>,
    created_ms: u64,
}

/// Key-to-result-set cache with TTL expiry, staleness detection against the
/// live collection, and FIFO eviction (insertion order, not LRU; simplicity
/// over optimality).
pub struct SearchCache {
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
    ttl_ms: u64,
    capacity: usize,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(TTL_MS, MAX_ENTRIES)
    }

    #[must_use]
    pub fn with_limits(ttl_ms: u64, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl_ms,
            capacity,
        }
    }

    /// Looks up the result set for `criteria`, validated against `live`.
    ///
    /// Misses (and silently drops the entry) when the entry is past TTL or
    /// when any cached task id no longer exists in the live collection —
    /// stale references are detected lazily here, not eagerly on mutation.
    pub fn get(&mut self, criteria: &FilterCriteria, live: &[Task]) -> Option<Vec<Task>> {
        let key = cache_key(criteria)?;
        let created_ms = self.entries.get(&key)?.created_ms;

        // Valid strictly under TTL; an entry exactly at TTL is expired.
        if unix_ms_now().saturating_sub(created_ms) >= self.ttl_ms {
            debug!("cache entry expired: {key}");
            self.remove(&key);
            return None;
        }

        let stale = {
            let entry = self.entries.get(&key)?;
            let live_ids: HashSet<&str> = live.iter().map(|t| t.id.as_str()).collect();
            !entry.tasks.iter().all(|t| live_ids.contains(t.id.as_str()))
        };
        if stale {
            debug!("cache entry stale (deleted task): {key}");
            self.remove(&key);
            return None;
        }

        self.entries.get(&key).map(|entry| entry.tasks.clone())
    }

    /// Caches a result set. Skipped for very large sets and for criteria
    /// without a free-text query (the cache is keyed to the expensive case).
    /// A key-serialization failure clears the whole cache rather than leave
    /// it possibly inconsistent.
    pub fn set(&mut self, criteria: &FilterCriteria, results: &[Task]) {
        if results.len() >= MAX_CACHEABLE_RESULTS {
            debug!("skipping cache write: {} results", results.len());
            return;
        }
        if !criteria.has_query() {
            return;
        }
        let Some(key) = cache_key(criteria) else {
            warn!("cache key serialization failed; clearing cache");
            self.clear();
            return;
        };

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                tasks: results.to_vec(),
                created_ms: unix_ms_now(),
            },
        );
    }

    /// Removes all entries past TTL. Invoked probabilistically by the
    /// orchestrator rather than on a timer.
    pub fn cleanup_expired(&mut self) {
        let now = unix_ms_now();
        let ttl = self.ttl_ms;
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| now.saturating_sub(e.created_ms) >= ttl)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            self.remove(key);
        }
        if !expired.is_empty() {
            debug!("cache sweep removed {} expired entries", expired.len());
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts the oldest 20% of entries in insertion order.
    fn evict_oldest(&mut self) {
        let batch = (self.capacity / 5).max(1);
        for _ in 0..batch {
            let Some(key) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&key);
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    #[cfg(test)]
    fn backdate(&mut self, criteria: &FilterCriteria, age_ms: u64) {
        let key = cache_key(criteria).expect("key");
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.created_ms = entry.created_ms.saturating_sub(age_ms);
        }
    }
}

/// Canonical serialization of the criteria: tags sorted, bounds already
/// primitive ms. Field order is fixed by the canonical struct.
fn cache_key(criteria: &FilterCriteria) -> Option<String> {
    serde_json::to_string(&criteria.canonical()).ok()
}
