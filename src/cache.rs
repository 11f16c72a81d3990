use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Entry stored in the map. Values are kept as serialized JSON so the cache
/// stays type-erased; staleness is a flag, not a deletion, so an invalidated
/// key still shows up in `len()` until the next write.
#[derive(Clone)]
pub(crate) struct CacheEntry {
    value: String,
    stale: bool,
}

/// String-keyed query cache shared by the REST paths and the notification
/// socket dispatcher.
///
/// Keys are colon-joined paths, e.g. `notifications`,
/// `notifications:unread-count`, `workspaces:<id>:boards`. Invalidation marks
/// a key and everything under it stale; the next read misses and re-fetches
/// from the REST source of truth.
#[derive(Clone)]
pub struct QueryCache {
    local: Arc<DashMap<String, CacheEntry>>,
    invalidations: Arc<AtomicU64>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            local: Arc::new(DashMap::new()),
            invalidations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fresh cached value for `key`, or `None` if missing or stale.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.local.get(key)?;
        if entry.stale {
            return None;
        }
        serde_json::from_str(&entry.value).ok()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache set: serialize failed, skipping");
                return;
            }
        };
        self.local.insert(
            key.to_string(),
            CacheEntry {
                value: json,
                stale: false,
            },
        );
    }

    /// Mark `prefix` and every key under `prefix:` stale.
    ///
    /// Entries are not removed and never rewritten with new data here; the
    /// socket dispatcher relies on that (it must never mutate a cached
    /// notification directly).
    pub fn invalidate(&self, prefix: &str) {
        let sub = format!("{}:", prefix);
        let mut hits = 0usize;
        for mut entry in self.local.iter_mut() {
            if entry.key() == prefix || entry.key().starts_with(&sub) {
                entry.stale = true;
                hits += 1;
            }
        }
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(prefix, hits, "cache invalidated");
    }

    pub fn remove(&self, key: &str) {
        self.local.remove(key);
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Number of `invalidate` calls so far. Observability hook for tests and
    /// the CLI's debug output.
    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn is_stale(&self, key: &str) -> bool {
        self.local.get(key).map(|e| e.stale).unwrap_or(false)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}
