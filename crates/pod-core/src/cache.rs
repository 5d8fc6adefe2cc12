//! In-memory TTL cache for read paths.
//!
//! The cache is an explicit object constructed once per process and injected
//! into consumers; it is process-local with no cross-process coherence, so any
//! code path that mutates cached data must invalidate the relevant keys.
//! Expiry is checked lazily on access, never actively swept.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key→value store with per-entry TTL and prefix invalidation.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Remove a single entry.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().expect("cache lock poisoned").remove(key);
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .retain(|key, _| !key.starts_with(prefix));
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().expect("cache lock poisoned").clear();
    }

    /// Number of entries currently stored, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> TtlCache<V> {
    /// Return the cached value for `key`, or run `fetcher` and cache its result
    /// for `ttl`. An entry past its expiry instant is treated as a miss. A
    /// fetcher error is returned as-is and nothing is cached.
    pub async fn get_cached<F, Fut, E>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        {
            let entries = self.entries.lock().expect("cache lock poisoned");
            if let Some(entry) = entries.get(key) {
                if Instant::now() < entry.expires_at {
                    tracing::debug!(key = key, "cache hit");
                    return Ok(entry.value.clone());
                }
            }
        }

        tracing::debug!(key = key, "cache miss");
        let value = fetcher().await?;

        self.entries.lock().expect("cache lock poisoned").insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(value)
    }
}
