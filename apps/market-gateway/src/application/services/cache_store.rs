//! Two-tier response cache.
//!
//! Entries are fresh for `fresh_ttl` and usable as a degradation fallback
//! until `stale_ttl`. Payloads are stored as JSON values and cloned out, so
//! callers never share state with the store.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::Instant;

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Age below which an entry is served directly.
    pub fresh_ttl: Duration,
    /// Age below which an entry may be served during upstream failure.
    pub stale_ttl: Duration,
    /// Size above which a `put` sweeps expired entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fresh_ttl: Duration::from_secs(30),
            stale_ttl: Duration::from_secs(300),
            max_entries: 200,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    written_at: Instant,
}

/// Mutex-guarded key/value store with fresh and stale tiers.
#[derive(Debug)]
pub struct CacheStore {
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl CacheStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store configuration.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Payload younger than the fresh TTL.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.written_at.elapsed() < self.config.fresh_ttl)
            .map(|entry| entry.payload.clone())
    }

    /// Payload younger than the stale TTL, fresh or not.
    ///
    /// An entry past the stale TTL is removed on the way out.
    pub fn get_stale(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.written_at.elapsed() < self.config.stale_ttl {
            return Some(entry.payload.clone());
        }
        entries.remove(key);
        None
    }

    /// Age of the entry under `key`.
    pub fn age(&self, key: &str) -> Option<Duration> {
        self.entries
            .lock()
            .get(key)
            .map(|entry| entry.written_at.elapsed())
    }

    /// Write `payload`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, payload: Value) {
        let mut entries = self.entries.lock();
        entries.insert(
            key.into(),
            CacheEntry {
                payload,
                written_at: Instant::now(),
            },
        );

        if entries.len() > self.config.max_entries {
            let before = entries.len();
            let stale_ttl = self.config.stale_ttl;
            entries.retain(|_, entry| entry.written_at.elapsed() < stale_ttl);
            tracing::debug!(
                evicted = before - entries.len(),
                remaining = entries.len(),
                "Cache eviction pass"
            );
        }
    }

    /// Remove the entry under `key`.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Remove every entry older than the stale TTL. Returns the count removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let stale_ttl = self.config.stale_ttl;
        entries.retain(|_, entry| entry.written_at.elapsed() < stale_ttl);
        before - entries.len()
    }

    /// Number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> CacheStore {
        CacheStore::new(CacheConfig {
            fresh_ttl: Duration::from_secs(30),
            stale_ttl: Duration::from_secs(300),
            max_entries: 3,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn put_then_get_round_trips() {
        let cache = store();
        let payload = json!({"AAPL": {"lastPrice": 190.0}});

        cache.put("quotes:AAPL", payload.clone());

        assert_eq!(cache.get("quotes:AAPL"), Some(payload));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_expires_before_stale() {
        let cache = store();
        cache.put("k", json!(1));

        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.get_stale("k"), Some(json!(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn both_tiers_miss_after_stale_ttl() {
        let cache = store();
        cache.put("k", json!(1));

        tokio::time::advance(Duration::from_secs(301)).await;

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.get_stale("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_refreshes() {
        let cache = store();
        cache.put("k", json!("old"));
        tokio::time::advance(Duration::from_secs(60)).await;

        cache.put("k", json!("new"));

        assert_eq!(cache.get("k"), Some(json!("new")));
        assert_eq!(cache.age("k"), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn oversize_put_evicts_expired_only() {
        let cache = store();
        cache.put("a", json!(1));
        cache.put("b", json!(2));
        tokio::time::advance(Duration::from_secs(400)).await;
        cache.put("c", json!(3));
        assert_eq!(cache.len(), 3);

        cache.put("d", json!(4));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("c"), Some(json!(3)));
        assert_eq!(cache.get("d"), Some(json!(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn oversize_put_keeps_live_entries() {
        let cache = store();
        for key in ["a", "b", "c", "d"] {
            cache.put(key, json!(key));
        }

        // Nothing expired, so nothing evicted
        assert_eq!(cache.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_and_invalidate() {
        let cache = store();
        cache.put("old", json!(1));
        tokio::time::advance(Duration::from_secs(301)).await;
        cache.put("new", json!(2));

        assert_eq!(cache.purge_expired(), 1);
        cache.invalidate("new");
        assert!(cache.is_empty());
    }
}
