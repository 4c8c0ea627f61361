//! In-process cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use parking_lot::RwLock;
use roster_core::RosterResult;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Shortest TTL accepted; matches the Redis backend's resolution.
const MIN_TTL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache service with per-entry expiry.
///
/// Expired entries are dropped lazily when read, or when room is needed
/// under a `max_entries` bound.
#[derive(Debug, Default)]
pub struct MemoryCacheService {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: Option<usize>,
}

impl MemoryCacheService {
    /// Creates an unbounded in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache holding at most `max_entries` keys.
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: Some(max_entries.max(1)),
        }
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    /// Returns true when no live entry is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes room for one new key under the configured bound.
    fn evict_for_insert(entries: &mut HashMap<String, CacheEntry>, max: usize, now: Instant) {
        if entries.len() < max {
            return;
        }

        entries.retain(|_, e| !e.is_expired(now));

        while entries.len() >= max {
            let soonest = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone());
            match soonest {
                Some(key) => {
                    debug!("Evicting key '{}' to stay within {} entries", key, max);
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheInterface for MemoryCacheService {
    fn is_enabled(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_raw(&self, key: &str) -> RosterResult<Option<String>> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    debug!("Cache hit for key '{}'", key);
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    debug!("Cache miss for key '{}'", key);
                    return Ok(None);
                }
            }
        }

        // Expired: drop it unless a concurrent writer already replaced it.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        debug!("Cache miss for key '{}' (expired)", key);
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> RosterResult<()> {
        let now = Instant::now();
        let ttl = ttl.max(MIN_TTL);
        let mut entries = self.entries.write();

        if let Some(max) = self.max_entries {
            if !entries.contains_key(key) {
                Self::evict_for_insert(&mut entries, max, now);
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );

        debug!("Cached key '{}' with TTL {}ms", key, ttl.as_millis());
        Ok(())
    }

    async fn delete(&self, key: &str) -> RosterResult<bool> {
        let deleted = self.entries.write().remove(key).is_some();
        debug!("Deleted key '{}': {}", key, deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheExt;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCacheService::new();
        cache.set_raw("k", "\"v\"", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get_raw("k").await.unwrap().as_deref(), Some("\"v\""));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let cache = MemoryCacheService::new();
        assert!(cache.get_raw("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_value_and_ttl() {
        let cache = MemoryCacheService::new();
        cache.set("k", &1u32, Duration::from_millis(10)).await.unwrap();
        cache.set("k", &2u32, Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get::<u32>("k").await.unwrap(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryCacheService::new();
        cache.set_raw("k", "1", Duration::from_secs(300)).await.unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get_raw("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get_raw("k").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemoryCacheService::new();
        cache.set_raw("k", "1", Duration::from_secs(60)).await.unwrap();

        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(cache.get_raw("k").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_cache_evicts_soonest_expiring() {
        let cache = MemoryCacheService::with_max_entries(2);
        cache.set_raw("short", "1", Duration::from_secs(10)).await.unwrap();
        cache.set_raw("long", "2", Duration::from_secs(100)).await.unwrap();
        cache.set_raw("new", "3", Duration::from_secs(50)).await.unwrap();

        assert!(cache.get_raw("short").await.unwrap().is_none());
        assert!(cache.get_raw("long").await.unwrap().is_some());
        assert!(cache.get_raw("new").await.unwrap().is_some());
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_cache_prefers_dropping_expired_entries() {
        let cache = MemoryCacheService::with_max_entries(2);
        cache.set_raw("a", "1", Duration::from_secs(5)).await.unwrap();
        cache.set_raw("b", "2", Duration::from_secs(100)).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        cache.set_raw("c", "3", Duration::from_secs(20)).await.unwrap();

        assert!(cache.get_raw("b").await.unwrap().is_some());
        assert!(cache.get_raw("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_bounded_cache_overwrite_does_not_evict() {
        let cache = MemoryCacheService::with_max_entries(2);
        cache.set_raw("a", "1", Duration::from_secs(60)).await.unwrap();
        cache.set_raw("b", "2", Duration::from_secs(60)).await.unwrap();
        cache.set_raw("a", "3", Duration::from_secs(60)).await.unwrap();

        assert_eq!(cache.get_raw("a").await.unwrap().as_deref(), Some("3"));
        assert_eq!(cache.get_raw("b").await.unwrap().as_deref(), Some("2"));
    }
}
