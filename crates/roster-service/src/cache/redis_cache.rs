//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool, PoolConfig, Runtime};
use roster_config::RedisConfig;
use roster_core::{RosterError, RosterResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-based cache service.
///
/// TTLs are sent in milliseconds (`PSETEX`); anything shorter than one
/// millisecond is rounded up so the key still expires.
#[derive(Clone)]
pub struct RedisCacheService {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Build a pool for the configured host, port and database.
    ///
    /// Connections are opened lazily, so an unreachable server surfaces as
    /// per-operation cache errors rather than a startup failure.
    pub fn from_config(config: &RedisConfig) -> RosterResult<Self> {
        let url = config.url();
        let mut redis_cfg = deadpool_redis::Config::from_url(url.clone());
        redis_cfg.pool = Some(PoolConfig::new(config.pool_size.max(1)));

        let pool = redis_cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RosterError::cache(format!("Failed to create Redis pool: {}", e)))?;

        info!("Redis cache configured at {}", url);
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> RosterResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                RosterError::cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(RosterError::cache("Cache is disabled")),
        }
    }
}

/// Converts a TTL to whole milliseconds, never below one.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    fn backend_name(&self) -> &'static str {
        if self.is_enabled() {
            "redis"
        } else {
            "disabled"
        }
    }

    async fn get_raw(&self, key: &str) -> RosterResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            RosterError::cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> RosterResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_ms = ttl_millis(ttl);

        conn.pset_ex::<_, _, ()>(key, value, ttl_ms).await.map_err(|e| {
            RosterError::cache(format!("Failed to set key '{}': {}", key, e))
        })?;

        debug!("Cached key '{}' with TTL {}ms", key, ttl_ms);
        Ok(())
    }

    async fn delete(&self, key: &str) -> RosterResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            RosterError::cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_conversion_to_millis() {
        assert_eq!(ttl_millis(Duration::from_secs(300)), 300_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache() {
        let cache = RedisCacheService::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.backend_name(), "disabled");
        assert!(cache.get_raw("k").await.unwrap().is_none());
        cache.set_raw("k", "v", Duration::from_secs(1)).await.unwrap();
        assert!(!cache.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_pool_from_config_does_not_connect_eagerly() {
        let config = RedisConfig {
            host: "127.0.0.1".to_string(),
            port: 6399,
            db: 3,
            pool_size: 2,
        };
        let cache = RedisCacheService::from_config(&config).unwrap();
        assert!(cache.is_enabled());
        assert_eq!(cache.backend_name(), "redis");
    }
}
