//! Caching infrastructure for the service layer.
//!
//! [`CacheInterface`] is the only contract the coordinator relies on. Two
//! backends implement it: an in-process map and Redis.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;
pub mod stats;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::MemoryCacheService;
pub use redis_cache::RedisCacheService;
pub use stats::{register_metrics, CacheStats, CacheStatsSnapshot};

use std::time::Duration;

/// Default TTL for cached items (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
