//! Cache-aside counters.
//!
//! Every event is counted twice: in process-local atomics readable through
//! [`CacheStats::snapshot`], and through the `metrics` facade so an installed
//! recorder can export them.

use metrics::{counter, describe_counter};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Metric names for the cache-aside layer.
pub mod names {
    /// Reads answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "roster_cache_hits_total";
    /// Reads that fell through to the record store.
    pub const CACHE_MISSES_TOTAL: &str = "roster_cache_misses_total";
    /// Successful cache writes after a miss.
    pub const CACHE_POPULATES_TOTAL: &str = "roster_cache_populates_total";
    /// Populates skipped or undone because the store moved underneath them.
    pub const CACHE_SKIPPED_POPULATES_TOTAL: &str = "roster_cache_skipped_populates_total";
    /// Keys deleted after a mutation.
    pub const CACHE_INVALIDATIONS_TOTAL: &str = "roster_cache_invalidations_total";
    /// Cache operations that failed and were swallowed.
    pub const CACHE_ERRORS_TOTAL: &str = "roster_cache_errors_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Total number of cache hits");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Total number of cache misses");
    describe_counter!(
        names::CACHE_POPULATES_TOTAL,
        "Total number of cache entries written after a miss"
    );
    describe_counter!(
        names::CACHE_SKIPPED_POPULATES_TOTAL,
        "Total number of populates skipped because of a concurrent mutation"
    );
    describe_counter!(
        names::CACHE_INVALIDATIONS_TOTAL,
        "Total number of cache keys invalidated after a mutation"
    );
    describe_counter!(
        names::CACHE_ERRORS_TOTAL,
        "Total number of cache operations that failed"
    );
}

/// Live cache counters.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    populates: AtomicU64,
    skipped_populates: AtomicU64,
    invalidations: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub populates: u64,
    pub skipped_populates: u64,
    pub invalidations: u64,
    pub errors: u64,
}

impl CacheStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_HITS_TOTAL).increment(1);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_MISSES_TOTAL).increment(1);
    }

    pub fn record_populate(&self) {
        self.populates.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_POPULATES_TOTAL).increment(1);
    }

    pub fn record_skipped_populate(&self) {
        self.skipped_populates.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_SKIPPED_POPULATES_TOTAL).increment(1);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_INVALIDATIONS_TOTAL).increment(1);
    }

    /// Counts a failed cache operation, labelled by what was attempted.
    pub fn record_error(&self, operation: &'static str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_ERRORS_TOTAL, "operation" => operation).increment(1);
    }

    /// Reads all counters.
    #[must_use]
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            populates: self.populates.load(Ordering::Relaxed),
            skipped_populates: self.skipped_populates.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_populate();
        stats.record_skipped_populate();
        stats.record_invalidation();
        stats.record_error("get");

        assert_eq!(
            stats.snapshot(),
            CacheStatsSnapshot {
                hits: 2,
                misses: 1,
                populates: 1,
                skipped_populates: 1,
                invalidations: 1,
                errors: 1,
            }
        );
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let json = serde_json::to_value(CacheStatsSnapshot::default()).unwrap();
        assert_eq!(json["skippedPopulates"], 0);
    }
}
