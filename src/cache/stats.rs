//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Counters ==
/// Running counters owned by the cache store.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries evicted due to the LRU policy
    pub evictions: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Point-in-time snapshot returned by `stats()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    /// Percentage in `[0, 100]`
    pub hit_rate: f64,
    pub eviction_count: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a snapshot from the current counters.
    pub fn new(size: usize, capacity: usize, counters: &CacheCounters) -> Self {
        Self {
            size,
            capacity,
            hit_count: counters.hits,
            miss_count: counters.misses,
            hit_rate: hit_rate(counters.hits, counters.misses),
            eviction_count: counters.evictions,
        }
    }
}

// == Hit Rate ==
/// Returns hits / (hits + misses) as a percentage, or 0.0 with no accesses.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}
