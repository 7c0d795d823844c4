//! Cache Module
//!
//! Bounded in-memory byte cache with lazy TTL expiration and LRU eviction,
//! sitting in front of slow origin storage.

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruList;
pub use stats::{hit_rate, CacheCounters, CacheStats};
pub use store::{CacheStore, ImageCache};

use std::time::Duration;

// == Public Constants ==
/// TTL applied when a worker populates the cache after an origin fetch
pub const DEFAULT_INPUT_TTL: Duration = Duration::from_secs(30 * 60);
