//! Cache Entry Module
//!
//! Defines a single cached payload with its expiration deadline.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry holding the bytes for one key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key this payload belongs to
    pub key: String,
    /// Cached bytes, owned by the cache
    pub value: Vec<u8>,
    /// Instant after which the entry is treated as absent
    pub expires_at: Instant,
    /// Number of successful reads (informational only)
    pub access_count: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl` from now.
    pub fn new(key: String, value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: deadline_from_now(ttl),
            access_count: 0,
        }
    }

    // == Refresh ==
    /// Replaces the payload and restarts the TTL.
    pub fn refresh(&mut self, value: Vec<u8>, ttl: Duration) {
        self.value = value;
        self.expires_at = deadline_from_now(ttl);
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once the current instant is strictly past
    /// its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

// Huge TTLs saturate instead of overflowing the clock.
fn deadline_from_now(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl)
        .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365 * 100))
}
