//! Cache Store Module
//!
//! Main cache engine combining a key index with the LRU list and lazy TTL
//! expiration, plus the thread-safe handle shared by the workers.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::{CacheCounters, CacheEntry, CacheStats, LruList};

// == Cache Store ==
/// Single-threaded LRU store with per-entry TTL.
///
/// The index maps each key to exactly one list handle and every list node is
/// referenced by exactly one index entry.
#[derive(Debug)]
pub struct CacheStore {
    /// Key -> handle into `lru`
    index: HashMap<String, usize>,
    /// Entries ordered by recency
    lru: LruList<CacheEntry>,
    /// Performance counters (survive `clear`)
    counters: CacheCounters,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            lru: LruList::new(),
            counters: CacheCounters::default(),
            capacity,
        }
    }

    // == Set ==
    /// Inserts or overwrites `key`, making it the most recently used entry.
    ///
    /// Overwriting replaces the bytes and restarts the TTL. When the insert
    /// pushes the store over capacity, the least recently used entry is evicted.
    /// Returns the evicted key, if any.
    pub fn set(&mut self, key: String, value: Vec<u8>, ttl: Duration) -> Option<String> {
        if let Some(&handle) = self.index.get(&key) {
            if let Some(entry) = self.lru.get_mut(handle) {
                entry.refresh(value, ttl);
            }
            self.lru.move_to_front(handle);
            return None;
        }

        let handle = self.lru.push_front(CacheEntry::new(key.clone(), value, ttl));
        self.index.insert(key, handle);

        if self.lru.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    // == Get ==
    /// Retrieves a copy of the bytes stored for `key`.
    ///
    /// Expired entries are removed here and counted as misses, not evictions.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let Some(&handle) = self.index.get(key) else {
            self.counters.record_miss();
            return None;
        };

        let expired = self.lru.get(handle).map_or(true, CacheEntry::is_expired);
        if expired {
            self.index.remove(key);
            self.lru.remove(handle);
            self.counters.record_miss();
            return None;
        }

        self.lru.move_to_front(handle);
        self.counters.record_hit();
        self.lru.get_mut(handle).map(|entry| {
            entry.access_count += 1;
            entry.value.clone()
        })
    }

    // == Contains ==
    /// Reports whether `key` currently has a live entry, without touching
    /// recency or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.index
            .get(key)
            .and_then(|&handle| self.lru.get(handle))
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Clear ==
    /// Empties the index and the recency list. Counters are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.lru.clear();
    }

    // == Stats ==
    /// Returns a snapshot of current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats::new(self.len(), self.capacity, &self.counters)
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Read count recorded for `key`, if present.
    pub fn access_count(&self, key: &str) -> Option<u64> {
        self.index
            .get(key)
            .and_then(|&handle| self.lru.get(handle))
            .map(|entry| entry.access_count)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let evicted = self.lru.pop_back()?;
        self.index.remove(&evicted.key);
        self.counters.record_eviction();
        Some(evicted.key)
    }
}

// == Image Cache ==
/// Thread-safe cache shared by every worker.
///
/// Mutating reads and writes go through the write lock so the index and the
/// recency list change together; `size`, `stats` and friends take the
/// shared read lock.
#[derive(Debug)]
pub struct ImageCache {
    inner: RwLock<CacheStore>,
    capacity: usize,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CacheStore::new(capacity)),
            capacity,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: &[u8], ttl: Duration) {
        let key = key.into();
        let evicted = self.inner.write().set(key.clone(), value.to_vec(), ttl);
        if let Some(evicted) = evicted {
            tracing::debug!(inserted = %key, evicted = %evicted, "cache eviction");
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.write().get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().contains(key)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn size(&self) -> usize {
        self.inner.read().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }

    pub fn keys_by_recency(&self) -> Vec<String> {
        self.inner.read().keys_by_recency()
    }
}
