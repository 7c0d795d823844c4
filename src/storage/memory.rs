//! In-memory storage for tests and embedding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{ProcessingRecord, Storage};
use crate::error::StorageError;

/// Originals and records kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    originals: RwLock<HashMap<String, Vec<u8>>>,
    records: RwLock<Vec<(String, ProcessingRecord)>>,
    fetches: AtomicU64,
    fail_records: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an original under `key`, replacing any previous bytes.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.originals.write().insert(key.into(), bytes.into());
    }

    /// Number of `fetch_bytes` calls so far, successful or not.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Recorded `(id, record)` pairs in insertion order.
    pub fn records(&self) -> Vec<(String, ProcessingRecord)> {
        self.records.read().clone()
    }

    /// Makes every subsequent `record_processed` call fail.
    pub fn fail_records(&self, fail: bool) {
        self.fail_records.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn fetch_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.originals
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn record_processed(&self, record: ProcessingRecord) -> Result<String, StorageError> {
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("record store unavailable")));
        }
        let id = Uuid::new_v4().to_string();
        self.records.write().push((id.clone(), record));
        Ok(id)
    }
}
