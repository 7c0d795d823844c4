//! Storage Module
//!
//! Origin for input bytes and sink for processing records.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Metadata written after a successful transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    pub original_key: String,
    pub operation: String,
    pub output_location: String,
    pub processing_time_ms: u64,
}

/// Slow origin storage consulted on cache misses.
///
/// Every error is treated as final for the job that triggered it.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Loads the original bytes stored under `key`.
    async fn fetch_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Persists `record` and returns its identifier.
    async fn record_processed(&self, record: ProcessingRecord) -> Result<String, StorageError>;
}

/// Rejects keys that could escape a storage directory.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key == "."
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_key() {
        assert!(check_key("img-123.png").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key("a/b").is_err());
        assert!(check_key("a\\b").is_err());
    }
}
