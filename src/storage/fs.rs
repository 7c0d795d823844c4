//! Filesystem-backed storage.
//!
//! Originals live under `<root>/originals/<key>`; processing records are
//! appended as JSON lines to `<root>/records.jsonl`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{check_key, ProcessingRecord, Storage};
use crate::error::StorageError;

const ORIGINALS_DIR: &str = "originals";
const RECORDS_FILE: &str = "records.jsonl";

/// One line of the records log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordLine {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ProcessingRecord,
}

#[derive(Debug)]
pub struct FsStorage {
    root: PathBuf,
    // Serializes appends so concurrent lines never interleave
    log_lock: Mutex<()>,
}

impl FsStorage {
    /// Opens storage rooted at `root`, creating the originals directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(ORIGINALS_DIR)).await?;
        Ok(Self {
            root,
            log_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn original_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.root.join(ORIGINALS_DIR).join(key))
    }

    /// Reads back every record written so far.
    pub async fn read_records(&self) -> Result<Vec<RecordLine>, StorageError> {
        let raw = match tokio::fs::read_to_string(self.root.join(RECORDS_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(StorageError::from))
            .collect()
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn fetch_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.original_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn record_processed(&self, record: ProcessingRecord) -> Result<String, StorageError> {
        let line = RecordLine {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            record,
        };
        let mut encoded = serde_json::to_vec(&line)?;
        encoded.push(b'\n');

        let _guard = self.log_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(RECORDS_FILE))
            .await?;
        file.write_all(&encoded).await?;
        file.flush().await?;

        Ok(line.id)
    }
}
