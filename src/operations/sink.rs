//! Destinations for processed output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::OperationError;

/// Persists rendered bytes and returns where they landed.
pub trait OutputSink: Send + Sync + 'static {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<String, OperationError>;
}

/// Writes outputs as files under one directory, creating it on demand.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirectorySink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<String, OperationError> {
        fs::create_dir_all(&self.root).map_err(|e| OperationError::Save(e.to_string()))?;

        let path = self.root.join(file_name);
        fs::write(&path, bytes).map_err(|e| OperationError::Save(e.to_string()))?;

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_sink_creates_root_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("processed"));

        let location = sink.write("a_thumb_10.jpg", b"data").unwrap();

        assert!(location.ends_with("a_thumb_10.jpg"));
        assert_eq!(fs::read(&location).unwrap(), b"data");
    }

    #[test]
    fn test_directory_sink_reports_save_errors() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be
        let blocker = dir.path().join("processed");
        fs::write(&blocker, b"").unwrap();

        let sink = DirectorySink::new(&blocker);
        let err = sink.write("x.jpg", b"data").unwrap_err();

        assert!(matches!(err, OperationError::Save(_)));
    }
}
