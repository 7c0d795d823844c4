//! Jobs handed to the workers and the results they send back.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::operations::Params;

/// One queued unit of work. Lives for a single dispatch cycle and is never
/// requeued.
#[derive(Debug)]
pub struct Job {
    pub target_key: String,
    pub operation: String,
    pub parameters: Params,
    /// Single-use handoff back to the submitting call
    pub(crate) reply: oneshot::Sender<JobResult>,
}

/// Outcome delivered to the submitter of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,
    /// Record identifier; only set on success when the record was persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub processing_time_ms: u64,
    pub cache_hit: bool,
    /// Unix seconds
    pub completed_at: i64,
}

impl JobResult {
    pub fn succeeded(processed_id: Option<String>, elapsed: Duration, cache_hit: bool) -> Self {
        Self {
            success: true,
            processed_id,
            message: "Processing completed".to_string(),
            processing_time_ms: millis(elapsed),
            cache_hit,
            completed_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn failed(message: impl Into<String>, elapsed: Duration, cache_hit: bool) -> Self {
        Self {
            success: false,
            processed_id: None,
            message: message.into(),
            processing_time_ms: millis(elapsed),
            cache_hit,
            completed_at: chrono::Utc::now().timestamp(),
        }
    }
}

pub(crate) fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
