//! Worker loop: resolve input, run the operation, record, reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use super::job::{millis, Job, JobResult};
use super::stats::PoolCounters;
use crate::cache::ImageCache;
use crate::error::{OperationError, StorageError};
use crate::operations::{invoke, OperationRegistry, Params};
use crate::storage::{ProcessingRecord, Storage};

/// Shared receiving end of the job queue.
pub(crate) type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Everything a worker needs, shared by all workers.
pub(crate) struct WorkerContext {
    pub cache: Arc<ImageCache>,
    pub storage: Arc<dyn Storage>,
    pub registry: OperationRegistry,
    pub counters: PoolCounters,
    pub input_ttl: Duration,
}

/// Runs one worker until the queue is closed and drained.
pub(crate) async fn run(worker_id: usize, queue: JobQueue, ctx: Arc<WorkerContext>) {
    debug!(worker_id, "worker started");

    loop {
        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(job) = next else { break };
        ctx.counters.record_dequeued();

        let Job {
            target_key,
            operation,
            parameters,
            reply,
        } = job;
        debug!(worker_id, %operation, key = %target_key, "processing job");

        let result = ctx.process(&target_key, &operation, parameters).await;
        ctx.counters.record_finished(result.success);
        debug!(
            worker_id,
            %operation,
            key = %target_key,
            success = result.success,
            elapsed_ms = result.processing_time_ms,
            cache_hit = result.cache_hit,
            "job finished"
        );

        deliver(worker_id, reply, result);
    }

    debug!(worker_id, "worker stopped");
}

/// Hands the result to the caller without waiting; an abandoned caller
/// means the result is dropped.
fn deliver(worker_id: usize, reply: oneshot::Sender<JobResult>, result: JobResult) {
    if reply.send(result).is_err() {
        info!(worker_id, "caller no longer waiting, result discarded");
    }
}

impl WorkerContext {
    async fn process(&self, key: &str, operation: &str, parameters: Params) -> JobResult {
        let started = Instant::now();

        let (input, cache_hit) = match self.resolve_input(key).await {
            Ok(resolved) => resolved,
            Err(e) => return JobResult::failed(e.to_string(), started.elapsed(), false),
        };

        let Some(op) = self.registry.get(operation) else {
            return JobResult::failed(
                format!("unknown operation: {operation}"),
                started.elapsed(),
                cache_hit,
            );
        };

        let owned_key = key.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            invoke(&*op, &owned_key, &input, &parameters)
        })
        .await;

        let output_location = match outcome {
            Ok(Ok(location)) => location,
            Ok(Err(e)) => return JobResult::failed(e.to_string(), started.elapsed(), cache_hit),
            Err(join_err) => {
                let err = OperationError::Panicked(panic_message(join_err));
                return JobResult::failed(err.to_string(), started.elapsed(), cache_hit);
            }
        };

        let record = ProcessingRecord {
            original_key: key.to_string(),
            operation: operation.to_string(),
            output_location,
            processing_time_ms: millis(started.elapsed()),
        };
        // Record keeping is best-effort; the transform itself succeeded.
        let processed_id = match self.storage.record_processed(record).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(%operation, %key, error = %e, "failed to save processing record");
                None
            }
        };

        JobResult::succeeded(processed_id, started.elapsed(), cache_hit)
    }

    /// Returns the input bytes and whether they came from the cache.
    async fn resolve_input(&self, key: &str) -> Result<(Vec<u8>, bool), StorageError> {
        if let Some(bytes) = self.cache.get(key) {
            debug!(%key, "cache hit");
            return Ok((bytes, true));
        }

        debug!(%key, "cache miss, loading from storage");
        let bytes = self.storage.fetch_bytes(key).await?;
        self.cache.set(key, &bytes, self.input_ttl);
        debug!(%key, bytes = bytes.len(), "cached input");

        Ok((bytes, false))
    }
}

fn panic_message(err: tokio::task::JoinError) -> String {
    if err.is_cancelled() {
        return "task cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
