//! Worker Pool Module
//!
//! Bounded job queue served by a fixed set of worker tasks. Callers submit a
//! job and wait on a private one-shot channel for its result.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::job::{Job, JobResult};
use super::stats::PoolStatsSnapshot;
use super::worker::{self, WorkerContext};
use crate::cache::{ImageCache, DEFAULT_INPUT_TTL};
use crate::error::DispatchError;
use crate::operations::{OperationRegistry, Params};
use crate::storage::Storage;

// == Pool Config ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of long-lived worker tasks
    pub worker_count: usize,
    /// Maximum number of jobs waiting in the queue
    pub queue_capacity: usize,
    /// How long a caller waits for its result
    pub job_timeout: Duration,
    /// TTL for inputs cached after an origin fetch
    pub input_ttl: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: 20,
            queue_capacity: 1000,
            job_timeout: Duration::from_secs(120),
            input_ttl: DEFAULT_INPUT_TTL,
        }
    }
}

// == Pool State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    /// Constructed, workers not started
    Idle,
    Running,
    /// No new jobs accepted; workers draining the queue
    Stopping,
    Stopped,
}

// == Worker Pool ==
pub struct WorkerPool {
    config: PoolConfig,
    ctx: Arc<WorkerContext>,
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    receiver: Mutex<Option<mpsc::Receiver<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    state: Mutex<PoolState>,
    /// Cancelled when `stop` begins
    stopping: CancellationToken,
    /// Cancelled once every worker has exited
    stopped: CancellationToken,
}

impl WorkerPool {
    // == Constructor ==
    /// Creates a pool; no worker runs until [`start`](Self::start).
    ///
    /// Zero worker count or queue capacity is raised to one.
    pub fn new(
        mut config: PoolConfig,
        cache: Arc<ImageCache>,
        storage: Arc<dyn Storage>,
        registry: OperationRegistry,
    ) -> Self {
        config.worker_count = config.worker_count.max(1);
        config.queue_capacity = config.queue_capacity.max(1);

        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let ctx = Arc::new(WorkerContext {
            cache,
            storage,
            registry,
            counters: Default::default(),
            input_ttl: config.input_ttl,
        });

        Self {
            config,
            ctx,
            sender: Mutex::new(Some(tx)),
            receiver: Mutex::new(Some(rx)),
            workers: Mutex::new(Vec::new()),
            state: Mutex::new(PoolState::Idle),
            stopping: CancellationToken::new(),
            stopped: CancellationToken::new(),
        }
    }

    // == Start ==
    /// Spawns `worker_count` workers on the current tokio runtime.
    ///
    /// Only the first call has an effect.
    pub fn start(&self) {
        let Some(rx) = self.receiver.lock().take() else {
            warn!("worker pool already started or stopped, ignoring start");
            return;
        };
        let queue = Arc::new(tokio::sync::Mutex::new(rx));

        let mut workers = self.workers.lock();
        for worker_id in 0..self.config.worker_count {
            workers.push(tokio::spawn(worker::run(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&self.ctx),
            )));
        }
        *self.state.lock() = PoolState::Running;

        info!(
            "Worker pool started with {} workers, queue capacity: {}",
            self.config.worker_count, self.config.queue_capacity
        );
    }

    // == Submit And Wait ==
    /// Queues a job and waits for its result.
    ///
    /// Fails with `NotRunning` before [`start`](Self::start) and with
    /// `ShuttingDown` once [`stop`](Self::stop) has begun.
    ///
    /// Waits for a queue slot while the queue is full, unless the pool is
    /// stopping. Once queued, returns whichever comes first: the result, the
    /// per-job timeout, or the end of shutdown. A timed-out job still runs;
    /// its result is discarded.
    pub async fn submit_and_wait(
        &self,
        target_key: impl Into<String>,
        operation: impl Into<String>,
        parameters: Params,
    ) -> Result<JobResult, DispatchError> {
        if self.stopping.is_cancelled() {
            return Err(DispatchError::ShuttingDown);
        }
        // Jobs queued before `start` would have no worker to answer them.
        if self.state() != PoolState::Running {
            return Err(DispatchError::NotRunning);
        }
        let sender = self
            .sender
            .lock()
            .clone()
            .ok_or(DispatchError::ShuttingDown)?;

        let (reply, result_rx) = oneshot::channel();
        let job = Job {
            target_key: target_key.into(),
            operation: operation.into(),
            parameters,
            reply,
        };
        let key = job.target_key.clone();
        let op = job.operation.clone();

        let permit = tokio::select! {
            biased;
            _ = self.stopping.cancelled() => return Err(DispatchError::ShuttingDown),
            permit = sender.reserve() => permit.map_err(|_| DispatchError::ShuttingDown)?,
        };
        self.ctx.counters.record_enqueued();
        permit.send(job);
        drop(sender);

        debug!(
            operation = %op,
            key = %key,
            queue_size = self.queue_size(),
            queue_capacity = self.queue_capacity(),
            "job queued"
        );

        let timeout = self.config.job_timeout;
        // A delivered result wins over a simultaneous timeout or shutdown.
        tokio::select! {
            biased;
            result = result_rx => result.map_err(|_| DispatchError::ShutdownWhileWaiting),
            _ = tokio::time::sleep(timeout) => {
                debug!(operation = %op, key = %key, "caller timed out waiting for result");
                Err(DispatchError::Timeout(timeout))
            }
            _ = self.stopped.cancelled() => Err(DispatchError::ShutdownWhileWaiting),
        }
    }

    /// Fire-and-forget submission. Removed; always fails.
    #[deprecated(note = "use submit_and_wait")]
    pub fn submit(
        &self,
        _target_key: &str,
        _operation: &str,
        _parameters: Params,
    ) -> Result<(), DispatchError> {
        Err(DispatchError::SubmitUnsupported)
    }

    // == Stop ==
    /// Stops accepting jobs, lets the workers drain the queue, and waits
    /// for them to exit. Concurrent callers all return once the pool is
    /// stopped.
    pub async fn stop(&self) {
        let previous = {
            let mut state = self.state.lock();
            let previous = *state;
            if matches!(previous, PoolState::Idle | PoolState::Running) {
                *state = PoolState::Stopping;
            }
            previous
        };
        match previous {
            PoolState::Stopped => return,
            PoolState::Stopping => {
                self.stopped.cancelled().await;
                return;
            }
            PoolState::Idle | PoolState::Running => {}
        }
        info!("Worker pool stopping, draining queue");

        self.stopping.cancel();
        // The queue closes once in-flight submitters drop their sender clones.
        self.sender.lock().take();
        self.receiver.lock().take();

        let workers: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task ended abnormally");
            }
        }

        *self.state.lock() = PoolState::Stopped;
        self.stopped.cancel();
        info!("Worker pool stopped");
    }

    // == Statistics ==
    pub fn state(&self) -> PoolState {
        *self.state.lock()
    }

    pub fn queue_size(&self) -> usize {
        self.ctx.counters.depth()
    }

    pub fn queue_capacity(&self) -> usize {
        self.config.queue_capacity
    }

    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    pub fn queued_jobs(&self) -> u64 {
        self.ctx.counters.queued()
    }

    pub fn completed_jobs(&self) -> u64 {
        self.ctx.counters.completed()
    }

    pub fn failed_jobs(&self) -> u64 {
        self.ctx.counters.failed()
    }

    pub fn active_jobs(&self) -> usize {
        self.ctx.counters.active()
    }

    pub fn stats(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot::new(
            &self.ctx.counters,
            self.config.queue_capacity,
            self.config.worker_count,
        )
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Cache the workers read inputs through.
    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.ctx.cache
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("queue_size", &self.queue_size())
            .finish()
    }
}
