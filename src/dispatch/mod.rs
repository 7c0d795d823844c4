//! Dispatch Module
//!
//! Bounded worker pool that runs registered operations against cached
//! inputs and hands results back to waiting callers.

mod job;
mod pool;
mod stats;
mod worker;

pub use job::{Job, JobResult};
pub use pool::{PoolConfig, PoolState, WorkerPool};
pub use stats::{PoolCounters, PoolStatsSnapshot};
