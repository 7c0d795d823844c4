//! Pool Statistics Module
//!
//! Lock-free job counters read by health and stats reporting.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

// == Pool Counters ==
#[derive(Debug, Default)]
pub struct PoolCounters {
    /// Jobs accepted into the queue since start
    queued: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    /// Jobs currently being processed by a worker
    active: AtomicUsize,
    /// Jobs sitting in the queue
    depth: AtomicUsize,
}

impl PoolCounters {
    pub fn record_enqueued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        self.depth.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_dequeued(&self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks the end of one job's processing.
    pub fn record_finished(&self, success: bool) {
        if success {
            self.completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

// == Snapshot ==
/// Serializable view for the stats endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStatsSnapshot {
    pub queue_size: usize,
    pub queue_capacity: usize,
    pub queue_usage_pct: f64,
    pub queued_jobs: u64,
    pub active_jobs: usize,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub total_workers: usize,
}

impl PoolStatsSnapshot {
    pub fn new(counters: &PoolCounters, queue_capacity: usize, total_workers: usize) -> Self {
        let queue_size = counters.depth();
        let queue_usage_pct = if queue_capacity == 0 {
            0.0
        } else {
            queue_size as f64 / queue_capacity as f64 * 100.0
        };
        Self {
            queue_size,
            queue_capacity,
            queue_usage_pct,
            queued_jobs: counters.queued(),
            active_jobs: counters.active(),
            completed_jobs: counters.completed(),
            failed_jobs: counters.failed(),
            total_workers,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_lifecycle() {
        let counters = PoolCounters::default();

        counters.record_enqueued();
        counters.record_enqueued();
        assert_eq!(counters.depth(), 2);

        counters.record_dequeued();
        assert_eq!(counters.depth(), 1);
        assert_eq!(counters.active(), 1);

        counters.record_finished(true);
        counters.record_dequeued();
        counters.record_finished(false);

        assert_eq!(counters.queued(), 2);
        assert_eq!(counters.completed(), 1);
        assert_eq!(counters.failed(), 1);
        assert_eq!(counters.active(), 0);
        assert_eq!(counters.depth(), 0);
    }

    #[test]
    fn test_snapshot_usage_pct() {
        let counters = PoolCounters::default();
        for _ in 0..25 {
            counters.record_enqueued();
        }

        let snapshot = PoolStatsSnapshot::new(&counters, 100, 4);
        assert_eq!(snapshot.queue_size, 25);
        assert_eq!(snapshot.queue_usage_pct, 25.0);
        assert_eq!(snapshot.total_workers, 4);
    }
}
