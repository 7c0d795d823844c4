//! Response DTOs for the image job API
//!
//! Defines the structure of outgoing HTTP response bodies. Job results and
//! pool/cache statistics serialize directly from their own types.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::dispatch::PoolStatsSnapshot;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub queue_size: usize,
    pub queue_capacity: usize,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub total_workers: usize,
    pub cache_size: usize,
    pub cache_capacity: usize,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(pool: &PoolStatsSnapshot, cache: &CacheStats) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            queue_size: pool.queue_size,
            queue_capacity: pool.queue_capacity,
            completed_jobs: pool.completed_jobs,
            failed_jobs: pool.failed_jobs,
            total_workers: pool.total_workers,
            cache_size: cache.size,
            cache_capacity: cache.capacity,
        }
    }
}

/// Response body for cache warming (POST /cache)
#[derive(Debug, Clone, Serialize)]
pub struct CacheWarmResponse {
    /// Number of keys now cached
    pub cached: usize,
    pub requested: usize,
    /// Keys that could not be loaded from storage
    pub failed_ids: Vec<String>,
    pub cache_size: usize,
    pub cache_capacity: usize,
}

/// Response body for cache clearing (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearResponse {
    pub message: String,
    pub cache_capacity: usize,
}

impl CacheClearResponse {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            message: "Cache cleared".to_string(),
            cache_capacity,
        }
    }
}
