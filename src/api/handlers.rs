//! API Handlers
//!
//! HTTP request handlers for each image job endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, warn};

use crate::cache::{CacheStats, ImageCache};
use crate::config::Config;
use crate::dispatch::{JobResult, PoolStatsSnapshot, WorkerPool};
use crate::error::{ApiError, Result};
use crate::models::{
    CacheClearResponse, CacheWarmRequest, CacheWarmResponse, HealthResponse, ProcessRequest,
};
use crate::operations::OperationRegistry;
use crate::storage::Storage;

/// Application state shared across all handlers.
///
/// Built once at start-up and handed to the router; handlers never reach
/// for global state.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<WorkerPool>,
    pub cache: Arc<ImageCache>,
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    /// Creates a new AppState from already constructed parts.
    pub fn new(pool: Arc<WorkerPool>, cache: Arc<ImageCache>, storage: Arc<dyn Storage>) -> Self {
        Self {
            pool,
            cache,
            storage,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The pool is constructed but not started.
    pub fn from_config(
        config: &Config,
        storage: Arc<dyn Storage>,
        registry: OperationRegistry,
    ) -> Self {
        let cache = Arc::new(ImageCache::new(config.cache_capacity));
        let pool = Arc::new(WorkerPool::new(
            config.pool_config(),
            Arc::clone(&cache),
            Arc::clone(&storage),
            registry,
        ));
        Self::new(pool, cache, storage)
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        &state.pool.stats(),
        &state.cache.stats(),
    ))
}

/// Handler for POST /process/:operation
///
/// Waits for the job result. A job that ran and failed still answers 200
/// with `success: false`; only pool-level failures map to 503.
pub async fn process_handler(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    Json(req): Json<ProcessRequest>,
) -> Result<Json<JobResult>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let result = state
        .pool
        .submit_and_wait(req.image_id, operation, req.parameters)
        .await?;

    Ok(Json(result))
}

/// Handler for GET /workers/stats
pub async fn worker_stats_handler(State(state): State<AppState>) -> Json<PoolStatsSnapshot> {
    Json(state.pool.stats())
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Handler for POST /cache
///
/// Loads the requested originals into the cache with the input TTL.
pub async fn warm_cache_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheWarmRequest>,
) -> Result<Json<CacheWarmResponse>> {
    let keys = req.keys();
    if keys.is_empty() {
        return Err(ApiError::InvalidRequest(
            "image_id or image_ids is required".to_string(),
        ));
    }

    let ttl = state.pool.config().input_ttl;
    let mut cached = 0;
    let mut failed_ids = Vec::new();
    for key in &keys {
        match state.storage.fetch_bytes(key).await {
            Ok(bytes) => {
                state.cache.set(key.as_str(), &bytes, ttl);
                cached += 1;
            }
            Err(e) => {
                warn!(%key, error = %e, "failed to warm cache");
                failed_ids.push(key.clone());
            }
        }
    }
    info!(cached, requested = keys.len(), "cache warmed");

    Ok(Json(CacheWarmResponse {
        cached,
        requested: keys.len(),
        failed_ids,
        cache_size: state.cache.size(),
        cache_capacity: state.cache.capacity(),
    }))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<CacheClearResponse> {
    state.cache.clear();
    info!("cache cleared");
    Json(CacheClearResponse::new(state.cache.capacity()))
}
