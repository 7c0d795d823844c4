//! API Routes
//!
//! Configures the Axum router with all image job endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_stats_handler, clear_cache_handler, health_handler, process_handler,
    warm_cache_handler, worker_stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Pool and cache summary
/// - `POST /process/:operation` - Run an operation and wait for the result
/// - `GET /workers/stats` - Worker pool statistics
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache` - Warm the cache from storage
/// - `DELETE /cache` - Clear the cache
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/process/:operation", post(process_handler))
        .route("/workers/stats", get(worker_stats_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache", post(warm_cache_handler).delete(clear_cache_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ImageCache;
    use crate::dispatch::{PoolConfig, WorkerPool};
    use crate::operations::OperationRegistry;
    use crate::storage::MemoryStorage;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = Arc::new(ImageCache::new(4));
        let storage = Arc::new(MemoryStorage::new());
        let pool = Arc::new(WorkerPool::new(
            PoolConfig::default(),
            cache.clone(),
            storage.clone(),
            OperationRegistry::new(),
        ));
        create_router(AppState::new(pool, cache, storage))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoints() {
        for uri in ["/workers/stats", "/cache/stats"] {
            let response = create_test_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_clear_cache_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_process_requires_image_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/process/resize")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"width": 10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
