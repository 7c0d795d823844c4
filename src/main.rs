//! imgpool - Image job dispatch and caching service
//!
//! Serves the worker pool and cache over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgpool::api::{create_router, AppState};
use imgpool::operations::{DirectorySink, ImageCodec, OperationRegistry};
use imgpool::storage::FsStorage;
use imgpool::Config;

/// Main entry point for the image job service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open storage and register the built-in operations
/// 4. Build cache and worker pool, start the workers
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM stop serving, then drain and stop the pool
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgpool=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting image job service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: workers={}, queue_capacity={}, job_timeout={}s, cache_capacity={}, cache_ttl={}s, port={}, storage_root={}",
        config.worker_count,
        config.queue_capacity,
        config.job_timeout.as_secs(),
        config.cache_capacity,
        config.cache_ttl.as_secs(),
        config.server_port,
        config.storage_root.display()
    );

    let storage = FsStorage::open(&config.storage_root)
        .await
        .with_context(|| format!("failed to open storage at {}", config.storage_root.display()))?;
    let sink = DirectorySink::new(config.storage_root.join("processed"));
    let registry =
        OperationRegistry::with_builtins(Arc::new(ImageCodec), Arc::new(sink));
    info!("Registered operations: {}", registry.names().join(", "));

    let state = AppState::from_config(&config, Arc::new(storage), registry);
    state.pool.start();
    let pool = Arc::clone(&state.pool);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "server error");
    }

    pool.stop().await;
    info!("Server shutdown complete");

    served.context("server terminated abnormally")
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
