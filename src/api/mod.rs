//! API Module
//!
//! HTTP handlers and routing for the image job REST API.
//!
//! # Endpoints
//! - `GET /health` - Pool and cache summary
//! - `POST /process/:operation` - Run an operation and wait for its result
//! - `GET /workers/stats` - Worker pool statistics
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache` - Warm the cache
//! - `DELETE /cache` - Clear the cache

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
