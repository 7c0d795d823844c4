//! imgpool - Image job dispatch and caching service
//!
//! A bounded worker pool runs image operations against inputs held in an LRU
//! cache with per-entry TTL, and hands each result back to the waiting caller.

pub mod api;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod operations;
pub mod storage;

pub use api::AppState;
pub use config::Config;
pub use dispatch::{JobResult, PoolConfig, WorkerPool};
