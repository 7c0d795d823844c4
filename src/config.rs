//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::dispatch::PoolConfig;

/// Shortest per-job wait accepted from configuration.
pub const MIN_JOB_TIMEOUT: Duration = Duration::from_secs(1);

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of pool workers
    pub worker_count: usize,
    /// Maximum queued jobs before submitters block
    pub queue_capacity: usize,
    /// How long a request waits for its job result
    pub job_timeout: Duration,
    /// Maximum number of cached inputs
    pub cache_capacity: usize,
    /// TTL for cached inputs
    pub cache_ttl: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Directory holding originals, outputs and processing records
    pub storage_root: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `WORKER_COUNT` - Pool workers (default: 20)
    /// - `QUEUE_CAPACITY` - Job queue capacity (default: 1000)
    /// - `JOB_TIMEOUT_SECS` - Per-job wait in seconds, at least 1 (default: 120)
    /// - `CACHE_CAPACITY` - Cached inputs (default: 10)
    /// - `CACHE_TTL_SECS` - Input TTL in seconds (default: 1800)
    /// - `SERVER_PORT` - HTTP server port (default: 8081)
    /// - `STORAGE_ROOT` - Storage directory (default: ./storage)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            worker_count: env_or("WORKER_COUNT", defaults.worker_count).max(1),
            queue_capacity: env_or("QUEUE_CAPACITY", defaults.queue_capacity).max(1),
            job_timeout: Duration::from_secs(env_or(
                "JOB_TIMEOUT_SECS",
                defaults.job_timeout.as_secs(),
            ))
            .max(MIN_JOB_TIMEOUT),
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", defaults.cache_ttl.as_secs())),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            storage_root: env::var("STORAGE_ROOT")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_root),
        }
    }

    /// Pool settings derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            worker_count: self.worker_count.max(1),
            queue_capacity: self.queue_capacity.max(1),
            job_timeout: self.job_timeout.max(MIN_JOB_TIMEOUT),
            input_ttl: self.cache_ttl,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: 20,
            queue_capacity: 1000,
            job_timeout: Duration::from_secs(120),
            cache_capacity: 10,
            cache_ttl: Duration::from_secs(30 * 60),
            server_port: 8081,
            storage_root: PathBuf::from("./storage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.worker_count, 20);
        assert_eq!(config.queue_capacity, 1000);
        assert_eq!(config.job_timeout, Duration::from_secs(120));
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.server_port, 8081);
        assert_eq!(config.storage_root, PathBuf::from("./storage"));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        // Unique names so parallel tests never race on the same variable
        env::set_var("IMGPOOL_TEST_GARBAGE", "not-a-number");
        env::set_var("IMGPOOL_TEST_PADDED", " 42 ");
        env::remove_var("IMGPOOL_TEST_UNSET");

        assert_eq!(env_or("IMGPOOL_TEST_GARBAGE", 7usize), 7);
        assert_eq!(env_or("IMGPOOL_TEST_PADDED", 7usize), 42);
        assert_eq!(env_or("IMGPOOL_TEST_UNSET", 7u16), 7);
    }

    #[test]
    fn test_pool_config_clamps_zero_sizes() {
        let config = Config {
            worker_count: 0,
            queue_capacity: 0,
            ..Config::default()
        };

        let pool = config.pool_config();
        assert_eq!(pool.worker_count, 1);
        assert_eq!(pool.queue_capacity, 1);
        assert_eq!(pool.job_timeout, Duration::from_secs(120));
        assert_eq!(pool.input_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_zero_job_timeout_is_clamped() {
        let config = Config {
            job_timeout: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(config.pool_config().job_timeout, MIN_JOB_TIMEOUT);

        env::set_var("JOB_TIMEOUT_SECS", "0");
        let from_env = Config::from_env();
        env::remove_var("JOB_TIMEOUT_SECS");
        assert_eq!(from_env.job_timeout, MIN_JOB_TIMEOUT);
    }
}
