//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// The shard count is not part of the configuration; it is fixed at build
/// time by [`crate::cache::SHARD_COUNT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Approximate number of entries that triggers an eviction sweep
    pub capacity: usize,
    /// Lifetime in seconds applied to every stored entry
    pub ttl_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SCACHE_CAPACITY` - Approximate entry ceiling (default: 10000)
    /// - `SCACHE_TTL_SECS` - Entry lifetime in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("SCACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            ttl_secs: env::var("SCACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ttl_secs),
        }
    }

    /// Entry lifetime as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Rejects values that would make every entry dead on arrival or
    /// trigger a sweep on every insert.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.ttl_secs == 0 {
            return Err(CacheError::InvalidConfig(
                "ttl must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            ttl_secs: 300,
        }
    }
}
