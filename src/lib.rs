//! shardcache - An in-process sharded TTL cache
//!
//! Stores values in a fixed number of independently locked shards, expires
//! them lazily on read, and trims the cache with a bounded background sweep
//! once an approximate item count reaches the configured capacity.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, StatsSnapshot};
pub use config::Config;
pub use error::{CacheError, Result};
