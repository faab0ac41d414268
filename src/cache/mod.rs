//! Cache Module
//!
//! Provides the sharded in-memory cache with TTL expiration and
//! size-triggered background eviction.

mod entry;
mod hash;
mod shard;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::MAX_TTL;
pub use hash::{fnv1a_32, shard_index};
pub use stats::StatsSnapshot;
pub use store::Cache;

// Internal building blocks, only reachable through `Cache`
pub(crate) use entry::Entry;
pub(crate) use shard::Shard;
pub(crate) use stats::CacheStats;
pub(crate) use store::CacheInner;

// == Public Constants ==
/// Number of shards per cache. Must be a power of two.
pub const SHARD_COUNT: usize = 16;

/// Entries inspected per shard by one eviction sweep
pub const SWEEP_SAMPLE_SIZE: usize = 10;
