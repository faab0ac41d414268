//! Background Tasks Module
//!
//! Contains work the cache runs off the caller's thread.
//!
//! # Tasks
//! - Eviction sweep: trims every shard once the approximate count reaches capacity

mod sweep;

pub(crate) use sweep::spawn_sweep;
