//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Lock-free counters updated on the hot path.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
    sweeps: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Counts a read that returned a live value.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Counts a read that found nothing or an expired entry.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Expiration ==
    /// Counts an expired entry dropped on read.
    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Sweep ==
    /// Counts a finished sweep and the entries it removed.
    pub fn record_sweep(&self, removed: u64) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.evictions.fetch_add(removed, Ordering::Relaxed);
    }

    // == Record Load ==
    /// Counts a miss loader invocation.
    pub fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Load Failure ==
    /// Counts a miss loader invocation that returned an error.
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter into a plain, serializable value.
    ///
    /// Counters are read one at a time, so a snapshot taken under load is
    /// not a consistent cut.
    pub fn snapshot(&self, approx_count: usize) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        StatsSnapshot {
            hits,
            misses,
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            approx_count,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Expired entries removed when read
    pub expirations: u64,
    /// Entries removed by eviction sweeps
    pub evictions: u64,
    /// Completed eviction sweeps
    pub sweeps: u64,
    /// Miss loader invocations
    pub loads: u64,
    /// Miss loader invocations that returned an error
    pub load_failures: u64,
    /// Approximate number of stored entries
    pub approx_count: usize,
    /// hits / (hits + misses), 0.0 before any read
    pub hit_rate: f64,
}
