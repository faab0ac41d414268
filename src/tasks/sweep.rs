//! Eviction Sweep Task
//!
//! Background pass that removes one soon-to-expire entry from every shard
//! once the cache has grown past its capacity.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::cache::{CacheInner, SWEEP_SAMPLE_SIZE};

/// Clears the in-flight flag when dropped, whether the sweep finished,
/// panicked, or was never started.
struct SweepGuard<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V> SweepGuard<V> {
    fn run(self) -> usize {
        run_sweep(&self.inner)
    }
}

impl<V> Drop for SweepGuard<V> {
    fn drop(&mut self) {
        self.inner.sweeping.store(false, Ordering::Release);
    }
}

/// Launches a sweep without waiting for it.
///
/// The caller must already have set `inner.sweeping`. Inside a Tokio runtime
/// the sweep runs on the blocking pool; elsewhere it gets its own thread.
pub(crate) fn spawn_sweep<V>(inner: Arc<CacheInner<V>>)
where
    V: Send + Sync + 'static,
{
    debug!(
        approx_count = inner.count.load(Ordering::Relaxed),
        "Launching eviction sweep"
    );
    let guard = SweepGuard { inner };

    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(move || guard.run());
        }
        Err(_) => {
            let spawned = thread::Builder::new()
                .name("shardcache-sweep".to_string())
                .spawn(move || guard.run());
            // On failure the closure, and with it the guard, is already dropped
            if let Err(err) = spawned {
                warn!("Failed to spawn eviction sweep thread: {}", err);
            }
        }
    }
}

/// Visits every shard once, removing at most one entry from each.
///
/// Returns the number of shards that yielded a removal.
pub(crate) fn run_sweep<V>(inner: &CacheInner<V>) -> usize {
    let started = Instant::now();
    let mut removed = 0;
    for shard in inner.shards.iter() {
        if shard.sweep_one(Instant::now(), SWEEP_SAMPLE_SIZE) {
            removed += 1;
        }
    }

    inner.count.fetch_sub(removed as i64, Ordering::Relaxed);
    inner.stats.record_sweep(removed as u64);
    debug!(
        removed,
        elapsed_us = started.elapsed().as_micros() as u64,
        "Eviction sweep finished"
    );
    removed
}
