//! Cache Store Module
//!
//! Main cache engine: a fixed array of shards, an approximate item count
//! and the trigger for the background eviction sweep.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::cache::{
    shard_index, CacheStats, Entry, Shard, StatsSnapshot, MAX_TTL, SHARD_COUNT,
};
use crate::config::Config;
use crate::tasks::spawn_sweep;

// == Shared State ==
/// State shared between cache handles and the sweep task.
pub(crate) struct CacheInner<V> {
    pub(crate) shards: Box<[Shard<V>]>,
    /// Best-effort tally of stored entries. May drift or dip below zero
    /// under races; it only decides when to sweep.
    pub(crate) count: AtomicI64,
    /// Set while a sweep is running.
    pub(crate) sweeping: AtomicBool,
    pub(crate) stats: CacheStats,
    capacity: usize,
    threshold: i64,
    ttl: Duration,
}

// == Cache ==
/// A sharded TTL cache with an approximate capacity ceiling.
///
/// Cloning a `Cache` yields another handle to the same storage.
///
/// # Example
/// ```
/// use shardcache::Cache;
/// use std::time::Duration;
///
/// let cache = Cache::new(1000, Duration::from_secs(60));
/// cache.set("user:1", "Alice".to_string());
/// assert_eq!(cache.get("user:1"), Some("Alice".to_string()));
///
/// let loaded: Result<_, std::io::Error> =
///     cache.fetch("user:2", |key| Ok(Some(format!("loaded {}", key))));
/// assert_eq!(loaded.unwrap(), Some("loaded user:2".to_string()));
/// ```
pub struct Cache<V> {
    pub(crate) inner: Arc<CacheInner<V>>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache that starts evicting once roughly `capacity` entries
    /// are stored, and serves every entry for `ttl`.
    ///
    /// A `ttl` longer than [`MAX_TTL`] is clamped to it.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let shards = (0..SHARD_COUNT).map(|_| Shard::new()).collect();
        Self {
            inner: Arc::new(CacheInner {
                shards,
                count: AtomicI64::new(0),
                sweeping: AtomicBool::new(false),
                stats: CacheStats::new(),
                capacity,
                threshold: i64::try_from(capacity).unwrap_or(i64::MAX),
                ttl: ttl.min(MAX_TTL),
            }),
        }
    }

    /// Creates a cache from validated configuration.
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self::new(config.capacity, config.ttl()))
    }

    fn shard(&self, key: &str) -> &Shard<V> {
        &self.inner.shards[shard_index(key, SHARD_COUNT)]
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// An expired entry found here is removed on the spot, unless another
    /// caller has already replaced it.
    pub fn get(&self, key: &str) -> Option<V> {
        let shard = self.shard(key);
        let value = match shard.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value().clone()),
            Some(stale) => {
                if shard.remove_if_same(key, &stale) {
                    self.inner.count.fetch_sub(1, Ordering::Relaxed);
                    self.inner.stats.record_expiration();
                    trace!(key, "Dropped expired entry on read");
                }
                None
            }
            None => None,
        };

        if value.is_some() {
            self.inner.stats.record_hit();
        } else {
            self.inner.stats.record_miss();
        }
        value
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Inserting a new key may launch an eviction sweep in the background;
    /// this call never waits for it.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let entry = Arc::new(Entry::new(value, self.inner.ttl));
        if !self.shard(&key).set(key, entry) {
            return;
        }

        let count = self.inner.count.fetch_add(1, Ordering::Relaxed) + 1;
        if count >= self.inner.threshold
            && self
                .inner
                .sweeping
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            spawn_sweep(Arc::clone(&self.inner));
        }
    }

    // == Fetch ==
    /// Returns the cached value for `key`, calling `loader` on a miss.
    ///
    /// - `Ok(Some(v))` from the loader is cached and returned.
    /// - `Ok(None)` is returned as-is and nothing is cached.
    /// - `Err(e)` is returned unchanged and nothing is cached.
    ///
    /// Concurrent misses on the same key each call their own loader.
    pub fn fetch<F, E>(&self, key: &str, loader: F) -> Result<Option<V>, E>
    where
        F: FnOnce(&str) -> Result<Option<V>, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(Some(value));
        }

        self.inner.stats.record_load();
        let loaded = loader(key);
        self.store_loaded(key, loaded)
    }

    /// Async form of [`Cache::fetch`].
    ///
    /// No lock is held while the loader's future runs.
    pub async fn fetch_async<F, Fut, E>(&self, key: &str, loader: F) -> Result<Option<V>, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(Some(value));
        }

        self.inner.stats.record_load();
        let loaded = loader(key.to_string()).await;
        self.store_loaded(key, loaded)
    }

    fn store_loaded<E>(&self, key: &str, loaded: Result<Option<V>, E>) -> Result<Option<V>, E> {
        match loaded {
            Ok(Some(value)) => {
                self.set(key, value.clone());
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                self.inner.stats.record_load_failure();
                Err(err)
            }
        }
    }

    // == Remove ==
    /// Deletes `key`, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        let removed = self.shard(key).remove(key);
        if removed {
            self.inner.count.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    // == Clear ==
    /// Empties every shard and resets the approximate count.
    pub fn clear(&self) {
        for shard in self.inner.shards.iter() {
            shard.clear();
        }
        self.inner.count.store(0, Ordering::Relaxed);
    }

    // == Length ==
    /// Approximate number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        usize::try_from(self.inner.count.load(Ordering::Relaxed)).unwrap_or(0)
    }

    // == Is Empty ==
    /// Returns true if the approximate count is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Capacity ==
    /// Approximate entry count at which a sweep is launched.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    // == TTL ==
    /// Lifetime given to every stored entry, after clamping.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    // == Is Sweeping ==
    /// Whether an eviction sweep is currently running.
    pub fn is_sweeping(&self) -> bool {
        self.inner.sweeping.load(Ordering::Acquire)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot(self.len())
    }
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.inner.capacity)
            .field("ttl", &self.inner.ttl)
            .field("approx_count", &self.inner.count.load(Ordering::Relaxed))
            .field("sweeping", &self.inner.sweeping.load(Ordering::Relaxed))
            .finish()
    }
}
