//! Shard Module
//!
//! One independently locked partition of the key space.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::cache::Entry;

// == Shard ==
/// A lock-protected map from key to entry.
///
/// Readers share the lock; every insert, delete or replacement takes it
/// exclusively. Each method is atomic with respect to the others on the
/// same shard.
#[derive(Debug)]
pub struct Shard<V> {
    entries: RwLock<HashMap<String, Arc<Entry<V>>>>,
}

impl<V> Shard<V> {
    // == Constructor ==
    /// Creates an empty shard.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Entry<V>>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Entry<V>>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Returns the stored entry, expired or not.
    pub fn get(&self, key: &str) -> Option<Arc<Entry<V>>> {
        self.read().get(key).cloned()
    }

    // == Set ==
    /// Inserts or replaces an entry.
    ///
    /// Returns `true` iff the key was not present before.
    pub fn set(&self, key: String, entry: Arc<Entry<V>>) -> bool {
        self.write().insert(key, entry).is_none()
    }

    // == Remove ==
    /// Deletes a key, returning whether it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    // == Remove Stale ==
    /// Deletes `key` only while it still maps to `stale`.
    ///
    /// A replacement stored after `stale` was read is left in place.
    pub fn remove_if_same(&self, key: &str, stale: &Arc<Entry<V>>) -> bool {
        let mut entries = self.write();
        match entries.get(key) {
            Some(current) if Arc::ptr_eq(current, stale) => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    // == Clear ==
    /// Swaps in a fresh empty map, releasing the old map's allocation.
    pub fn clear(&self) {
        *self.write() = HashMap::new();
    }

    // == Length ==
    /// Number of entries currently held, including expired ones.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    // == Is Empty ==
    /// Returns true if the shard holds no entries.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // == Sweep One ==
    /// Removes the soonest-to-expire entry among a bounded sample.
    ///
    /// At most `sample_limit` entries are inspected in whatever order the
    /// map yields them. Sampling stops at the first entry already expired
    /// at `now`. The chosen key is deleted under a separate write lock; if
    /// it vanished in between the call still reports a removal.
    pub fn sweep_one(&self, now: Instant, sample_limit: usize) -> bool {
        let candidate = {
            let entries = self.read();
            let mut oldest: Option<(&String, Instant)> = None;
            for (key, entry) in entries.iter().take(sample_limit) {
                let expires_at = entry.expires_at();
                if oldest.map_or(true, |(_, earliest)| expires_at < earliest) {
                    oldest = Some((key, expires_at));
                    if expires_at <= now {
                        break;
                    }
                }
            }
            oldest.map(|(key, _)| key.clone())
        };

        match candidate {
            Some(key) => {
                self.write().remove(&key);
                true
            }
            None => false,
        }
    }
}

impl<V> Default for Shard<V> {
    fn default() -> Self {
        Self::new()
    }
}
