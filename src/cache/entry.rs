//! Cache Entry Module
//!
//! Defines the immutable value-plus-deadline pair stored in a shard.

use std::time::{Duration, Instant};

/// Longest lifetime an entry can be given; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

// == Cache Entry ==
/// A stored value and the instant after which it is dead.
///
/// Entries are never mutated once built; an update stores a new entry in
/// place of the old one.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    ///
    /// `ttl` is clamped to [`MAX_TTL`] so the deadline never overflows the
    /// platform clock.
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        Self::with_deadline(value, expires_at)
    }

    /// Creates an entry with an explicit deadline.
    pub fn with_deadline(value: V, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// The stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The instant at which this entry stops being served.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    // == Is Expired ==
    /// Checks expiry against a caller-supplied clock reading.
    ///
    /// Boundary condition: an entry whose deadline equals `now` is expired.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    /// Checks expiry against the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Remaining lifetime, or zero once the entry has expired.
    #[allow(dead_code)]
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
