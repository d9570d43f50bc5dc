//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with an absolute deadline.

use std::time::Duration;

use serde::Serialize;

use crate::cache::Timestamp;

// == Cache Entry ==
/// Represents a single cache entry with value and deadline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiration instant
    pub deadline: Timestamp,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring at `deadline`.
    pub fn new(value: V, deadline: Timestamp) -> Self {
        Self { value, deadline }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is still valid exactly at its deadline.
    /// It expires once `now` is strictly past it.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.deadline < now
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`, or None once expired.
    pub fn ttl_at(&self, now: Timestamp) -> Option<Duration> {
        if self.is_expired_at(now) {
            return None;
        }
        (self.deadline - now).to_std().ok()
    }
}
