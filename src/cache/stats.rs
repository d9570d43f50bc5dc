//! Cache Statistics Module
//!
//! Tracks cache metrics including hits, misses, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful single-key reads
    pub hits: u64,
    /// Number of single-key reads that found nothing (absent or expired)
    pub misses: u64,
    /// Number of live entries dropped due to capacity pressure
    pub evictions: u64,
    /// Number of entries dropped because their deadline passed
    pub expirations: u64,
    /// Current number of physically stored entries
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Reads ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Removals ==
    /// Adds `count` live entries dropped for lack of room.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Adds `count` entries dropped past their deadline.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    // == Update Size ==
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
