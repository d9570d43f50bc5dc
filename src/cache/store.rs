//! Cache Store Module
//!
//! Expiration layer combining the recency store with per-entry deadlines.
//!
//! The store is not synchronized; [`ExpiringCache`](crate::cache::ExpiringCache)
//! wraps it in a lock. Every method takes the current time explicitly so one
//! public operation observes a single instant.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::lru::{Iter, RecencyStore};
use crate::cache::{Age, CacheEntry, CacheStats, RemovalCause, Timestamp};
use crate::error::{CacheError, Result};

// == Expiring Store ==
/// Recency-ordered storage where every value carries an absolute deadline.
#[derive(Debug)]
pub struct ExpiringStore<K, V> {
    /// Entries ordered by access recency
    lru: RecencyStore<K, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Age applied when a write does not specify one
    default_age: Age,
    /// Lower bound on every stored deadline; `None` when empty
    earliest_deadline: Option<Timestamp>,
}

impl<K, V> ExpiringStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the store can hold
    /// * `default_age` - Lifetime for entries written without an explicit age
    pub fn new(capacity: usize, default_age: Age) -> Self {
        Self {
            lru: RecencyStore::new(capacity),
            stats: CacheStats::new(),
            default_age,
            earliest_deadline: None,
        }
    }

    fn note_removal(&mut self, key: &K, cause: RemovalCause) {
        match cause {
            RemovalCause::Evicted => {
                debug!("Key {:?} {}", key, cause);
                self.stats.record_evictions(1);
            }
            RemovalCause::Expired => {
                trace!("Key {:?} {}", key, cause);
                self.stats.record_expirations(1);
            }
            RemovalCause::Explicit => trace!("Key {:?} {}", key, cause),
        }
        self.stats.set_total_entries(self.lru.len());
    }

    // == Deadline ==
    /// Returns `now + (age or default_age)`.
    pub fn compute_deadline(&self, now: Timestamp, age: Option<Age>) -> Result<Timestamp> {
        let age = age.unwrap_or(self.default_age);
        now.checked_add_signed(age.to_time_delta()?).ok_or_else(|| {
            CacheError::InvalidArgument(format!(
                "age {:?} overflows the timestamp range",
                age.as_duration()
            ))
        })
    }

    // == Expiry Check ==
    /// True if `key` is absent or its deadline is strictly before `now`.
    pub fn is_expired(&self, key: &K, now: Timestamp) -> bool {
        self.lru
            .peek(key)
            .map_or(true, |entry| entry.is_expired_at(now))
    }

    // Drops `key` if it is stored but expired. Returns true when the key is
    // logically absent afterwards.
    fn expire_key(&mut self, key: &K, now: Timestamp) -> bool {
        let expired = match self.lru.peek(key) {
            None => return true,
            Some(entry) => entry.is_expired_at(now),
        };
        if expired {
            self.lru.remove(key);
            self.note_removal(key, RemovalCause::Expired);
        }
        expired
    }

    // == Sweep ==
    /// Removes every expired entry. Returns the number removed.
    ///
    /// Expired entries are never reported to the eviction callback.
    pub fn sweep(&mut self, now: Timestamp) -> usize {
        match self.earliest_deadline {
            Some(earliest) if earliest < now => {}
            _ => return 0,
        }

        let mut earliest: Option<Timestamp> = None;
        let removed = self.lru.remove_where(|_, entry| {
            if entry.is_expired_at(now) {
                return true;
            }
            earliest = Some(earliest.map_or(entry.deadline, |e| e.min(entry.deadline)));
            false
        });
        self.earliest_deadline = earliest;

        let count = removed.len();
        if count > 0 {
            trace!("Sweep removed {} expired entries", count);
            self.stats.record_expirations(count);
            self.stats.set_total_entries(self.lru.len());
        }
        count
    }

    // == Insert ==
    /// Stores `value` under `key` with `age` (or the default age).
    ///
    /// Returns the live entries evicted to make room. Fails without touching
    /// the store if the deadline cannot be computed.
    pub fn insert(
        &mut self,
        key: K,
        value: V,
        age: Option<Age>,
        now: Timestamp,
    ) -> Result<Vec<(K, V)>> {
        let deadline = self.compute_deadline(now, age)?;
        Ok(self.insert_at(key, value, deadline, now))
    }

    /// Stores `value` under `key` expiring at `deadline`.
    ///
    /// A new key arriving at capacity first sweeps expired entries, so a
    /// live entry is only evicted when every stored entry is live.
    pub fn insert_at(
        &mut self,
        key: K,
        value: V,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Vec<(K, V)> {
        if !self.lru.contains(&key) && self.lru.len() >= self.lru.capacity() {
            self.sweep(now);
        }
        self.earliest_deadline = Some(
            self.earliest_deadline
                .map_or(deadline, |earliest| earliest.min(deadline)),
        );

        let mut evicted = Vec::new();
        if let Some((old_key, old)) = self.lru.insert(key, CacheEntry::new(value, deadline)) {
            let cause = if old.is_expired_at(now) {
                RemovalCause::Expired
            } else {
                RemovalCause::Evicted
            };
            self.note_removal(&old_key, cause);
            if cause.notifies() {
                evicted.push((old_key, old.value));
            }
        }
        self.stats.set_total_entries(self.lru.len());
        evicted
    }

    // == Get ==
    /// Returns the live entry for `key` and marks it most recently used.
    ///
    /// An expired entry is deleted and reported as a miss.
    pub fn get(&mut self, key: &K, now: Timestamp) -> Option<&CacheEntry<V>> {
        if self.expire_key(key, now) {
            self.stats.record_miss();
            return None;
        }
        self.stats.record_hit();
        self.lru.get(key)
    }

    // == Peek ==
    /// Like [`get`](Self::get) without promotion or hit/miss accounting.
    pub fn peek(&mut self, key: &K, now: Timestamp) -> Option<&CacheEntry<V>> {
        if self.expire_key(key, now) {
            return None;
        }
        self.lru.peek(key)
    }

    // == Remove ==
    /// Removes `key` and returns its value if it was live.
    pub fn remove(&mut self, key: &K, now: Timestamp) -> Option<V> {
        if self.expire_key(key, now) {
            return None;
        }
        let entry = self.lru.remove(key)?;
        self.note_removal(key, RemovalCause::Explicit);
        Some(entry.value)
    }

    // == Pop Extreme ==
    /// Removes and returns the least (or most) recently used live entry.
    pub fn pop_extreme(&mut self, most_recent: bool, now: Timestamp) -> Option<(K, V)> {
        self.sweep(now);
        let (key, entry) = if most_recent {
            self.lru.pop_newest()?
        } else {
            self.lru.pop_oldest()?
        };
        self.note_removal(&key, RemovalCause::Explicit);
        Some((key, entry.value))
    }

    // == Refresh ==
    /// Extends the deadline of a live entry to `now + (age or default_age)`
    /// if that is later than its current deadline. Never shortens it.
    pub fn refresh(&mut self, key: &K, age: Option<Age>, now: Timestamp) -> Result<()> {
        let candidate = self.compute_deadline(now, age)?;
        self.sweep(now);

        let entry = self
            .lru
            .get_mut(key)
            .ok_or_else(|| CacheError::not_found(key))?;
        if candidate > entry.deadline {
            entry.deadline = candidate;
        }
        Ok(())
    }

    // == Contains ==
    pub fn contains(&mut self, key: &K, now: Timestamp) -> bool {
        self.sweep(now);
        self.lru.contains(key)
    }

    // == Length ==
    /// Returns the number of live entries at `now`.
    pub fn len(&mut self, now: Timestamp) -> usize {
        self.sweep(now);
        self.lru.len()
    }

    // == Entries ==
    /// Sweeps, then iterates live entries from most to least recently used.
    pub fn entries(&mut self, now: Timestamp) -> Iter<'_, K, CacheEntry<V>> {
        self.sweep(now);
        self.lru.iter()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        let count = self.lru.len();
        self.lru.clear();
        self.earliest_deadline = None;
        self.stats.set_total_entries(0);
        trace!("Cleared {} entries", count);
    }

    // == Resize ==
    /// Changes the capacity, evicting least recently used live entries if
    /// the store no longer fits. Expired entries are swept first so they
    /// never take a live entry's place.
    pub fn resize(&mut self, capacity: usize, now: Timestamp) -> Vec<(K, V)> {
        self.sweep(now);
        let evicted = self.lru.resize(capacity);
        if !evicted.is_empty() {
            debug!(
                "Resize to {} evicted {} entries",
                capacity,
                evicted.len()
            );
        }
        evicted
            .into_iter()
            .map(|(key, entry)| {
                self.note_removal(&key, RemovalCause::Evicted);
                (key, entry.value)
            })
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.lru.capacity()
    }

    pub fn default_age(&self) -> Age {
        self.default_age
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.lru.len());
        stats
    }

    /// Structural self-check of the underlying recency store.
    pub fn is_consistent(&self) -> bool {
        self.lru.is_consistent() && self.lru.len() <= self.lru.capacity()
    }
}
