//! Thread-safe cache handle.
//!
//! Every public operation takes the cache lock exactly once, reads the clock
//! once, and runs its expiry check and its action under that single
//! acquisition. Capacity evictions are collected under the lock and handed
//! to the callback after it is released.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{
    Age, CacheBuilder, CacheStats, Clock, EvictionCallback, ExpiringStore, Timestamp,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

pub(crate) struct Shared<K, V> {
    pub(crate) store: Mutex<ExpiringStore<K, V>>,
    pub(crate) callback: Option<EvictionCallback<K, V>>,
    pub(crate) clock: Arc<dyn Clock>,
}

// == Expiring Cache ==
/// A bounded LRU cache whose entries also expire after a per-entry age.
///
/// Cloning is cheap and every clone refers to the same cache.
///
/// ```
/// use expiring_lru::cache::{Age, ExpiringCache};
///
/// let cache = ExpiringCache::new(100, Age::from_secs(10)).unwrap();
/// cache.set("key1", "value1", None).unwrap();
/// cache.set("key2", "value2", Some(Age::from_secs(300))).unwrap();
/// assert_eq!(cache.get(&"key1"), Some("value1"));
/// ```
pub struct ExpiringCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for ExpiringCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    // == Constructors ==
    /// Creates a cache holding at most `capacity` entries, each living
    /// `default_age` unless written with its own age.
    pub fn new(capacity: usize, default_age: impl Into<Age>) -> Result<Self> {
        CacheBuilder::new(default_age).capacity(capacity).build()
    }

    /// Like [`new`](Self::new), with an eviction callback.
    pub fn with_callback<F>(capacity: usize, default_age: impl Into<Age>, callback: F) -> Result<Self>
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        CacheBuilder::new(default_age)
            .capacity(capacity)
            .callback(callback)
            .build()
    }

    /// Builds a cache from loaded configuration.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        CacheBuilder::new(config.default_age()?)
            .capacity(config.capacity)
            .build()
    }

    /// Returns a builder for a cache with `default_age`.
    pub fn builder(default_age: impl Into<Age>) -> CacheBuilder<K, V> {
        CacheBuilder::new(default_age)
    }

    pub(crate) fn from_parts(
        store: ExpiringStore<K, V>,
        callback: Option<EvictionCallback<K, V>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(store),
                callback,
                clock,
            }),
        }
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.shared.clock)
    }

    fn now(&self) -> Timestamp {
        self.shared.clock.now()
    }

    // Runs `op` under the lock, then reports evictions outside of it.
    fn with_store<T, F>(&self, op: F) -> T
    where
        F: FnOnce(&mut ExpiringStore<K, V>, Timestamp) -> (T, Vec<(K, V)>),
    {
        let (result, evicted) = {
            let mut store = self.shared.store.lock();
            let now = self.now();
            op(&mut *store, now)
        };
        self.notify(evicted);
        result
    }

    fn locked<T, F>(&self, op: F) -> T
    where
        F: FnOnce(&mut ExpiringStore<K, V>, Timestamp) -> T,
    {
        let mut store = self.shared.store.lock();
        let now = self.now();
        op(&mut *store, now)
    }

    fn notify(&self, evicted: Vec<(K, V)>) {
        if let Some(callback) = &self.shared.callback {
            for (key, value) in evicted {
                callback(key, value);
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, expiring after `age` (or the default age).
    ///
    /// Overwriting a key resets both value and deadline and marks it most
    /// recently used. If the cache is full the least recently used entry is
    /// evicted.
    pub fn set(&self, key: K, value: V, age: Option<Age>) -> Result<()> {
        self.with_store(|store, now| match store.insert(key, value, age, now) {
            Ok(evicted) => (Ok(()), evicted),
            Err(e) => (Err(e), Vec::new()),
        })
    }

    /// Stores every `(key, value, age)` triple.
    ///
    /// All deadlines are computed up front; if any age is rejected nothing
    /// is written.
    pub fn update<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V, Option<Age>)>,
    {
        let items: Vec<_> = items.into_iter().collect();
        self.with_store(|store, now| {
            let staged: Result<Vec<_>> = items
                .into_iter()
                .map(|(key, value, age)| -> Result<(K, V, Timestamp)> {
                    Ok((key, value, store.compute_deadline(now, age)?))
                })
                .collect();
            match staged {
                Ok(staged) => {
                    let evicted = staged
                        .into_iter()
                        .flat_map(|(key, value, deadline)| store.insert_at(key, value, deadline, now))
                        .collect();
                    (Ok(()), evicted)
                }
                Err(e) => (Err(e), Vec::new()),
            }
        })
    }

    // == Get ==
    /// Returns a clone of the live value for `key`, marking it most recently
    /// used. An expired entry is deleted and `None` returned.
    pub fn get(&self, key: &K) -> Option<V> {
        self.locked(|store, now| store.get(key, now).map(|entry| entry.value.clone()))
    }

    /// Like [`get`](Self::get), also returning the entry's deadline.
    pub fn get_with_deadline(&self, key: &K) -> Option<(V, Timestamp)> {
        self.locked(|store, now| {
            store
                .get(key, now)
                .map(|entry| (entry.value.clone(), entry.deadline))
        })
    }

    /// Strict lookup: fails with [`CacheError::NotFound`] when `key` is
    /// absent or expired.
    pub fn try_get(&self, key: &K) -> Result<V> {
        self.get(key).ok_or_else(|| CacheError::not_found(key))
    }

    // == Remove ==
    /// Removes `key` and returns its value if it was live.
    ///
    /// The eviction callback is not invoked.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.locked(|store, now| store.remove(key, now))
    }

    /// Strict removal: fails with [`CacheError::NotFound`] when `key` is
    /// absent or expired.
    pub fn delete(&self, key: &K) -> Result<()> {
        self.remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::not_found(key))
    }

    /// Removes and returns the least (`most_recent == false`) or most
    /// recently used live entry.
    pub fn pop_extreme(&self, most_recent: bool) -> Option<(K, V)> {
        self.locked(|store, now| store.pop_extreme(most_recent, now))
    }

    // == Queries ==
    pub fn contains(&self, key: &K) -> bool {
        self.locked(|store, now| store.contains(key, now))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.locked(|store, now| store.len(now))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of live keys, most recently used first.
    pub fn keys(&self) -> Vec<K> {
        self.locked(|store, now| store.entries(now).map(|(k, _)| k.clone()).collect())
    }

    /// Snapshot of live values, most recently used first.
    pub fn values(&self) -> Vec<V> {
        self.locked(|store, now| {
            store
                .entries(now)
                .map(|(_, entry)| entry.value.clone())
                .collect()
        })
    }

    /// Snapshot of live `(key, value)` pairs, most recently used first.
    pub fn items(&self) -> Vec<(K, V)> {
        self.locked(|store, now| {
            store
                .entries(now)
                .map(|(k, entry)| (k.clone(), entry.value.clone()))
                .collect()
        })
    }

    /// Snapshot of live `(key, value, deadline)` triples, least recently
    /// used first.
    pub(crate) fn snapshot_oldest_first(&self) -> (Vec<(K, V, Timestamp)>, Timestamp) {
        self.locked(|store, now| {
            let mut items: Vec<_> = store
                .entries(now)
                .map(|(k, entry)| (k.clone(), entry.value.clone(), entry.deadline))
                .collect();
            items.reverse();
            (items, now)
        })
    }

    /// Removes every entry. The eviction callback is not invoked.
    pub fn clear(&self) {
        self.shared.store.lock().clear();
    }

    // == Expiry Metadata ==
    /// Remaining lifetime of `key`, or `None` if absent or expired.
    pub fn ttl(&self, key: &K) -> Option<Duration> {
        self.locked(|store, now| store.peek(key, now).and_then(|entry| entry.ttl_at(now)))
    }

    /// Absolute deadline of `key`, or `None` if absent or expired.
    pub fn deadline_of(&self, key: &K) -> Option<Timestamp> {
        self.locked(|store, now| store.peek(key, now).map(|entry| entry.deadline))
    }

    /// Extends the lifetime of a live entry to at least `age` (or the
    /// default age) from now. Never shortens it.
    pub fn refresh(&self, key: &K, age: Option<Age>) -> Result<()> {
        self.locked(|store, now| store.refresh(key, age, now))
    }

    /// Removes all expired entries now. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.locked(|store, now| store.sweep(now))
    }

    // == Capacity ==
    /// Changes the capacity. Shrinking evicts least recently used live
    /// entries through the callback.
    pub fn set_capacity(&self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "capacity must be at least 1".to_string(),
            ));
        }
        self.with_store(|store, now| ((), store.resize(capacity, now)));
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.shared.store.lock().capacity()
    }

    pub fn default_age(&self) -> Age {
        self.shared.store.lock().default_age()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.shared.store.lock().stats()
    }

    /// Structural self-check: index and recency list agree and the
    /// capacity bound holds.
    pub fn is_consistent(&self) -> bool {
        self.shared.store.lock().is_consistent()
    }
}

impl<K: Debug, V: Debug> fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("store", &*self.shared.store.lock())
            .field("has_callback", &self.shared.callback.is_some())
            .finish()
    }
}
