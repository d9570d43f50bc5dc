//! Cache Builder Module
//!
//! Configures capacity, callback and clock before creating an
//! [`ExpiringCache`], including the bulk constructors.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{Age, Clock, EvictionCallback, ExpiringCache, ExpiringStore, SystemClock};
use crate::error::{CacheError, Result};

// == Cache Builder ==
/// Builder for [`ExpiringCache`].
///
/// ```
/// use expiring_lru::cache::{Age, CacheBuilder};
///
/// let cache = CacheBuilder::new(Age::from_secs(30))
///     .capacity(2)
///     .callback(|key: String, value: i32| println!("evicted {key}={value}"))
///     .build()
///     .unwrap();
/// cache.set("a".to_string(), 1, None).unwrap();
/// ```
pub struct CacheBuilder<K, V> {
    default_age: Age,
    capacity: Option<usize>,
    callback: Option<EvictionCallback<K, V>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Starts a builder whose entries live `default_age` unless told otherwise.
    pub fn new(default_age: impl Into<Age>) -> Self {
        Self {
            default_age: default_age.into(),
            capacity: None,
            callback: None,
            clock: None,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Called with every live entry evicted for lack of room.
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(K, V) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub(crate) fn shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    fn resolve_capacity(&self, fallback: Option<usize>) -> Result<usize> {
        match self.capacity.or(fallback) {
            Some(0) => Err(CacheError::InvalidArgument(
                "capacity must be at least 1".to_string(),
            )),
            Some(capacity) => Ok(capacity),
            None => Err(CacheError::InvalidArgument(
                "capacity is required".to_string(),
            )),
        }
    }

    fn finish(self, capacity: usize) -> ExpiringCache<K, V> {
        debug!(
            "Creating cache: capacity={}, default_age={:?}",
            capacity,
            self.default_age.as_duration()
        );
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        ExpiringCache::from_parts(
            ExpiringStore::new(capacity, self.default_age),
            self.callback,
            clock,
        )
    }

    // == Build ==
    /// Creates an empty cache. Fails if no capacity (or zero) was given.
    pub fn build(self) -> Result<ExpiringCache<K, V>> {
        let capacity = self.resolve_capacity(None)?;
        Ok(self.finish(capacity))
    }

    /// Creates a cache holding every key in `keys` mapped to `value`.
    ///
    /// Without an explicit capacity the cache is sized to the number of keys.
    pub fn build_from_keys<I>(self, keys: I, value: V) -> Result<ExpiringCache<K, V>>
    where
        I: IntoIterator<Item = K>,
    {
        self.build_from_mapping(keys.into_iter().map(|key| (key, value.clone())))
    }

    /// Creates a cache holding every `(key, value)` pair of `mapping`.
    ///
    /// Without an explicit capacity the cache is sized to the number of pairs.
    pub fn build_from_mapping<I>(self, mapping: I) -> Result<ExpiringCache<K, V>>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs: Vec<(K, V)> = mapping.into_iter().collect();
        let capacity = self.resolve_capacity(Some(pairs.len()))?;
        let cache = self.finish(capacity);
        cache.update(pairs.into_iter().map(|(key, value)| (key, value, None)))?;
        Ok(cache)
    }

    /// Creates a cache from the live entries of `other`.
    ///
    /// Each entry keeps its remaining lifetime and the relative recency
    /// order is preserved. Capacity and clock fall back to `other`'s; the
    /// callback is never inherited.
    pub fn build_from_cache(self, other: &ExpiringCache<K, V>) -> Result<ExpiringCache<K, V>> {
        let capacity = self.resolve_capacity(Some(other.capacity()))?;
        let builder = if self.clock.is_some() {
            self
        } else {
            self.shared_clock(other.clock())
        };
        let cache = builder.finish(capacity);

        let (items, now) = other.snapshot_oldest_first();
        let mut staged = Vec::with_capacity(items.len());
        for (key, value, deadline) in items {
            // snapshot excludes expired entries, so the delta is non-negative
            let remaining = Age::try_from(deadline - now)?;
            staged.push((key, value, Some(remaining)));
        }
        cache.update(staged)?;
        Ok(cache)
    }
}
