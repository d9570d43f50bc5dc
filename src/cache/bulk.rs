//! Bulk constructors.
//!
//! Shorthands over [`CacheBuilder`] for the common "build from data" cases.
//! Use the builder directly to attach a callback or a clock.

use std::fmt::Debug;
use std::hash::Hash;

use crate::cache::{Age, CacheBuilder, ExpiringCache};
use crate::error::Result;

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Creates a cache mapping every key in `keys` to `default_value`.
    ///
    /// `capacity` defaults to the number of keys. `Some(0)` is rejected.
    pub fn from_keys<I>(
        keys: I,
        default_value: V,
        default_age: impl Into<Age>,
        capacity: Option<usize>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        with_capacity(CacheBuilder::new(default_age), capacity)
            .build_from_keys(keys, default_value)
    }

    /// Creates a cache holding every `(key, value)` pair of `mapping`.
    ///
    /// `capacity` defaults to the number of pairs. `Some(0)` is rejected.
    pub fn from_mapping<I>(
        mapping: I,
        default_age: impl Into<Age>,
        capacity: Option<usize>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        with_capacity(CacheBuilder::new(default_age), capacity).build_from_mapping(mapping)
    }

    /// Creates a cache from the entries of `other` that are still live.
    ///
    /// Every copied entry keeps its remaining lifetime rather than being
    /// reset to the default age. `default_age` and `capacity` fall back to
    /// `other`'s when omitted; `Some(Age::ZERO)` is honored as a zero
    /// default age. The eviction callback of `other` is not carried over.
    pub fn from_other_cache(
        other: &ExpiringCache<K, V>,
        default_age: Option<Age>,
        capacity: Option<usize>,
    ) -> Result<Self> {
        let default_age = default_age.unwrap_or_else(|| other.default_age());
        with_capacity(CacheBuilder::new(default_age), capacity).build_from_cache(other)
    }
}

fn with_capacity<K, V>(builder: CacheBuilder<K, V>, capacity: Option<usize>) -> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    match capacity {
        Some(capacity) => builder.capacity(capacity),
        None => builder,
    }
}
