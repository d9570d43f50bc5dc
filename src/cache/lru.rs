//! Recency Store Module
//!
//! Implements a capacity-bounded map ordered by access recency.
//!
//! Slots live in a generational arena and are chained into a doubly linked
//! list; a hash index maps each key to its slot handle.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use generational_arena::{Arena, Index};

// == Slot ==
#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    prev: Option<Index>,
    next: Option<Index>,
}

// == Recency Store ==
/// A bounded map with least-recently-used eviction.
///
/// - head = most recently used
/// - tail = least recently used
pub struct RecencyStore<K, V> {
    slots: Arena<Slot<K, V>>,
    index: HashMap<K, Index>,
    head: Option<Index>,
    tail: Option<Index>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> RecencyStore<K, V> {
    // == Constructor ==
    /// Creates an empty store holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arena::with_capacity(capacity.min(1024)),
            index: HashMap::new(),
            head: None,
            tail: None,
            capacity,
        }
    }

    // Detaches a slot from the list without freeing it.
    fn unlink(&mut self, idx: Index) {
        let (prev, next) = {
            let slot = &self.slots[idx];
            (slot.prev, slot.next)
        };

        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
    }

    // Links an already allocated slot in as the new head.
    fn push_front_slot(&mut self, idx: Index) {
        let old_head = self.head;
        {
            let slot = &mut self.slots[idx];
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(h) = old_head {
            self.slots[h].prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn promote(&mut self, idx: Index) {
        if self.head != Some(idx) {
            self.unlink(idx);
            self.push_front_slot(idx);
        }
    }

    fn take(&mut self, idx: Index) -> Option<(K, V)> {
        self.unlink(idx);
        let slot = self.slots.remove(idx)?;
        self.index.remove(&slot.key);
        Some((slot.key, slot.value))
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.promote(idx);
        self.slots.get(idx).map(|slot| &slot.value)
    }

    /// Mutable variant of [`get`](Self::get); also promotes.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.index.get(key)?;
        self.promote(idx);
        self.slots.get_mut(idx).map(|slot| &mut slot.value)
    }

    // == Peek ==
    /// Returns the value for `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots.get(idx).map(|slot| &slot.value)
    }

    /// Returns the least recently used pair without removing it.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        let idx = self.tail?;
        self.slots.get(idx).map(|slot| (&slot.key, &slot.value))
    }

    // == Contains ==
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // == Insert ==
    /// Inserts or replaces `key` and marks it most recently used.
    ///
    /// When `key` is new and the store is full, the least recently used
    /// entry is evicted and returned. A zero-capacity store hands the
    /// incoming pair straight back.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.slots[idx].value = value;
            self.promote(idx);
            return None;
        }
        if self.capacity == 0 {
            return Some((key, value));
        }

        let evicted = if self.index.len() >= self.capacity {
            self.pop_oldest()
        } else {
            None
        };

        let idx = self.slots.insert(Slot {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.index.insert(key, idx);
        self.push_front_slot(idx);

        evicted
    }

    // == Remove ==
    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = *self.index.get(key)?;
        self.take(idx).map(|(_, value)| value)
    }

    // == Pop ==
    /// Removes and returns the least recently used entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        self.take(idx)
    }

    /// Removes and returns the most recently used entry.
    pub fn pop_newest(&mut self) -> Option<(K, V)> {
        let idx = self.head?;
        self.take(idx)
    }

    /// Removes every entry matching `pred` and returns them.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<(K, V)>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<Index> = self
            .slots
            .iter()
            .filter(|(_, slot)| pred(&slot.key, &slot.value))
            .map(|(idx, _)| idx)
            .collect();

        doomed.into_iter().filter_map(|idx| self.take(idx)).collect()
    }

    // == Resize ==
    /// Changes the capacity. Shrinking evicts least recently used entries
    /// until the store fits, returning them oldest first.
    pub fn resize(&mut self, capacity: usize) -> Vec<(K, V)> {
        self.capacity = capacity;
        let mut evicted = Vec::new();
        while self.index.len() > self.capacity {
            match self.pop_oldest() {
                Some(pair) => evicted.push(pair),
                None => break,
            }
        }
        evicted
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    // == Consistency Check ==
    /// Verifies that the hash index and the recency list hold exactly the
    /// same slots, and that every link is mirrored by its back link.
    pub fn is_consistent(&self) -> bool {
        if self.index.len() != self.slots.len() {
            return false;
        }

        let mut seen = 0usize;
        let mut prev: Option<Index> = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let Some(slot) = self.slots.get(idx) else {
                return false;
            };
            if slot.prev != prev || self.index.get(&slot.key) != Some(&idx) {
                return false;
            }
            seen += 1;
            if seen > self.index.len() {
                // cycle
                return false;
            }
            prev = Some(idx);
            cursor = slot.next;
        }

        seen == self.index.len() && self.tail == prev
    }
}

impl<K, V> RecencyStore<K, V> {
    // == Length ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Iter ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            store: self,
            cursor: self.head,
            remaining: self.index.len(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RecencyStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecencyStore")
            .field("capacity", &self.capacity)
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

// == Iterator ==
/// Most-recent-first iterator over a [`RecencyStore`].
pub struct Iter<'a, K, V> {
    store: &'a RecencyStore<K, V>,
    cursor: Option<Index>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let slot = self.store.slots.get(idx)?;
        self.cursor = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
