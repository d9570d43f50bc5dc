//! Removal causes and the eviction callback type.

use std::fmt;
use std::sync::Arc;

/// Callback invoked with the key and value of every live entry dropped
/// because the cache ran out of room.
///
/// It runs after the cache lock has been released.
pub type EvictionCallback<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

/// Why an entry left the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// Dropped to make room (insert overflow or shrinking resize).
    Evicted,
    /// Removed by the caller (remove, delete, pop, clear).
    Explicit,
    /// Deadline passed.
    Expired,
}

impl RemovalCause {
    /// Only capacity evictions are reported to the callback.
    pub fn notifies(self) -> bool {
        matches!(self, RemovalCause::Evicted)
    }
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalCause::Evicted => write!(f, "evicted due to capacity"),
            RemovalCause::Explicit => write!(f, "removed explicitly"),
            RemovalCause::Expired => write!(f, "expired"),
        }
    }
}
