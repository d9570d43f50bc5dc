//! Cache Module
//!
//! Provides in-memory caching with LRU eviction and per-entry TTL expiration.

mod age;
mod builder;
mod bulk;
mod clock;
mod entry;
mod listener;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use age::Age;
pub use builder::CacheBuilder;
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use entry::CacheEntry;
pub use listener::{EvictionCallback, RemovalCause};
pub use lru::{Iter, RecencyStore};
pub use shared::ExpiringCache;
pub use stats::CacheStats;
pub use store::ExpiringStore;
