//! Expiring LRU - A thread-safe in-process cache
//!
//! Bounds memory by recency (LRU eviction) and staleness by wall-clock
//! expiration (per-entry TTL). Expired entries are removed lazily, whenever
//! an operation touches them.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Age, CacheBuilder, ExpiringCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::{spawn_configured_sweeper, spawn_sweeper_task};
