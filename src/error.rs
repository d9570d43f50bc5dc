//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Lenient accessors (`get`, `ttl`, `remove`, ...) never surface these;
/// a miss there is `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent or logically expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Rejected argument (negative age, zero capacity, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CacheError {
    pub(crate) fn not_found<K: std::fmt::Debug>(key: &K) -> Self {
        CacheError::NotFound(format!("{:?}", key))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
