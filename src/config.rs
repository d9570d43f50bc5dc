//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::Age;
use crate::error::Result;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Default age in seconds (fractional allowed) for entries without explicit age
    pub default_age_secs: f64,
    /// Background sweep interval in milliseconds, 0 disables the sweeper
    pub sweep_interval_ms: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `EXPIRING_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `EXPIRING_DEFAULT_AGE` - Default age in seconds (default: 300)
    /// - `EXPIRING_SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("EXPIRING_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            default_age_secs: env::var("EXPIRING_DEFAULT_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_age_secs),
            sweep_interval_ms: env::var("EXPIRING_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_ms),
        }
    }

    /// Normalized default age. Fails on negative or non-finite seconds.
    pub fn default_age(&self) -> Result<Age> {
        Age::from_secs_f64(self.default_age_secs)
    }

    /// Sweep interval, or `None` when the sweeper is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_ms > 0).then(|| Duration::from_millis(self.sweep_interval_ms))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_age_secs: 300.0,
            sweep_interval_ms: 0,
        }
    }
}
