//! Age Module
//!
//! Normalizes the accepted age inputs (durations, whole or fractional seconds)
//! into one non-negative duration.

use std::time::Duration;

use chrono::TimeDelta;

use crate::error::{CacheError, Result};

// == Age ==
/// A non-negative lifetime applied to an entry at write time.
///
/// `Age::ZERO` means "valid only at the instant of insertion".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Age(Duration);

impl Age {
    pub const ZERO: Age = Age(Duration::ZERO);

    /// Creates an age from whole seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Age(Duration::from_secs(secs))
    }

    /// Creates an age from milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Age(Duration::from_millis(millis))
    }

    /// Creates an age from fractional seconds.
    ///
    /// Negative, NaN and infinite inputs are rejected.
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(CacheError::InvalidArgument(format!(
                "age must be a finite, non-negative number of seconds, got {}",
                secs
            )));
        }
        Duration::try_from_secs_f64(secs)
            .map(Age)
            .map_err(|e| CacheError::InvalidArgument(format!("age out of range: {}", e)))
    }

    /// Returns the age as a standard duration.
    pub const fn as_duration(&self) -> Duration {
        self.0
    }

    /// Returns the age as a chrono delta, for deadline arithmetic.
    pub(crate) fn to_time_delta(self) -> Result<TimeDelta> {
        TimeDelta::from_std(self.0)
            .map_err(|_| CacheError::InvalidArgument(format!("age {:?} out of range", self.0)))
    }
}

impl From<Duration> for Age {
    fn from(duration: Duration) -> Self {
        Age(duration)
    }
}

impl From<Age> for Duration {
    fn from(age: Age) -> Self {
        age.0
    }
}

impl From<u64> for Age {
    fn from(secs: u64) -> Self {
        Age::from_secs(secs)
    }
}

impl From<u32> for Age {
    fn from(secs: u32) -> Self {
        Age::from_secs(secs as u64)
    }
}

impl TryFrom<i64> for Age {
    type Error = CacheError;

    fn try_from(secs: i64) -> Result<Self> {
        u64::try_from(secs).map(Age::from_secs).map_err(|_| {
            CacheError::InvalidArgument(format!("age must not be negative, got {}s", secs))
        })
    }
}

impl TryFrom<f64> for Age {
    type Error = CacheError;

    fn try_from(secs: f64) -> Result<Self> {
        Age::from_secs_f64(secs)
    }
}

impl TryFrom<TimeDelta> for Age {
    type Error = CacheError;

    fn try_from(delta: TimeDelta) -> Result<Self> {
        delta.to_std().map(Age).map_err(|_| {
            CacheError::InvalidArgument(format!("age must not be negative, got {}", delta))
        })
    }
}
