//! Background Tasks Module
//!
//! Optional tasks a host may run alongside a cache.
//!
//! # Tasks
//! - Sweeper: removes expired entries at a fixed interval instead of waiting
//!   for the next access to find them

mod sweeper;

pub use sweeper::{spawn_configured_sweeper, spawn_sweeper_task};
