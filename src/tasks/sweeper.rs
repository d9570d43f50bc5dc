//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ExpiringCache;
use crate::config::CacheConfig;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The cache never needs this: every operation already discards what it
/// finds expired. The sweeper only bounds how long dead entries keep
/// occupying memory in a cache nobody is reading.
///
/// # Arguments
/// * `cache` - handle to the cache to sweep
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Example
/// ```ignore
/// let cache = ExpiringCache::new(1000, Age::from_secs(300))?;
/// let sweeper = spawn_sweeper_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper_task<K, V>(cache: ExpiringCache<K, V>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep();

            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

/// Starts the sweeper if `config` sets a non-zero sweep interval.
///
/// Returns `None` when sweeping is disabled.
pub fn spawn_configured_sweeper<K, V>(
    cache: &ExpiringCache<K, V>,
    config: &CacheConfig,
) -> Option<JoinHandle<()>>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    match config.sweep_interval() {
        Some(interval) => Some(spawn_sweeper_task(cache.clone(), interval)),
        None => {
            debug!("Expiry sweeper disabled by configuration");
            None
        }
    }
}
