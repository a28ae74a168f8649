//! Cache Sweep Task
//!
//! Background task that periodically deletes stale cached documents.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::ContentCache;

/// Spawns a background task that sweeps the content cache every
/// `sweep_interval_secs` seconds.
///
/// The sweep touches the filesystem, so each run is dispatched to the
/// blocking pool. The returned handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ContentCache::new(CacheConfig::default()));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 3600);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<ContentCache>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let cache = Arc::clone(&cache);
            match tokio::task::spawn_blocking(move || cache.sweep()).await {
                Ok(0) => debug!("Cache sweep: no stale entries found"),
                Ok(removed) => info!("Cache sweep: removed {} stale entries", removed),
                Err(e) => warn!(error = %e, "Cache sweep task failed"),
            }
        }
    })
}
