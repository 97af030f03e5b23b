//! Cache Maintenance Tasks
//!
//! Startup sweep plus a background task that periodically removes expired
//! cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::service::StockDataService;

/// Runs the startup cache sweep and logs the resulting usage.
///
/// Failures are logged; startup continues either way.
pub async fn initialize(service: &StockDataService) {
    match service.clean_expired_cache().await {
        Ok(removed) => info!("Startup cleanup removed {} expired entries", removed),
        Err(e) => warn!("Startup cleanup failed: {}", e),
    }

    let stats = service.get_cache_stats().await;
    info!(
        "Cache stats: {}/{} entries ({}% used)",
        stats.total_entries,
        stats.max_size,
        stats.usage_percent()
    );
}

/// Spawns a background task that periodically sweeps expired entries.
///
/// The returned handle is aborted on shutdown.
pub fn spawn_cleanup_task(service: StockDataService, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately; initialize already swept
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match service.clean_expired_cache().await {
                Ok(0) => debug!("Cache cleanup: no expired entries found"),
                Ok(removed) => info!("Cache cleanup: removed {} expired entries", removed),
                Err(e) => warn!("Cache cleanup failed: {}", e),
            }
        }
    })
}
