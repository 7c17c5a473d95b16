//! Background feed refresh.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use super::service::FeedService;

/// Periodically runs [`FeedService::refresh`].
pub struct FeedUpdater {
    service: Arc<FeedService>,
    refresh_interval: Duration,
}

impl FeedUpdater {
    /// Create an updater refreshing every `interval_secs` seconds.
    pub fn new(service: Arc<FeedService>, interval_secs: u64) -> Self {
        Self {
            service,
            refresh_interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    /// Run the updater loop.
    ///
    /// The first refresh runs immediately. Failed cycles are logged and the
    /// loop carries on.
    pub async fn run(&self) {
        info!(
            "Feed updater started (refresh interval: {} seconds)",
            self.refresh_interval.as_secs()
        );

        let mut timer = interval(self.refresh_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.refresh_once().await;
        }
    }

    async fn refresh_once(&self) {
        match self.service.refresh().await {
            Ok(report) if !report.failed_channels.is_empty() => {
                warn!(
                    "Background refresh done, {} channel(s) failed",
                    report.failed_channels.len()
                );
            }
            Ok(_) => {}
            Err(e) => error!("Background refresh failed: {}", e),
        }
    }
}

/// Start the feed updater as a background task.
pub fn start_feed_updater(service: Arc<FeedService>, interval_secs: u64) -> JoinHandle<()> {
    let updater = FeedUpdater::new(service, interval_secs);
    tokio::spawn(async move {
        updater.run().await;
    })
}
