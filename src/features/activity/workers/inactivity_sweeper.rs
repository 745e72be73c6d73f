use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::core::error::{AppError, Result};
use crate::features::activity::models::WatchedChannel;
use crate::features::activity::services::{evaluate_inactivity, InactivityDecision};
use crate::features::archives::services::{ArchiveOptions, ArchiveService};
use crate::modules::discord::ChatPlatform;
use crate::modules::persistence::ArchiveStore;
use crate::shared::constants::WARNING_COOLDOWN_HOURS;

/// Counts from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub warned: usize,
    pub archived: usize,
    pub deactivated: usize,
    pub failed: usize,
}

enum ChannelOutcome {
    Quiet,
    Warned,
    Archived,
    /// Channel gone upstream or archived elsewhere
    Deactivated,
}

/// Periodic inactivity check over every active watch
pub struct InactivitySweeper {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ArchiveStore>,
    archive_service: Arc<ArchiveService>,
    period: Duration,
}

impl InactivitySweeper {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ArchiveStore>,
        archive_service: Arc<ArchiveService>,
        period: Duration,
    ) -> Self {
        Self {
            platform,
            store,
            archive_service,
            period,
        }
    }

    /// Run the sweeper in a background loop; the first pass starts immediately.
    pub async fn run(&self) {
        tracing::info!(
            "Starting inactivity sweeper (every {}s)",
            self.period.as_secs()
        );

        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            match self.sweep().await {
                Ok(report) => tracing::info!(
                    "Sweep finished: {} checked, {} warned, {} archived, {} deactivated, {} failed",
                    report.checked,
                    report.warned,
                    report.archived,
                    report.deactivated,
                    report.failed
                ),
                Err(e) => tracing::error!("Error running inactivity sweep: {:?}", e),
            }
        }
    }

    /// One sequential pass. Per-channel errors are logged and counted.
    pub async fn sweep(&self) -> Result<SweepReport> {
        let watches = self.store.list_active_watches(None).await?;
        let mut report = SweepReport::default();

        if watches.is_empty() {
            return Ok(report);
        }

        tracing::info!("Checking {} watched channels for inactivity", watches.len());

        for watch in watches {
            report.checked += 1;

            match self.check_channel(&watch).await {
                Ok(ChannelOutcome::Quiet) => {}
                Ok(ChannelOutcome::Warned) => report.warned += 1,
                Ok(ChannelOutcome::Archived) => report.archived += 1,
                Ok(ChannelOutcome::Deactivated) => report.deactivated += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        "Failed to check inactivity for channel {}: {:?}",
                        watch.channel_id,
                        e
                    );
                }
            }
        }

        Ok(report)
    }

    async fn check_channel(&self, watch: &WatchedChannel) -> Result<ChannelOutcome> {
        if self.platform.fetch_channel(&watch.channel_id).await?.is_none() {
            tracing::info!(
                "Watched channel {} no longer exists, deactivating",
                watch.channel_id
            );
            self.store.set_watch_active(&watch.channel_id, false).await?;
            return Ok(ChannelOutcome::Deactivated);
        }

        let now = Utc::now();
        match evaluate_inactivity(watch.last_activity, watch.inactivity_days, now) {
            InactivityDecision::Quiet => Ok(ChannelOutcome::Quiet),
            InactivityDecision::Warn(warning_type, days_remaining) => {
                let since = now - ChronoDuration::hours(WARNING_COOLDOWN_HOURS);
                if self
                    .store
                    .warning_sent_since(&watch.channel_id, warning_type, since)
                    .await?
                {
                    return Ok(ChannelOutcome::Quiet);
                }

                self.archive_service
                    .send_archive_warning(&watch.channel_id, warning_type, days_remaining)
                    .await?;
                Ok(ChannelOutcome::Warned)
            }
            InactivityDecision::Archive => self.archive(watch).await,
        }
    }

    async fn archive(&self, watch: &WatchedChannel) -> Result<ChannelOutcome> {
        let options = ArchiveOptions {
            inactivity_days: watch.inactivity_days,
            rescue_resources: watch.rescue_enabled,
            grace_period_days: None,
        };

        match self
            .archive_service
            .archive_and_delete(&watch.channel_id, options)
            .await
        {
            Ok(outcome) => {
                if let Some(err) = outcome.deletion.error.as_deref() {
                    tracing::warn!(
                        "Archived {} but source deletion failed: {}",
                        watch.channel_id,
                        err
                    );
                }
                self.store.set_watch_active(&watch.channel_id, false).await?;
                Ok(ChannelOutcome::Archived)
            }
            Err(AppError::AlreadyArchived(msg)) | Err(AppError::NotFound(msg)) => {
                tracing::info!("Deactivating watch for {}: {}", watch.channel_id, msg);
                self.store.set_watch_active(&watch.channel_id, false).await?;
                Ok(ChannelOutcome::Deactivated)
            }
            Err(e) => Err(e),
        }
    }
}
