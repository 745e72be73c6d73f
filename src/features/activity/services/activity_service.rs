use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::activity::dtos::ActivityStatsDto;
use crate::features::activity::models::{WatchChannel, WatchedChannel};
use crate::features::archives::services::ArchiveOptions;
use crate::modules::discord::ChatPlatform;
use crate::modules::persistence::ArchiveStore;
use crate::shared::constants::{MAX_INACTIVITY_DAYS, MIN_INACTIVITY_DAYS, NEAR_ARCHIVE_DAYS};

/// Activity Tracker: watch configuration and last-activity bookkeeping
pub struct ActivityService {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn ArchiveStore>,
    default_inactivity_days: i32,
    default_postpone_days: i64,
}

impl ActivityService {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn ArchiveStore>,
        default_inactivity_days: i32,
        default_postpone_days: i64,
    ) -> Self {
        Self {
            platform,
            store,
            default_inactivity_days,
            default_postpone_days,
        }
    }

    /// Start or refresh a watch. Re-watching updates the row in place.
    pub async fn watch(
        &self,
        channel_id: &str,
        guild_id: &str,
        inactivity_days: Option<i32>,
        rescue_enabled: Option<bool>,
    ) -> Result<WatchedChannel> {
        let inactivity_days = inactivity_days.unwrap_or(self.default_inactivity_days);
        if !(MIN_INACTIVITY_DAYS..=MAX_INACTIVITY_DAYS).contains(&inactivity_days) {
            return Err(AppError::Validation(format!(
                "inactivity_days must be between {} and {}",
                MIN_INACTIVITY_DAYS, MAX_INACTIVITY_DAYS
            )));
        }

        let channel = self
            .platform
            .fetch_channel(channel_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Channel {} not found", channel_id)))?;

        if let Some(actual) = channel.guild_id.as_deref().filter(|g| *g != guild_id) {
            return Err(AppError::BadRequest(format!(
                "Channel {} belongs to guild {}, not {}",
                channel_id, actual, guild_id
            )));
        }

        let watch = WatchChannel {
            channel_id: channel_id.to_string(),
            guild_id: guild_id.to_string(),
            inactivity_days,
            rescue_enabled: rescue_enabled.unwrap_or(true),
        };
        let row = self.store.upsert_watch(&watch, Utc::now()).await?;

        tracing::info!(
            "Now watching channel: {} ({} days)",
            channel.display_name(),
            inactivity_days
        );

        Ok(row)
    }

    /// Deactivate a watch, keeping the row.
    pub async fn unwatch(&self, channel_id: &str) -> Result<()> {
        if !self.store.set_watch_active(channel_id, false).await? {
            return Err(AppError::NotFound(format!(
                "Channel {} is not being watched",
                channel_id
            )));
        }

        tracing::info!("Stopped watching channel: {}", channel_id);
        Ok(())
    }

    /// Refresh `last_activity`; a no-op for unwatched or inactive channels.
    pub async fn update_activity(&self, channel_id: &str) -> Result<bool> {
        let updated = self.store.set_last_activity(channel_id, Utc::now()).await?;
        if updated {
            tracing::debug!("Activity recorded for channel {}", channel_id);
        }
        Ok(updated)
    }

    /// Push the archive deadline out by setting `last_activity` into the future.
    pub async fn postpone(&self, channel_id: &str, days: Option<i64>) -> Result<WatchedChannel> {
        let days = days.unwrap_or(self.default_postpone_days);
        if days <= 0 {
            return Err(AppError::Validation(
                "Postpone days must be positive".to_string(),
            ));
        }

        let until = Utc::now() + Duration::days(days);
        if !self.store.set_last_activity(channel_id, until).await? {
            return Err(AppError::NotFound(format!(
                "Channel {} is not actively watched",
                channel_id
            )));
        }

        tracing::info!("Postponed archiving for {} by {} days", channel_id, days);

        self.store
            .get_watch(channel_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Channel {} is not watched", channel_id)))
    }

    pub async fn list_watched(&self, guild_id: Option<&str>) -> Result<Vec<WatchedChannel>> {
        self.store.list_active_watches(guild_id).await
    }

    pub async fn activity_stats(&self, guild_id: &str) -> Result<ActivityStatsDto> {
        let watches = self.store.list_active_watches(Some(guild_id)).await?;
        let now = Utc::now();

        let mut stats = ActivityStatsDto {
            total_watched: watches.len() as i64,
            ..Default::default()
        };
        let mut total_days = 0.0;

        for watch in &watches {
            // Postponed channels count as freshly active
            let idle = watch.days_inactive(now).max(0.0);
            let threshold = f64::from(watch.inactivity_days);
            total_days += idle;

            if idle < 1.0 {
                stats.active_channels += 1;
            } else if idle < threshold {
                stats.inactive_channels += 1;
            }

            if idle >= threshold - NEAR_ARCHIVE_DAYS {
                stats.channels_near_archive += 1;
            }
        }

        if !watches.is_empty() {
            stats.average_inactivity_days = total_days / watches.len() as f64;
        }

        Ok(stats)
    }

    /// Archive options taken from the channel's watch, or defaults when unwatched.
    pub async fn archive_options(&self, channel_id: &str) -> Result<ArchiveOptions> {
        let watch = self.store.get_watch(channel_id).await?;
        Ok(ArchiveOptions {
            inactivity_days: watch
                .as_ref()
                .map_or(self.default_inactivity_days, |w| w.inactivity_days),
            rescue_resources: watch.as_ref().is_none_or(|w| w.rescue_enabled),
            grace_period_days: None,
        })
    }

    /// Deactivate the watch after an archive; false when the channel was unwatched.
    pub async fn mark_archived(&self, channel_id: &str) -> Result<bool> {
        self.store.set_watch_active(channel_id, false).await
    }

    /// Drop every watch row of a guild the bot is no longer part of.
    pub async fn forget_guild(&self, guild_id: &str) -> Result<u64> {
        let removed = self.store.delete_watches_for_guild(guild_id).await?;
        tracing::info!("Removed {} watches for departed guild {}", removed, guild_id);
        Ok(removed)
    }
}
