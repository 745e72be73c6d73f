use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::activity::dtos::ActivityStatsDto;
use crate::features::activity::services::ActivityService;
use crate::features::stats::dtos::*;
use crate::modules::persistence::ArchiveStore;
use crate::shared::constants::{RECENT_WINDOW_DAYS, TOP_CHANNELS_LIMIT};

/// Read-only aggregates over the lifecycle tables
pub struct StatsService {
    activity: Arc<ActivityService>,
    store: Arc<dyn ArchiveStore>,
}

impl StatsService {
    pub fn new(activity: Arc<ActivityService>, store: Arc<dyn ArchiveStore>) -> Self {
        Self { activity, store }
    }

    pub async fn activity_stats(&self, guild_id: &str) -> Result<ActivityStatsDto> {
        self.activity.activity_stats(guild_id).await
    }

    /// Archive, restore and resource counts for one guild
    pub async fn guild_stats(&self, guild_id: &str) -> Result<GuildStatsDto> {
        let recent_since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);

        let (counts, by_type, top) = futures::try_join!(
            self.store.guild_counts(guild_id, recent_since),
            self.store.resource_counts_by_type(Some(guild_id)),
            self.store.top_channels_by_resources(guild_id, TOP_CHANNELS_LIMIT),
        )?;

        Ok(GuildStatsDto {
            guild_id: guild_id.to_string(),
            watched_channels: counts.watched_channels,
            archived_channels: counts.archived_channels,
            restored_channels: counts.restored_channels,
            total_resources: counts.resources,
            recent_resources: counts.recent_resources,
            recent_window_days: RECENT_WINDOW_DAYS,
            resources_by_type: by_type.into_iter().map(Into::into).collect(),
            top_channels: top.into_iter().map(Into::into).collect(),
        })
    }
}
