use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::activity::models::WatchedChannel;
use crate::features::activity::services::MessageOutcome;
use crate::features::activity::workers::SweepReport;
use crate::modules::discord::PlatformAttachment;

// ============================================================================
// Watch
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WatchChannelDto {
    #[validate(length(min = 1, max = 32))]
    pub channel_id: String,
    #[validate(length(min = 1, max = 32))]
    pub guild_id: String,
    /// Days without activity before the channel is archived (default 30)
    #[validate(range(min = 1, max = 365))]
    pub inactivity_days: Option<i32>,
    /// Rescue resources before archiving (default true)
    pub rescue_enabled: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostponeDto {
    /// Days to push the deadline out (default 7)
    #[validate(range(min = 1, max = 365))]
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GuildQuery {
    pub guild_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WatchedChannelDto {
    pub id: Uuid,
    pub channel_id: String,
    pub guild_id: String,
    pub inactivity_days: i32,
    pub rescue_enabled: bool,
    pub last_activity: DateTime<Utc>,
    pub watched_since: DateTime<Utc>,
    pub is_active: bool,
    pub days_inactive: f64,
}

impl From<WatchedChannel> for WatchedChannelDto {
    fn from(w: WatchedChannel) -> Self {
        let days_inactive = w.days_inactive(Utc::now()).max(0.0);
        Self {
            id: w.id,
            channel_id: w.channel_id,
            guild_id: w.guild_id,
            inactivity_days: w.inactivity_days,
            rescue_enabled: w.rescue_enabled,
            last_activity: w.last_activity,
            watched_since: w.watched_since,
            is_active: w.is_active,
            days_inactive,
        }
    }
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityStatsDto {
    pub total_watched: i64,
    /// Idle for less than a day
    pub active_channels: i64,
    /// Idle for a day or more but below the threshold
    pub inactive_channels: i64,
    pub channels_near_archive: i64,
    pub average_inactivity_days: f64,
}

// ============================================================================
// Events
// ============================================================================

/// Incoming chat message forwarded by the gateway listener
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MessageEventDto {
    #[validate(length(min = 1))]
    pub channel_id: String,
    #[validate(length(min = 1))]
    pub message_id: String,
    pub author_id: String,
    pub author_name: String,
    #[serde(default)]
    pub author_is_bot: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub attachments: Vec<PlatformAttachment>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageEventResultDto {
    /// Whether an active watch had its activity refreshed
    pub activity_updated: bool,
    pub resources_detected: usize,
    pub resource_types: Vec<String>,
}

impl From<MessageOutcome> for MessageEventResultDto {
    fn from(outcome: MessageOutcome) -> Self {
        Self {
            activity_updated: outcome.activity_updated,
            resources_detected: outcome.detected.len(),
            resource_types: outcome
                .detected
                .iter()
                .map(|r| r.kind.resource_type().to_string())
                .collect(),
        }
    }
}

/// Button press on a warning notice
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ComponentInteractionDto {
    #[validate(length(min = 1))]
    pub custom_id: String,
}

/// Watches dropped after the bot left a guild
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GuildLeftDto {
    pub guild_id: String,
    pub watches_removed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SweepReportDto {
    pub checked: usize,
    pub warned: usize,
    pub archived: usize,
    pub deactivated: usize,
    pub failed: usize,
}

impl From<SweepReport> for SweepReportDto {
    fn from(r: SweepReport) -> Self {
        Self {
            checked: r.checked,
            warned: r.warned,
            archived: r.archived,
            deactivated: r.deactivated,
            failed: r.failed,
        }
    }
}
