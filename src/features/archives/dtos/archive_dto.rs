use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::archives::models::{ArchivedChannel, ForgetCounts};
use crate::features::archives::services::{ArchiveOutcome, ForgetReport, RestoreOutcome};
use crate::modules::discord::PermissionOverwrite;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ArchiveChannelDto {
    #[validate(length(min = 1, max = 32))]
    pub channel_id: String,
    /// Defaults to the channel's watch setting, or true when unwatched
    pub rescue_resources: Option<bool>,
    #[validate(range(min = 1, max = 365))]
    pub inactivity_days: Option<i32>,
    #[validate(range(min = 0, max = 365))]
    pub grace_period_days: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RestoreChannelDto {
    #[validate(length(min = 1, max = 100))]
    pub channel_name: String,
    #[validate(length(min = 1, max = 32))]
    pub guild_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgetChannelDto {
    #[validate(length(min = 1, max = 32))]
    pub guild_id: String,
    #[validate(length(min = 1, max = 100))]
    pub channel_name: String,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[validate(length(min = 1, max = 100))]
    pub requested_by: String,
    /// Must be true; forgotten deletion cannot be undone
    pub confirm: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgetByIdDto {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[validate(length(min = 1, max = 100))]
    pub requested_by: String,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ArchiveListParams {
    pub guild_id: Option<String>,
    #[serde(default)]
    pub include_restored: bool,
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

impl ArchiveListParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchivedChannelDto {
    pub id: Uuid,
    pub original_id: String,
    pub name: String,
    pub category: Option<String>,
    pub guild_id: String,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub rate_limit: i32,
    pub position: i32,
    pub permission_snapshot: Vec<PermissionOverwrite>,
    pub archived_at: DateTime<Utc>,
    pub restored: bool,
    pub restored_at: Option<DateTime<Utc>>,
    /// Present on single-archive reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<i64>,
}

impl From<ArchivedChannel> for ArchivedChannelDto {
    fn from(a: ArchivedChannel) -> Self {
        Self {
            id: a.id,
            original_id: a.original_id,
            name: a.name,
            category: a.category,
            guild_id: a.guild_id,
            topic: a.topic,
            nsfw: a.nsfw,
            rate_limit: a.rate_limit,
            position: a.position,
            permission_snapshot: a.permission_snapshot.0,
            archived_at: a.archived_at,
            restored: a.restored,
            restored_at: a.restored_at,
            resource_count: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchiveResultDto {
    /// True once the snapshot and resources are persisted
    pub success: bool,
    pub archived_channel_id: Uuid,
    pub channel_name: String,
    pub resource_count: usize,
    pub duplicates: usize,
    pub channel_deleted: bool,
    pub deletion_error: Option<String>,
}

impl From<ArchiveOutcome> for ArchiveResultDto {
    fn from(o: ArchiveOutcome) -> Self {
        Self {
            success: true,
            archived_channel_id: o.receipt.archived_channel_id,
            channel_name: o.receipt.channel_name,
            resource_count: o.receipt.resource_count,
            duplicates: o.receipt.duplicates,
            channel_deleted: o.deletion.deleted,
            deletion_error: o.deletion.error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestoreResultDto {
    pub success: bool,
    pub archived_channel_id: Uuid,
    pub channel_id: String,
    pub resource_count: i64,
}

impl From<RestoreOutcome> for RestoreResultDto {
    fn from(o: RestoreOutcome) -> Self {
        Self {
            success: true,
            archived_channel_id: o.archived_channel_id,
            channel_id: o.channel_id,
            resource_count: o.resource_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ForgetResultDto {
    pub archived_channel_id: Uuid,
    pub name: Option<String>,
    pub resources_deleted: u64,
    pub warnings_deleted: u64,
}

impl ForgetResultDto {
    pub fn from_counts(archived_channel_id: Uuid, name: Option<String>, counts: ForgetCounts) -> Self {
        Self {
            archived_channel_id,
            name,
            resources_deleted: counts.resources,
            warnings_deleted: counts.warnings,
        }
    }
}

impl From<ForgetReport> for ForgetResultDto {
    fn from(r: ForgetReport) -> Self {
        Self::from_counts(r.archived_channel_id, Some(r.name), r.counts)
    }
}
