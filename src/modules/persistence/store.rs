use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::activity::models::{ArchiveWarning, WarningType, WatchChannel, WatchedChannel};
use crate::features::archives::models::{ArchivedChannel, CreateArchivedChannel, ForgetCounts};
use crate::features::rescue::models::{NewResource, Resource, ResourceType};

/// Result of a single resource insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same dedup key already exists
    Duplicate,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ResourceTypeCount {
    pub resource_type: ResourceType,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ChannelResourceCount {
    pub archived_channel_id: Uuid,
    pub name: String,
    pub resource_count: i64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct GuildCounts {
    pub watched_channels: i64,
    pub archived_channels: i64,
    pub restored_channels: i64,
    pub resources: i64,
    pub recent_resources: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveFilter {
    pub guild_id: Option<String>,
    pub include_restored: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Keyword search over a guild's rescued resources
#[derive(Debug, Clone)]
pub struct ResourceSearch {
    pub guild_id: String,
    /// Case-insensitive substring of url, file name, content or context,
    /// or an exact tag
    pub query: String,
    pub resource_type: Option<ResourceType>,
    pub author_id: Option<String>,
    pub limit: i64,
}

/// Search hit with the archive it was rescued from
#[derive(Debug, Clone, FromRow)]
pub struct ResourceMatch {
    #[sqlx(flatten)]
    pub resource: Resource,
    pub channel_name: String,
    pub archived_at: DateTime<Utc>,
}

/// Typed persistence for the four lifecycle entities.
///
/// Implementations must make `forget_archived_channel` and `discard_archive`
/// all-or-nothing.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    // Watched channels

    /// Insert, or update config and reactivate an existing row for the channel.
    async fn upsert_watch(&self, watch: &WatchChannel, now: DateTime<Utc>) -> Result<WatchedChannel>;
    async fn get_watch(&self, channel_id: &str) -> Result<Option<WatchedChannel>>;
    /// Returns false when no row exists for the channel.
    async fn set_watch_active(&self, channel_id: &str, active: bool) -> Result<bool>;
    /// Sets `last_activity` on an active row only; false when nothing matched.
    async fn set_last_activity(&self, channel_id: &str, at: DateTime<Utc>) -> Result<bool>;
    /// Active rows ordered by `last_activity` ascending.
    async fn list_active_watches(&self, guild_id: Option<&str>) -> Result<Vec<WatchedChannel>>;
    async fn delete_watches_for_guild(&self, guild_id: &str) -> Result<u64>;

    // Warnings

    async fn warning_sent_since(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        since: DateTime<Utc>,
    ) -> Result<bool>;
    async fn record_warning(
        &self,
        channel_id: &str,
        warning_type: WarningType,
        at: DateTime<Utc>,
    ) -> Result<ArchiveWarning>;

    // Archived channels

    async fn find_open_archive(&self, original_id: &str) -> Result<Option<ArchivedChannel>>;
    /// Fails with `AlreadyArchived` when an open archive exists for the source.
    async fn create_archive(
        &self,
        archive: &CreateArchivedChannel,
        at: DateTime<Utc>,
    ) -> Result<ArchivedChannel>;
    async fn get_archive(&self, id: Uuid) -> Result<Option<ArchivedChannel>>;
    /// Case-insensitive name match within a guild, newest first.
    async fn find_archives_by_name(
        &self,
        guild_id: &str,
        name: &str,
        include_restored: bool,
    ) -> Result<Vec<ArchivedChannel>>;
    async fn list_archives(&self, filter: &ArchiveFilter) -> Result<(Vec<ArchivedChannel>, i64)>;
    /// Flips `restored` on an open row; false when another restore already
    /// holds it or the row is missing.
    async fn claim_restore(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool>;
    /// Reopens a claimed row after the channel could not be recreated.
    async fn release_restore(&self, id: Uuid) -> Result<()>;
    /// Removes an archive and its resources atomically, keeping warnings.
    async fn discard_archive(&self, id: Uuid) -> Result<()>;
    /// Removes resources, warnings for the source channel and the archive atomically.
    async fn forget_archived_channel(&self, id: Uuid) -> Result<ForgetCounts>;

    // Resources

    async fn insert_resource(&self, resource: &NewResource) -> Result<InsertOutcome>;
    async fn list_resources(&self, archived_channel_id: Uuid) -> Result<Vec<Resource>>;
    async fn count_resources(&self, archived_channel_id: Uuid) -> Result<i64>;
    /// Newest first, at most `search.limit` rows.
    async fn search_resources(&self, search: &ResourceSearch) -> Result<Vec<ResourceMatch>>;

    // Aggregates

    async fn resource_counts_by_type(&self, guild_id: Option<&str>)
        -> Result<Vec<ResourceTypeCount>>;
    async fn guild_counts(&self, guild_id: &str, recent_since: DateTime<Utc>)
        -> Result<GuildCounts>;
    async fn top_channels_by_resources(
        &self,
        guild_id: &str,
        limit: i64,
    ) -> Result<Vec<ChannelResourceCount>>;
}
