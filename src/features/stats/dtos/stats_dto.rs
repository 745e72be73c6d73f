use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::modules::persistence::{ChannelResourceCount, ResourceTypeCount};

#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct GuildStatsParams {
    #[validate(length(min = 1, max = 32))]
    pub guild_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuildStatsDto {
    pub guild_id: String,
    pub watched_channels: i64,
    pub archived_channels: i64,
    pub restored_channels: i64,
    pub total_resources: i64,
    /// Resources rescued within the recent window
    pub recent_resources: i64,
    pub recent_window_days: i64,
    pub resources_by_type: Vec<ResourceTypeCountDto>,
    pub top_channels: Vec<ChannelResourceCountDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResourceTypeCountDto {
    pub resource_type: String,
    pub count: i64,
}

impl From<ResourceTypeCount> for ResourceTypeCountDto {
    fn from(c: ResourceTypeCount) -> Self {
        Self {
            resource_type: c.resource_type.to_string(),
            count: c.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelResourceCountDto {
    pub archived_channel_id: uuid::Uuid,
    pub name: String,
    pub resource_count: i64,
}

impl From<ChannelResourceCount> for ChannelResourceCountDto {
    fn from(c: ChannelResourceCount) -> Self {
        Self {
            archived_channel_id: c.archived_channel_id,
            name: c.name,
            resource_count: c.resource_count,
        }
    }
}
