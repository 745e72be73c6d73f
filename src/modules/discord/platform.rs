use async_trait::async_trait;

use super::error::PlatformError;
use super::models::{CreateChannelRequest, MessagePayload, PlatformChannel, PlatformMessage};

/// Maximum page size the platform accepts for message history
pub const MAX_MESSAGES_PER_PAGE: u8 = 100;

/// Upstream chat platform operations the lifecycle core depends on.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Resolve a channel by id. `Ok(None)` when it no longer exists.
    async fn fetch_channel(&self, channel_id: &str)
        -> Result<Option<PlatformChannel>, PlatformError>;

    /// All channels (including categories) of a guild.
    async fn fetch_guild_channels(
        &self,
        guild_id: &str,
    ) -> Result<Vec<PlatformChannel>, PlatformError>;

    /// One page of history, newest first, strictly older than `before` when given.
    async fn fetch_messages(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u8,
    ) -> Result<Vec<PlatformMessage>, PlatformError>;

    async fn create_channel(
        &self,
        guild_id: &str,
        request: &CreateChannelRequest,
    ) -> Result<PlatformChannel, PlatformError>;

    /// Delete a channel, recording `reason` in the audit log.
    async fn delete_channel(&self, channel_id: &str, reason: &str) -> Result<(), PlatformError>;

    async fn send_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<(), PlatformError>;
}
