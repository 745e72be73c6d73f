use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::archives::services::ArchiveService;
use crate::features::notifications::ComponentAction;
use crate::features::rescue::models::DetectedResource;
use crate::features::rescue::services::RescueService;
use crate::modules::discord::PlatformMessage;

use super::ActivityService;

/// Result of ingesting one chat message
#[derive(Debug, Default)]
pub struct MessageOutcome {
    pub activity_updated: bool,
    pub detected: Vec<DetectedResource>,
}

/// Applies platform events to the lifecycle services.
///
/// Shared by the gateway listener and the `/api/events/*` routes so both
/// ingestion paths behave the same.
pub struct EventService {
    activity: Arc<ActivityService>,
    rescue: Arc<RescueService>,
    archive: Arc<ArchiveService>,
}

impl EventService {
    pub fn new(
        activity: Arc<ActivityService>,
        rescue: Arc<RescueService>,
        archive: Arc<ArchiveService>,
    ) -> Self {
        Self {
            activity,
            rescue,
            archive,
        }
    }

    /// Refresh activity and run real-time capture. Bot authors are ignored.
    pub async fn message_created(
        &self,
        channel_id: &str,
        message: &PlatformMessage,
        author_is_bot: bool,
    ) -> Result<MessageOutcome> {
        if author_is_bot {
            return Ok(MessageOutcome::default());
        }

        let activity_updated = self.activity.update_activity(channel_id).await?;

        let detected = self.rescue.capture_message(message).unwrap_or_else(|e| {
            tracing::warn!(
                "Real-time capture failed for message {} in {}: {}",
                message.id,
                channel_id,
                e
            );
            Vec::new()
        });

        Ok(MessageOutcome {
            activity_updated,
            detected,
        })
    }

    /// Apply a warning-notice button and describe what happened.
    pub async fn component_pressed(&self, custom_id: &str) -> Result<String> {
        let action = ComponentAction::parse(custom_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown component id: {}", custom_id)))?;

        match action {
            ComponentAction::Postpone(channel_id) => {
                let watched = self.activity.postpone(&channel_id, None).await?;
                Ok(format!(
                    "Archive of channel {} postponed until {}",
                    channel_id,
                    watched.last_activity.format("%Y-%m-%d %H:%M")
                ))
            }
            ComponentAction::ArchiveNow(channel_id) => {
                let options = self.activity.archive_options(&channel_id).await?;
                let outcome = self.archive.archive_and_delete(&channel_id, options).await?;
                self.activity.mark_archived(&channel_id).await?;
                Ok(format!(
                    "Channel {} archived with {} resources",
                    outcome.receipt.channel_name, outcome.receipt.resource_count
                ))
            }
        }
    }

    /// The bot was removed from a guild: stop watching its channels.
    pub async fn guild_left(&self, guild_id: &str) -> Result<u64> {
        self.activity.forget_guild(guild_id).await
    }
}
