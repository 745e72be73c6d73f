use async_trait::async_trait;
use serenity::all::{Channel, GetMessages};
use serenity::http::Http;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::DiscordConfig;
use crate::shared::retry::{retry_with_backoff, retry_with_backoff_when, RetryPolicy};

use super::convert;
use super::error::PlatformError;
use super::models::{CreateChannelRequest, MessagePayload, PlatformChannel, PlatformMessage};
use super::platform::{ChatPlatform, MAX_MESSAGES_PER_PAGE};

/// Audit log reasons are capped by the platform
const MAX_AUDIT_REASON_CHARS: usize = 512;

/// Discord REST client backed by serenity's `Http`
pub struct DiscordClient {
    http: Arc<Http>,
    request_timeout: Duration,
    retry: RetryPolicy,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig, retry: RetryPolicy) -> Self {
        Self {
            http: Arc::new(Http::new(&config.bot_token)),
            request_timeout: config.request_timeout,
            retry,
        }
    }

    /// Await one request under the configured timeout.
    async fn call<T, Fut>(&self, request: Fut) -> Result<T, PlatformError>
    where
        Fut: Future<Output = serenity::Result<T>>,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = PlatformError::from(e);
                tracing::debug!("Platform request failed: {}", err);
                Err(err)
            }
            Err(_) => Err(PlatformError::Timeout),
        }
    }
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn fetch_channel(
        &self,
        channel_id: &str,
    ) -> Result<Option<PlatformChannel>, PlatformError> {
        let Ok(id) = convert::channel_id(channel_id) else {
            return Ok(None);
        };

        let result = retry_with_backoff(&self.retry, "fetch_channel", || {
            self.call(self.http.get_channel(id))
        })
        .await;

        match result {
            Ok(Channel::Guild(channel)) => Ok(Some(convert::channel_from(channel))),
            Ok(_) => Ok(None),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch_guild_channels(
        &self,
        guild_id: &str,
    ) -> Result<Vec<PlatformChannel>, PlatformError> {
        let id = convert::guild_id(guild_id)?;
        let channels = retry_with_backoff(&self.retry, "fetch_guild_channels", || {
            self.call(self.http.get_channels(id))
        })
        .await?;

        Ok(channels.into_iter().map(convert::channel_from).collect())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        before: Option<&str>,
        limit: u8,
    ) -> Result<Vec<PlatformMessage>, PlatformError> {
        let id = convert::channel_id(channel_id)?;
        let mut query = GetMessages::new().limit(limit.clamp(1, MAX_MESSAGES_PER_PAGE));
        if let Some(before) = before {
            query = query.before(convert::message_id(before)?);
        }

        let messages = retry_with_backoff(&self.retry, "fetch_messages", || {
            self.call(id.messages(&self.http, query))
        })
        .await?;

        Ok(messages.into_iter().map(convert::message_from).collect())
    }

    async fn create_channel(
        &self,
        guild_id: &str,
        request: &CreateChannelRequest,
    ) -> Result<PlatformChannel, PlatformError> {
        let id = convert::guild_id(guild_id)?;
        let builder = convert::create_channel_builder(request)?;

        // A timed-out create may still have happened upstream
        let channel = retry_with_backoff_when(
            &self.retry,
            "create_channel",
            PlatformError::is_rate_limited,
            || self.call(id.create_channel(&self.http, builder.clone())),
        )
        .await?;

        Ok(convert::channel_from(channel))
    }

    async fn delete_channel(&self, channel_id: &str, reason: &str) -> Result<(), PlatformError> {
        let id = convert::channel_id(channel_id)?;
        let reason: String = reason.chars().take(MAX_AUDIT_REASON_CHARS).collect();

        retry_with_backoff(&self.retry, "delete_channel", || {
            self.call(self.http.delete_channel(id, Some(reason.as_str())))
        })
        .await
        .map(|_| ())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        payload: &MessagePayload,
    ) -> Result<(), PlatformError> {
        let id = convert::channel_id(channel_id)?;
        let message = convert::message_builder(payload);

        retry_with_backoff_when(
            &self.retry,
            "send_message",
            PlatformError::is_rate_limited,
            || self.call(id.send_message(&self.http, message.clone())),
        )
        .await
        .map(|_| ())
    }
}
