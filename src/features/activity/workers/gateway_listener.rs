use async_trait::async_trait;
use serenity::all::{
    ComponentInteraction, Context, EditInteractionResponse, EventHandler, GatewayIntents, Guild,
    Interaction, Message, Ready, UnavailableGuild,
};
use serenity::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::Result;
use crate::features::activity::services::EventService;
use crate::modules::discord::convert;

const INITIAL_BACKOFF: Duration = Duration::from_secs(5);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
/// A session that lasted this long resets the backoff
const STABLE_SESSION: Duration = Duration::from_secs(60);

/// Gateway connection feeding messages, button presses and guild removals
/// into the `EventService`.
pub struct GatewayListener {
    bot_token: String,
    events: Arc<EventService>,
}

impl GatewayListener {
    pub fn new(bot_token: String, events: Arc<EventService>) -> Self {
        Self { bot_token, events }
    }

    /// Keep a gateway session open, reconnecting with exponential backoff.
    pub async fn run(self: Arc<Self>) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            tracing::info!("Connecting to the chat gateway");
            let started = tokio::time::Instant::now();
            self.connect().await;
            let ran_for = started.elapsed();

            backoff = next_backoff(backoff, ran_for);
            tracing::warn!(
                "Gateway session ended after {}s, reconnecting in {}s",
                ran_for.as_secs(),
                backoff.as_secs()
            );
            tokio::time::sleep(backoff).await;
        }
    }

    async fn connect(&self) {
        let intents =
            GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

        let handler = GatewayHandler {
            events: self.events.clone(),
        };

        let mut client = match Client::builder(&self.bot_token, intents)
            .event_handler(handler)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to create gateway client: {}", e);
                return;
            }
        };

        if let Err(e) = client.start().await {
            tracing::error!("Gateway client error: {}", e);
        }
    }
}

/// Wait before the next connect attempt: doubled after a short session,
/// reset after a stable one, capped at `MAX_BACKOFF`.
fn next_backoff(current: Duration, ran_for: Duration) -> Duration {
    if ran_for >= STABLE_SESSION {
        INITIAL_BACKOFF
    } else {
        (current * 2).min(MAX_BACKOFF)
    }
}

fn interaction_reply(result: Result<String>) -> String {
    match result {
        Ok(message) => message,
        Err(e) => format!("Could not apply this action: {}", e),
    }
}

struct GatewayHandler {
    events: Arc<EventService>,
}

impl GatewayHandler {
    async fn handle_component(&self, ctx: &Context, interaction: &ComponentInteraction) {
        // Archiving can outlast the acknowledgement window
        if let Err(e) = interaction.defer_ephemeral(&ctx.http).await {
            tracing::warn!("Failed to acknowledge interaction: {}", e);
            return;
        }

        let custom_id = &interaction.data.custom_id;
        let result = self.events.component_pressed(custom_id).await;
        if let Err(e) = &result {
            tracing::warn!("Component {} failed: {}", custom_id, e);
        }

        let reply = EditInteractionResponse::new().content(interaction_reply(result));
        if let Err(e) = interaction.edit_response(&ctx.http, reply).await {
            tracing::warn!("Failed to answer interaction {}: {}", custom_id, e);
        }
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(
            "Gateway ready as {} in {} guilds",
            ready.user.name,
            ready.guilds.len()
        );
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        // Direct messages have no watch to refresh
        if msg.guild_id.is_none() {
            return;
        }

        let channel_id = msg.channel_id.to_string();
        let author_is_bot = msg.author.bot;
        let message = convert::message_from(msg);

        match self
            .events
            .message_created(&channel_id, &message, author_is_bot)
            .await
        {
            Ok(outcome) if !outcome.detected.is_empty() => {
                tracing::debug!(
                    "Captured {} resources from message {} in {}",
                    outcome.detected.len(),
                    message.id,
                    channel_id
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to record activity for {}: {}", channel_id, e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            self.handle_component(&ctx, &component).await;
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        // An outage, not a removal
        if incomplete.unavailable {
            return;
        }

        let guild_id = incomplete.id.to_string();
        if let Err(e) = self.events.guild_left(&guild_id).await {
            tracing::error!("Failed to forget guild {}: {}", guild_id, e);
        }
    }
}
