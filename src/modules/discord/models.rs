use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Guild text channel
pub const CHANNEL_TYPE_TEXT: u8 = 0;
/// Guild category
pub const CHANNEL_TYPE_CATEGORY: u8 = 4;

/// Overwrite target is a role
pub const OVERWRITE_ROLE: u8 = 0;
/// Overwrite target is a member
pub const OVERWRITE_MEMBER: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionOverwrite {
    /// Role or member id
    pub id: String,
    /// `OVERWRITE_ROLE` or `OVERWRITE_MEMBER`
    pub kind: u8,
    /// Permission bits, decimal
    pub allow: String,
    pub deny: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformChannel {
    pub id: String,
    pub kind: u8,
    pub guild_id: Option<String>,
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub rate_limit_per_user: Option<i32>,
    pub position: Option<i32>,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

impl PlatformChannel {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
}

impl MessageAuthor {
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlatformAttachment {
    pub id: String,
    pub filename: String,
    pub url: String,
    /// Bytes
    #[serde(default)]
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMessage {
    pub id: String,
    pub author: MessageAuthor,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub pinned: bool,
    pub attachments: Vec<PlatformAttachment>,
}

/// Settings for a new guild channel
#[derive(Debug, Clone)]
pub struct CreateChannelRequest {
    pub name: String,
    pub kind: u8,
    pub parent_id: Option<String>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub rate_limit_per_user: i32,
    pub position: i32,
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            ..Default::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub style: ButtonStyle,
    pub label: String,
    pub custom_id: String,
}

impl Button {
    pub fn new(style: ButtonStyle, label: impl Into<String>, custom_id: impl Into<String>) -> Self {
        Self {
            style,
            label: label.into(),
            custom_id: custom_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionRow {
    pub components: Vec<Button>,
}

impl ActionRow {
    pub fn new(components: Vec<Button>) -> Self {
        Self { components }
    }
}

/// Outgoing message: plain content, embeds and interactive components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePayload {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub components: Vec<ActionRow>,
}

impl MessagePayload {
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Default::default()
        }
    }
}
