//! Translation between serenity's model types and the platform-neutral ones.

use chrono::{DateTime, Utc};
use serenity::all::{
    ChannelId, ChannelType, CreateButton, CreateChannel, CreateEmbed, CreateEmbedFooter,
    CreateMessage, GuildChannel, GuildId, Message, MessageId, PermissionOverwrite as Overwrite,
    PermissionOverwriteType, Permissions, RoleId, Timestamp, UserId,
};
use serenity::builder::CreateActionRow;
use serenity::model::application::ButtonStyle as SerenityButtonStyle;

use super::error::PlatformError;
use super::models::{
    ButtonStyle, CreateChannelRequest, Embed, MessageAuthor, MessagePayload, PermissionOverwrite,
    PlatformAttachment, PlatformChannel, PlatformMessage, OVERWRITE_MEMBER, OVERWRITE_ROLE,
};

/// Parses a snowflake. Zero and non-numeric ids resolve to `NotFound`.
fn snowflake(raw: &str) -> Result<u64, PlatformError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| PlatformError::NotFound(format!("Invalid id: {}", raw)))
}

pub fn channel_id(raw: &str) -> Result<ChannelId, PlatformError> {
    snowflake(raw).map(ChannelId::new)
}

pub fn guild_id(raw: &str) -> Result<GuildId, PlatformError> {
    snowflake(raw).map(GuildId::new)
}

pub fn message_id(raw: &str) -> Result<MessageId, PlatformError> {
    snowflake(raw).map(MessageId::new)
}

fn parse_bits(raw: &str) -> Result<Permissions, PlatformError> {
    raw.parse::<u64>()
        .map(Permissions::from_bits_truncate)
        .map_err(|_| PlatformError::Decode(format!("Invalid permission bits: {}", raw)))
}

/// `None` for overwrite targets other than roles and members
pub fn overwrite_from(overwrite: &Overwrite) -> Option<PermissionOverwrite> {
    let (kind, id) = match overwrite.kind {
        PermissionOverwriteType::Member(user_id) => (OVERWRITE_MEMBER, user_id.to_string()),
        PermissionOverwriteType::Role(role_id) => (OVERWRITE_ROLE, role_id.to_string()),
        _ => return None,
    };

    Some(PermissionOverwrite {
        id,
        kind,
        allow: overwrite.allow.bits().to_string(),
        deny: overwrite.deny.bits().to_string(),
    })
}

pub fn overwrite_to(overwrite: &PermissionOverwrite) -> Result<Overwrite, PlatformError> {
    let target = snowflake(&overwrite.id)?;
    let kind = match overwrite.kind {
        OVERWRITE_MEMBER => PermissionOverwriteType::Member(UserId::new(target)),
        _ => PermissionOverwriteType::Role(RoleId::new(target)),
    };

    Ok(Overwrite {
        allow: parse_bits(&overwrite.allow)?,
        deny: parse_bits(&overwrite.deny)?,
        kind,
    })
}

pub fn channel_from(channel: GuildChannel) -> PlatformChannel {
    PlatformChannel {
        id: channel.id.to_string(),
        kind: u8::from(channel.kind),
        guild_id: Some(channel.guild_id.to_string()),
        parent_id: channel.parent_id.map(|id| id.to_string()),
        topic: channel.topic,
        nsfw: channel.nsfw,
        rate_limit_per_user: channel.rate_limit_per_user.map(|r| i32::from(u16::from(r))),
        position: Some(i32::from(channel.position)),
        permission_overwrites: channel
            .permission_overwrites
            .iter()
            .filter_map(overwrite_from)
            .collect(),
        name: Some(channel.name),
    }
}

fn to_utc(timestamp: Timestamp) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_else(Utc::now)
}

pub fn message_from(message: Message) -> PlatformMessage {
    PlatformMessage {
        id: message.id.to_string(),
        author: MessageAuthor {
            id: message.author.id.to_string(),
            username: message.author.name.clone(),
            global_name: message.author.global_name.clone(),
        },
        timestamp: to_utc(message.timestamp),
        pinned: message.pinned,
        attachments: message
            .attachments
            .iter()
            .map(|a| PlatformAttachment {
                id: a.id.to_string(),
                filename: a.filename.clone(),
                url: a.url.clone(),
                size: a.size as i64,
            })
            .collect(),
        content: message.content,
    }
}

pub fn create_channel_builder(
    request: &CreateChannelRequest,
) -> Result<CreateChannel<'static>, PlatformError> {
    let permissions = request
        .permission_overwrites
        .iter()
        .map(overwrite_to)
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = CreateChannel::new(request.name.clone())
        .kind(ChannelType::from(request.kind))
        .nsfw(request.nsfw)
        .rate_limit_per_user(clamp_u16(request.rate_limit_per_user))
        .position(clamp_u16(request.position))
        .permissions(permissions);

    if let Some(topic) = &request.topic {
        builder = builder.topic(topic.clone());
    }
    if let Some(parent_id) = &request.parent_id {
        builder = builder.category(channel_id(parent_id)?);
    }

    Ok(builder)
}

fn clamp_u16(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}

fn embed_builder(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .title(embed.title.clone())
        .description(embed.description.clone())
        .colour(embed.color);

    for field in &embed.fields {
        builder = builder.field(field.name.clone(), field.value.clone(), field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer.clone()));
    }
    if let Some(at) = embed.timestamp {
        if let Ok(timestamp) = Timestamp::from_unix_timestamp(at.timestamp()) {
            builder = builder.timestamp(timestamp);
        }
    }

    builder
}

pub fn message_builder(payload: &MessagePayload) -> CreateMessage {
    let mut builder = CreateMessage::new();

    if let Some(content) = &payload.content {
        builder = builder.content(content.clone());
    }
    if !payload.embeds.is_empty() {
        builder = builder.embeds(payload.embeds.iter().map(embed_builder).collect());
    }
    if !payload.components.is_empty() {
        let rows = payload
            .components
            .iter()
            .map(|row| {
                CreateActionRow::Buttons(
                    row.components
                        .iter()
                        .map(|button| {
                            let style = match button.style {
                                ButtonStyle::Primary => SerenityButtonStyle::Primary,
                                ButtonStyle::Danger => SerenityButtonStyle::Danger,
                            };
                            CreateButton::new(button.custom_id.clone())
                                .label(button.label.clone())
                                .style(style)
                        })
                        .collect(),
                )
            })
            .collect();
        builder = builder.components(rows);
    }

    builder
}
