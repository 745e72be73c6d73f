//! Message payloads posted into channels by the lifecycle operations.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::features::activity::models::WarningType;
use crate::features::rescue::models::{DetectedResource, ResourceKind, ResourceType};
use crate::modules::discord::{ActionRow, Button, ButtonStyle, Embed, MessagePayload};

use super::actions::ComponentAction;

const FOOTER: &str = "Archivemind Bot";
const TOMBSTONE_COLOR: u32 = 0x95a5a6;
const RESTORATION_COLOR: u32 = 0x2ecc71;
const WATCH_HINT: &str = "POST /api/watch to change the threshold";
const RESTORE_HINT: &str = "POST /api/archives/restore";
const SEARCH_HINT: &str = "GET /api/resources/search";
/// Sample resources listed per type in a knowledge-base mirror embed
const MIRROR_SAMPLES: usize = 5;
const PREVIEW_CHARS: usize = 100;

fn warning_color(warning_type: WarningType) -> u32 {
    match warning_type {
        WarningType::SevenDays => 0xf39c12,
        WarningType::ThreeDays => 0xe67e22,
        WarningType::OneDay => 0xe74c3c,
        WarningType::Final => 0x8e44ad,
    }
}

fn warning_message(warning_type: WarningType, days_remaining: i64) -> String {
    match warning_type {
        WarningType::SevenDays => format!(
            "This channel will be archived in **{} days** due to inactivity.",
            days_remaining
        ),
        WarningType::ThreeDays => format!(
            "⚠️ **Warning:** This channel will be archived in **{} days** if no activity is detected.",
            days_remaining
        ),
        WarningType::OneDay => format!(
            "🚨 **Final Notice:** This channel will be archived in **{} day** unless there is activity.",
            days_remaining
        ),
        WarningType::Final => "🚨 **URGENT:** This channel will be archived within the next few hours due to prolonged inactivity.".to_string(),
    }
}

pub fn resource_color(resource_type: ResourceType) -> u32 {
    match resource_type {
        ResourceType::File => 0x3498db,
        ResourceType::Link => 0x2ecc71,
        ResourceType::Code => 0x9b59b6,
        ResourceType::Pin => 0xf1c40f,
        ResourceType::Image => 0xe91e63,
        ResourceType::Document => 0x34495e,
    }
}

pub fn resource_emoji(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::File => "📄",
        ResourceType::Link => "🔗",
        ResourceType::Code => "💻",
        ResourceType::Pin => "📌",
        ResourceType::Image => "🖼️",
        ResourceType::Document => "📋",
    }
}

/// Inactivity warning with postpone and archive-now buttons
pub fn warning_notice(
    channel_id: &str,
    warning_type: WarningType,
    days_remaining: i64,
    postpone_days: i64,
) -> MessagePayload {
    let embed = Embed::new(
        "⚠️ Channel Archive Warning",
        warning_message(warning_type, days_remaining),
        warning_color(warning_type),
    )
    .field(
        "📊 Channel Activity",
        format!(
            "This channel will be archived if no messages are sent within {} days.",
            days_remaining
        ),
        false,
    )
    .field(
        "🔄 How to Prevent Archiving",
        "Simply send a message in this channel to reset the inactivity timer.",
        false,
    )
    .field(
        "📦 What Happens When Archived",
        "Important resources (files, links, code) will be saved to the knowledge base before archiving.",
        false,
    )
    .footer(format!("{} • {}", FOOTER, WATCH_HINT))
    .timestamp(Utc::now());

    let buttons = ActionRow::new(vec![
        Button::new(
            ButtonStyle::Primary,
            format!("Postpone Archive (+{} days)", postpone_days),
            ComponentAction::Postpone(channel_id.to_string()).custom_id(),
        ),
        Button::new(
            ButtonStyle::Danger,
            "Archive Now",
            ComponentAction::ArchiveNow(channel_id.to_string()).custom_id(),
        ),
    ]);

    MessagePayload {
        content: None,
        embeds: vec![embed],
        components: vec![buttons],
    }
}

/// Posted into the source channel right before deletion
pub fn tombstone_notice(resource_count: usize, grace_period_days: Option<i32>) -> MessagePayload {
    let mut embed = Embed::new(
        "📦 Channel Archived",
        "This channel has been archived due to inactivity.",
        TOMBSTONE_COLOR,
    )
    .field(
        "📊 Resources Rescued",
        format!(
            "{} valuable resources have been saved to the knowledge base.",
            resource_count
        ),
        false,
    )
    .field(
        "🔄 Restoration",
        format!(
            "This channel can be restored with `{}` using its archived name.",
            RESTORE_HINT
        ),
        false,
    );

    if let Some(days) = grace_period_days.filter(|d| *d > 0) {
        embed = embed.field(
            "⏳ Grace Period",
            format!("Restore within {} days to pick up where the channel left off.", days),
            false,
        );
    }

    MessagePayload::embed(embed.footer(FOOTER).timestamp(Utc::now()))
}

pub fn restoration_notice(resource_count: i64) -> MessagePayload {
    let embed = Embed::new(
        "🔄 Channel Restored",
        "This channel has been successfully restored from the archive.",
        RESTORATION_COLOR,
    )
    .field(
        "📊 Original Resources",
        format!(
            "{} resources were originally rescued from this channel.",
            resource_count
        ),
        false,
    )
    .field(
        "🔍 Access Resources",
        format!(
            "Search the original resources with `{}?q=...`.",
            SEARCH_HINT
        ),
        false,
    )
    .footer(FOOTER)
    .timestamp(Utc::now());

    MessagePayload::embed(embed)
}

fn preview(resource: &DetectedResource) -> String {
    match &resource.kind {
        ResourceKind::File(a) | ResourceKind::Image(a) | ResourceKind::Document(a) => a.url.clone(),
        ResourceKind::Link { url, .. } => url.clone(),
        ResourceKind::Code { content, .. } | ResourceKind::Pin { content } => {
            let mut text: String = content.chars().take(PREVIEW_CHARS).collect();
            if content.chars().count() > PREVIEW_CHARS {
                text.push_str("...");
            }
            text
        }
    }
}

fn sample_title(resource: &DetectedResource, index: usize) -> String {
    let resource_type = resource.kind.resource_type();
    let label = match &resource.kind {
        ResourceKind::File(a) | ResourceKind::Image(a) | ResourceKind::Document(a) => {
            a.file_name.clone()
        }
        _ => format!("{} {}", resource_type, index + 1),
    };
    format!("{} {}", resource_emoji(resource_type), label)
}

/// One embed per resource type present, in a stable type order.
pub fn knowledge_base_mirror(
    source_channel_id: &str,
    source_channel_name: &str,
    resources: &[DetectedResource],
    archived_at: DateTime<Utc>,
) -> Vec<MessagePayload> {
    let mut by_type: BTreeMap<ResourceType, Vec<&DetectedResource>> = BTreeMap::new();
    for resource in resources {
        by_type
            .entry(resource.kind.resource_type())
            .or_default()
            .push(resource);
    }

    by_type
        .into_iter()
        .map(|(resource_type, group)| {
            let mut embed = Embed::new(
                format!("📚 Resources from #{}", source_channel_name),
                format!("**Type:** {} • **Count:** {}", resource_type, group.len()),
                resource_color(resource_type),
            )
            .field(
                "📍 Source",
                format!("<#{}> (Archived)", source_channel_id),
                true,
            )
            .field(
                "📅 Archived",
                archived_at.format("%Y-%m-%d %H:%M").to_string(),
                true,
            );

            for (index, resource) in group.iter().take(MIRROR_SAMPLES).enumerate() {
                embed = embed.field(
                    sample_title(resource, index),
                    format!(
                        "**Author:** <@{}>\n{}",
                        resource.provenance.author_id,
                        preview(resource)
                    ),
                    false,
                );
            }

            if group.len() > MIRROR_SAMPLES {
                embed = embed.field(
                    "📋 Additional Resources",
                    format!(
                        "... and {} more resources. Search them all with `{}`.",
                        group.len() - MIRROR_SAMPLES,
                        SEARCH_HINT
                    ),
                    false,
                );
            }

            MessagePayload::embed(embed)
        })
        .collect()
}
