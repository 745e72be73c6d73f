use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::activity::dtos::*;
use crate::modules::discord::{MessageAuthor, PlatformMessage};
use crate::shared::types::ApiResponse;

use super::ActivityState;

impl From<MessageEventDto> for PlatformMessage {
    fn from(dto: MessageEventDto) -> Self {
        Self {
            id: dto.message_id,
            author: MessageAuthor {
                id: dto.author_id,
                username: dto.author_name,
                global_name: None,
            },
            content: dto.content,
            timestamp: Utc::now(),
            pinned: dto.pinned,
            attachments: dto.attachments,
        }
    }
}

/// Record channel activity and run real-time resource capture
#[utoipa::path(
    post,
    path = "/api/events/messages",
    tag = "Events",
    request_body = MessageEventDto,
    responses(
        (status = 200, description = "Event processed", body = ApiResponse<MessageEventResultDto>),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn message_created(
    State(state): State<ActivityState>,
    AppJson(dto): AppJson<MessageEventDto>,
) -> Result<Json<ApiResponse<MessageEventResultDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let channel_id = dto.channel_id.clone();
    let author_is_bot = dto.author_is_bot;
    let message = PlatformMessage::from(dto);
    let outcome = state
        .events
        .message_created(&channel_id, &message, author_is_bot)
        .await?;

    Ok(Json(ApiResponse::success(Some(outcome.into()), None, None)))
}

/// Handle a button pressed on a warning notice
#[utoipa::path(
    post,
    path = "/api/events/components",
    tag = "Events",
    request_body = ComponentInteractionDto,
    responses(
        (status = 200, description = "Action applied"),
        (status = 400, description = "Unknown component id"),
        (status = 404, description = "Channel not found or not watched")
    ),
    security(("bearer_auth" = []))
)]
pub async fn component_pressed(
    State(state): State<ActivityState>,
    AppJson(dto): AppJson<ComponentInteractionDto>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message = state.events.component_pressed(&dto.custom_id).await?;

    Ok(Json(ApiResponse::success(None, Some(message), None)))
}

/// Forget every watch of a guild the bot was removed from
#[utoipa::path(
    delete,
    path = "/api/guilds/{guild_id}/watches",
    tag = "Events",
    params(
        ("guild_id" = String, Path, description = "Guild the bot left")
    ),
    responses(
        (status = 200, description = "Watches removed", body = ApiResponse<GuildLeftDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn guild_left(
    State(state): State<ActivityState>,
    Path(guild_id): Path<String>,
) -> Result<Json<ApiResponse<GuildLeftDto>>, AppError> {
    let watches_removed = state.events.guild_left(&guild_id).await?;

    Ok(Json(ApiResponse::success(
        Some(GuildLeftDto {
            guild_id,
            watches_removed,
        }),
        None,
        None,
    )))
}

/// Run one inactivity sweep now
#[utoipa::path(
    post,
    path = "/api/sweep",
    tag = "Activity",
    responses(
        (status = 200, description = "Sweep report", body = ApiResponse<SweepReportDto>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn run_sweep(
    State(state): State<ActivityState>,
) -> Result<Json<ApiResponse<SweepReportDto>>, AppError> {
    let report = state.sweeper.sweep().await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}
