use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::activity::dtos::*;
use crate::shared::types::{ApiResponse, Meta};

use super::ActivityState;

/// Start watching a channel for inactivity
#[utoipa::path(
    post,
    path = "/api/watch",
    tag = "Activity",
    request_body = WatchChannelDto,
    responses(
        (status = 200, description = "Channel watched", body = ApiResponse<WatchedChannelDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Channel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn watch_channel(
    State(state): State<ActivityState>,
    AppJson(dto): AppJson<WatchChannelDto>,
) -> Result<Json<ApiResponse<WatchedChannelDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let watched = state
        .activity
        .watch(
            &dto.channel_id,
            &dto.guild_id,
            dto.inactivity_days,
            dto.rescue_enabled,
        )
        .await?;

    let message = format!(
        "Now watching channel {} for {} days of inactivity",
        watched.channel_id, watched.inactivity_days
    );
    Ok(Json(ApiResponse::success(
        Some(watched.into()),
        Some(message),
        None,
    )))
}

/// Stop watching a channel
#[utoipa::path(
    delete,
    path = "/api/watch/{channel_id}",
    tag = "Activity",
    params(("channel_id" = String, Path, description = "Platform channel ID")),
    responses(
        (status = 200, description = "Watch deactivated"),
        (status = 404, description = "Channel is not being watched")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unwatch_channel(
    State(state): State<ActivityState>,
    Path(channel_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.activity.unwatch(&channel_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some(format!("Stopped watching channel {}", channel_id)),
        None,
    )))
}

/// Push a channel's archive deadline out
#[utoipa::path(
    post,
    path = "/api/watch/{channel_id}/postpone",
    tag = "Activity",
    params(("channel_id" = String, Path, description = "Platform channel ID")),
    request_body = PostponeDto,
    responses(
        (status = 200, description = "Archive postponed", body = ApiResponse<WatchedChannelDto>),
        (status = 404, description = "Channel is not actively watched")
    ),
    security(("bearer_auth" = []))
)]
pub async fn postpone_archive(
    State(state): State<ActivityState>,
    Path(channel_id): Path<String>,
    AppJson(dto): AppJson<PostponeDto>,
) -> Result<Json<ApiResponse<WatchedChannelDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let watched = state.activity.postpone(&channel_id, dto.days).await?;
    Ok(Json(ApiResponse::success(Some(watched.into()), None, None)))
}

/// List actively watched channels, least recently active first
#[utoipa::path(
    get,
    path = "/api/watch",
    tag = "Activity",
    params(GuildQuery),
    responses(
        (status = 200, description = "Watched channels", body = ApiResponse<Vec<WatchedChannelDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_watched(
    State(state): State<ActivityState>,
    AppQuery(query): AppQuery<GuildQuery>,
) -> Result<Json<ApiResponse<Vec<WatchedChannelDto>>>, AppError> {
    let watched = state.activity.list_watched(query.guild_id.as_deref()).await?;
    let total = watched.len() as i64;
    let items: Vec<WatchedChannelDto> = watched.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}
