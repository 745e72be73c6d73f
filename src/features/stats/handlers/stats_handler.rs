use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::activity::dtos::ActivityStatsDto;
use crate::features::stats::dtos::*;
use crate::features::stats::services::StatsService;
use crate::shared::types::ApiResponse;

/// Activity breakdown of a guild's watched channels
#[utoipa::path(
    get,
    path = "/api/stats/activity",
    tag = "Stats",
    params(GuildStatsParams),
    responses(
        (status = 200, description = "Activity stats", body = ApiResponse<ActivityStatsDto>),
        (status = 400, description = "Missing guild id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_activity_stats(
    State(service): State<Arc<StatsService>>,
    AppQuery(params): AppQuery<GuildStatsParams>,
) -> Result<Json<ApiResponse<ActivityStatsDto>>, AppError> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let stats = service.activity_stats(&params.guild_id).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Archive and resource counts for a guild
#[utoipa::path(
    get,
    path = "/api/stats/guild",
    tag = "Stats",
    params(GuildStatsParams),
    responses(
        (status = 200, description = "Guild stats", body = ApiResponse<GuildStatsDto>),
        (status = 400, description = "Missing guild id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_guild_stats(
    State(service): State<Arc<StatsService>>,
    AppQuery(params): AppQuery<GuildStatsParams>,
) -> Result<Json<ApiResponse<GuildStatsDto>>, AppError> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let stats = service.guild_stats(&params.guild_id).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
