use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::AppError;
use crate::core::extractor::AppQuery;
use crate::features::rescue::dtos::*;
use crate::features::rescue::services::RescueService;
use crate::modules::persistence::ResourceSearch;
use crate::shared::constants::{DEFAULT_SEARCH_LIMIT, MAX_RESCUE_MESSAGES};
use crate::shared::types::{ApiResponse, Meta};

/// Scan a channel's history and return what would be rescued
#[utoipa::path(
    post,
    path = "/api/rescue/{channel_id}",
    tag = "Rescue",
    params(
        ("channel_id" = String, Path, description = "Platform channel ID"),
        RescueParams
    ),
    responses(
        (status = 200, description = "Detected resources", body = ApiResponse<Vec<DetectedResourceDto>>),
        (status = 400, description = "Invalid limit"),
        (status = 403, description = "History not readable"),
        (status = 404, description = "Channel not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn preview_rescue(
    State(service): State<Arc<RescueService>>,
    Path(channel_id): Path<String>,
    AppQuery(params): AppQuery<RescueParams>,
) -> Result<Json<ApiResponse<Vec<DetectedResourceDto>>>, AppError> {
    if let Some(limit) = params.limit {
        if limit == 0 || limit > MAX_RESCUE_MESSAGES {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_RESCUE_MESSAGES
            )));
        }
    }

    let resources = service.rescue_resources(&channel_id, params.limit).await?;
    let total = resources.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(resources.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

/// Search rescued resources across a guild's archives
#[utoipa::path(
    get,
    path = "/api/resources/search",
    tag = "Rescue",
    params(ResourceSearchParams),
    responses(
        (status = 200, description = "Matching resources, newest first", body = ApiResponse<Vec<ResourceMatchDto>>),
        (status = 400, description = "Query or limit out of range")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_resources(
    State(service): State<Arc<RescueService>>,
    AppQuery(params): AppQuery<ResourceSearchParams>,
) -> Result<Json<ApiResponse<Vec<ResourceMatchDto>>>, AppError> {
    let search = ResourceSearch {
        guild_id: params.guild_id,
        query: params.q,
        resource_type: params.resource_type,
        author_id: params.author_id,
        limit: params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    };

    let matches = service.search_resources(search).await?;
    let total = matches.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(matches.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}
