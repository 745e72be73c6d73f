use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::archives::dtos::*;
use crate::features::rescue::dtos::ResourceDto;
use crate::modules::persistence::ArchiveFilter;
use crate::shared::types::{ApiResponse, Meta};

use super::ArchivesState;

// ============================================================================
// Archive / Restore
// ============================================================================

/// Archive a channel now: rescue, snapshot, persist, then delete the source
#[utoipa::path(
    post,
    path = "/api/archives",
    tag = "Archives",
    request_body = ArchiveChannelDto,
    responses(
        (status = 200, description = "Channel archived", body = ApiResponse<ArchiveResultDto>),
        (status = 404, description = "Channel not found"),
        (status = 409, description = "Channel already archived"),
        (status = 500, description = "Persistence failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn archive_channel(
    State(state): State<ArchivesState>,
    AppJson(dto): AppJson<ArchiveChannelDto>,
) -> Result<Json<ApiResponse<ArchiveResultDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut options = state.activity.archive_options(&dto.channel_id).await?;
    if let Some(rescue) = dto.rescue_resources {
        options.rescue_resources = rescue;
    }
    if let Some(days) = dto.inactivity_days {
        options.inactivity_days = days;
    }
    options.grace_period_days = dto.grace_period_days;

    let outcome = state
        .archive
        .archive_and_delete(&dto.channel_id, options)
        .await?;
    state.activity.mark_archived(&dto.channel_id).await?;

    let message = match outcome.deletion.error.as_deref() {
        None => "Channel archived".to_string(),
        Some(err) => format!("Channel archived but deletion failed: {}", err),
    };

    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some(message),
        None,
    )))
}

/// Restore the single open archive with the given name
#[utoipa::path(
    post,
    path = "/api/archives/restore",
    tag = "Archives",
    request_body = RestoreChannelDto,
    responses(
        (status = 200, description = "Channel restored", body = ApiResponse<RestoreResultDto>),
        (status = 404, description = "No archived channel with that name"),
        (status = 409, description = "Several archives match the name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn restore_channel(
    State(state): State<ArchivesState>,
    AppJson(dto): AppJson<RestoreChannelDto>,
) -> Result<Json<ApiResponse<RestoreResultDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state
        .archive
        .restore_channel(&dto.channel_name, &dto.guild_id)
        .await?;

    Ok(Json(ApiResponse::success(Some(outcome.into()), None, None)))
}

// ============================================================================
// Forgotten deletion
// ============================================================================

/// Permanently delete an archive by channel name
#[utoipa::path(
    post,
    path = "/api/archives/forget",
    tag = "Archives",
    request_body = ForgetChannelDto,
    responses(
        (status = 200, description = "Archive forgotten", body = ApiResponse<ForgetResultDto>),
        (status = 400, description = "Not confirmed"),
        (status = 404, description = "No archived channel with that name"),
        (status = 409, description = "Several archives match the name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn forget_channel(
    State(state): State<ArchivesState>,
    AppJson(dto): AppJson<ForgetChannelDto>,
) -> Result<Json<ApiResponse<ForgetResultDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if !dto.confirm {
        return Err(AppError::BadRequest(
            "Forgotten deletion is permanent and must be confirmed".to_string(),
        ));
    }

    let report = state
        .archive
        .forget_by_name(&dto.guild_id, &dto.channel_name, &dto.reason, &dto.requested_by)
        .await?;

    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Permanently delete an archive by id
#[utoipa::path(
    delete,
    path = "/api/archives/{id}",
    tag = "Archives",
    params(("id" = Uuid, Path, description = "Archived channel ID")),
    request_body = ForgetByIdDto,
    responses(
        (status = 200, description = "Archive forgotten", body = ApiResponse<ForgetResultDto>),
        (status = 404, description = "Archive not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn forget_archive(
    State(state): State<ArchivesState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ForgetByIdDto>,
) -> Result<Json<ApiResponse<ForgetResultDto>>, AppError> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let counts = state
        .archive
        .perform_forgotten_deletion(id, &dto.reason, &dto.requested_by)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(ForgetResultDto::from_counts(id, None, counts)),
        None,
        None,
    )))
}

// ============================================================================
// Queries
// ============================================================================

/// List archives, newest first
#[utoipa::path(
    get,
    path = "/api/archives",
    tag = "Archives",
    params(ArchiveListParams),
    responses(
        (status = 200, description = "Paginated archives", body = ApiResponse<Vec<ArchivedChannelDto>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_archives(
    State(state): State<ArchivesState>,
    AppQuery(params): AppQuery<ArchiveListParams>,
) -> Result<Json<ApiResponse<Vec<ArchivedChannelDto>>>, AppError> {
    let filter = ArchiveFilter {
        guild_id: params.guild_id.clone(),
        include_restored: params.include_restored,
        limit: params.limit(),
        offset: params.offset(),
    };
    let (archives, total) = state.archive.list_archives(&filter).await?;

    Ok(Json(ApiResponse::success(
        Some(archives.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}

/// Get one archive with its resource count
#[utoipa::path(
    get,
    path = "/api/archives/{id}",
    tag = "Archives",
    params(("id" = Uuid, Path, description = "Archived channel ID")),
    responses(
        (status = 200, description = "Archive detail", body = ApiResponse<ArchivedChannelDto>),
        (status = 404, description = "Archive not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_archive(
    State(state): State<ArchivesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ArchivedChannelDto>>, AppError> {
    let (archive, count) = state.archive.get_archive(id).await?;
    let mut dto = ArchivedChannelDto::from(archive);
    dto.resource_count = Some(count);
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// List resources rescued for an archive
#[utoipa::path(
    get,
    path = "/api/archives/{id}/resources",
    tag = "Archives",
    params(("id" = Uuid, Path, description = "Archived channel ID")),
    responses(
        (status = 200, description = "Rescued resources", body = ApiResponse<Vec<ResourceDto>>),
        (status = 404, description = "Archive not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_archive_resources(
    State(state): State<ArchivesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ResourceDto>>>, AppError> {
    // 404 for unknown archives rather than an empty list
    state.archive.get_archive(id).await?;

    let resources = state.rescue.list_resources(id).await?;
    let total = resources.len() as i64;

    Ok(Json(ApiResponse::success(
        Some(resources.into_iter().map(Into::into).collect()),
        None,
        Some(Meta { total }),
    )))
}
