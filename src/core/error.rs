use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::modules::discord::PlatformError;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already archived: {0}")]
    AlreadyArchived(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailure(String),

    #[error("Ambiguous match: {message}")]
    AmbiguousMatch {
        message: String,
        candidates: Vec<String>,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    /// Stable machine-readable code surfaced to callers alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) | AppError::Persistence(_) => "PERSISTENCE_FAILURE",
            AppError::NotFound(_) => "CHANNEL_NOT_FOUND",
            AppError::AlreadyArchived(_) => "ALREADY_ARCHIVED",
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
            AppError::RateLimited(_) => "RATE_LIMITED",
            AppError::ExtractionFailure(_) => "EXTRACTION_FAILED",
            AppError::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::ExternalServiceError(_) => "PLATFORM_ERROR",
        }
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::NotFound(msg) => AppError::NotFound(msg),
            PlatformError::Forbidden(msg) => AppError::PermissionDenied(msg),
            PlatformError::RateLimited { retry_after_ms } => AppError::RateLimited(format!(
                "Platform rate limit still active after retries (retry after {}ms)",
                retry_after_ms
            )),
            other => AppError::ExternalServiceError(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code().to_string();
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    vec![code],
                )
            }
            AppError::Persistence(ref msg) => {
                tracing::error!("Persistence failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), vec![code])
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), vec![code]),
            AppError::AlreadyArchived(ref msg) => (StatusCode::CONFLICT, msg.clone(), vec![code]),
            AppError::PermissionDenied(ref msg) => {
                (StatusCode::FORBIDDEN, msg.clone(), vec![code])
            }
            AppError::RateLimited(ref msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg.clone(), vec![code])
            }
            AppError::ExtractionFailure(ref msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone(), vec![code])
            }
            AppError::AmbiguousMatch {
                ref message,
                ref candidates,
            } => {
                let mut errors = vec![code];
                errors.extend(candidates.iter().cloned());
                (StatusCode::CONFLICT, message.clone(), errors)
            }
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), vec![code, msg.clone()])
            }
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), vec![code]),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), vec![code]),
            AppError::ExternalServiceError(ref msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), vec![code])
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), Some(errors)));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
