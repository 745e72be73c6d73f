use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Classified platform failure, so callers can pick a recovery strategy.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// 404, the channel/message/guild is gone.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 401/403, the bot lacks access or permissions.
    #[error("Missing access: {0}")]
    Forbidden(String),

    /// 429, check `retry_after_ms`.
    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// 5xx platform outage.
    #[error("Platform server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    /// Connection refused, DNS failure, reset.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("Failed to decode platform response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    /// Seconds, possibly fractional
    retry_after: Option<f64>,
}

impl PlatformError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| truncate_body(body));

        match status {
            404 => PlatformError::NotFound(message),
            401 | 403 => PlatformError::Forbidden(message),
            429 => {
                let retry_after_ms = parsed
                    .and_then(|b| b.retry_after)
                    .map(|secs| (secs * 1000.0).ceil() as u64)
                    .unwrap_or(1000);
                PlatformError::RateLimited { retry_after_ms }
            }
            408 => PlatformError::Timeout,
            500..=599 => PlatformError::Server { status, message },
            _ => PlatformError::Unexpected { status, message },
        }
    }

    /// Whether the same request is worth sending again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlatformError::RateLimited { .. }
                | PlatformError::Server { .. }
                | PlatformError::Timeout
                | PlatformError::Network(_)
        )
    }

    /// Whether the platform rejected the call before acting on it.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, PlatformError::RateLimited { .. })
    }

    /// Minimum wait the platform asked for before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            PlatformError::RateLimited { retry_after_ms } => {
                Some(Duration::from_millis(*retry_after_ms))
            }
            _ => None,
        }
    }
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        match err {
            serenity::Error::Http(http_err) => match http_err.status_code() {
                Some(status) => PlatformError::from_status(status.as_u16(), &http_err.to_string()),
                None => PlatformError::Network(http_err.to_string()),
            },
            serenity::Error::Json(e) => PlatformError::Decode(e.to_string()),
            serenity::Error::Model(e) => PlatformError::Unexpected {
                status: 0,
                message: e.to_string(),
            },
            other => PlatformError::Network(other.to_string()),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}
