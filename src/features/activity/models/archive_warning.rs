use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Warning threshold enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "warning_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningType {
    SevenDays,
    ThreeDays,
    OneDay,
    Final,
}

impl WarningType {
    /// Thresholds ordered nearest first
    pub const NEAREST_FIRST: [WarningType; 4] = [
        WarningType::Final,
        WarningType::OneDay,
        WarningType::ThreeDays,
        WarningType::SevenDays,
    ];

    /// Days before archive at which this warning becomes due
    pub fn threshold_days(self) -> f64 {
        match self {
            WarningType::SevenDays => 7.0,
            WarningType::ThreeDays => 3.0,
            WarningType::OneDay => 1.0,
            WarningType::Final => 0.5,
        }
    }
}

impl std::fmt::Display for WarningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningType::SevenDays => write!(f, "SEVEN_DAYS"),
            WarningType::ThreeDays => write!(f, "THREE_DAYS"),
            WarningType::OneDay => write!(f, "ONE_DAY"),
            WarningType::Final => write!(f, "FINAL"),
        }
    }
}

/// Database model for a sent inactivity warning
#[derive(Debug, Clone, FromRow)]
pub struct ArchiveWarning {
    pub id: Uuid,
    pub channel_id: String,
    pub warning_type: WarningType,
    pub sent_at: DateTime<Utc>,
}
