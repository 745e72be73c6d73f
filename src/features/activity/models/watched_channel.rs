use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a channel under inactivity monitoring
#[derive(Debug, Clone, FromRow)]
pub struct WatchedChannel {
    pub id: Uuid,
    pub channel_id: String,
    pub guild_id: String,
    pub inactivity_days: i32,
    pub rescue_enabled: bool,
    pub last_activity: DateTime<Utc>,
    pub watched_since: DateTime<Utc>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl WatchedChannel {
    /// Fractional days since the last qualifying activity
    pub fn days_inactive(&self, now: DateTime<Utc>) -> f64 {
        (now - self.last_activity).num_milliseconds() as f64 / MILLIS_PER_DAY
    }
}

/// Data for creating or refreshing a watch
#[derive(Debug, Clone)]
pub struct WatchChannel {
    pub channel_id: String,
    pub guild_id: String,
    pub inactivity_days: i32,
    pub rescue_enabled: bool,
}

pub(crate) const MILLIS_PER_DAY: f64 = 86_400_000.0;
