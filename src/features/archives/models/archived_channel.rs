use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::modules::discord::PermissionOverwrite;

/// Immutable metadata snapshot of a deleted channel.
///
/// Only `restored` / `restored_at` change after creation. The row id is the
/// durable handle rescued resources hang off, so it survives restoration.
#[derive(Debug, Clone, FromRow)]
pub struct ArchivedChannel {
    pub id: Uuid,
    pub original_id: String,
    pub name: String,
    pub category: Option<String>,
    pub guild_id: String,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub rate_limit: i32,
    pub position: i32,
    pub permission_snapshot: Json<Vec<PermissionOverwrite>>,
    pub archived_at: DateTime<Utc>,
    pub restored: bool,
    pub restored_at: Option<DateTime<Utc>>,
}

/// Data for creating a new archive snapshot
#[derive(Debug, Clone)]
pub struct CreateArchivedChannel {
    pub original_id: String,
    pub name: String,
    pub category: Option<String>,
    pub guild_id: String,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub rate_limit: i32,
    pub position: i32,
    pub permission_snapshot: Vec<PermissionOverwrite>,
}

/// Row counts removed by a forgotten deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForgetCounts {
    pub resources: u64,
    pub warnings: u64,
    pub archives: u64,
}
