use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::stats::handlers::stats_handler;
use crate::features::stats::services::StatsService;

/// Create read-only stats routes
pub fn routes(stats_service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/api/stats/activity", get(stats_handler::get_activity_stats))
        .route("/api/stats/guild", get(stats_handler::get_guild_stats))
        .with_state(stats_service)
}
