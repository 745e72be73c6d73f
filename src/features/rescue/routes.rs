use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::rescue::handlers::rescue_handler;
use crate::features::rescue::services::RescueService;

/// Create resource rescue routes
pub fn routes(rescue_service: Arc<RescueService>) -> Router {
    Router::new()
        .route("/api/rescue/{channel_id}", post(rescue_handler::preview_rescue))
        .route("/api/resources/search", get(rescue_handler::search_resources))
        .with_state(rescue_service)
}
