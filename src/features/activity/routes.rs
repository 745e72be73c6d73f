use axum::{
    routing::{delete, post},
    Router,
};

use crate::features::activity::handlers::{event_handler, watch_handler, ActivityState};

/// Create activity tracker routes
pub fn routes(state: ActivityState) -> Router {
    Router::new()
        // Watches
        .route(
            "/api/watch",
            post(watch_handler::watch_channel).get(watch_handler::list_watched),
        )
        .route("/api/watch/{channel_id}", delete(watch_handler::unwatch_channel))
        .route(
            "/api/watch/{channel_id}/postpone",
            post(watch_handler::postpone_archive),
        )
        // Gateway events
        .route("/api/events/messages", post(event_handler::message_created))
        .route("/api/events/components", post(event_handler::component_pressed))
        .route("/api/guilds/{guild_id}/watches", delete(event_handler::guild_left))
        // Sweep
        .route("/api/sweep", post(event_handler::run_sweep))
        .with_state(state)
}
