use axum::{
    routing::{get, post},
    Router,
};

use crate::features::archives::handlers::{archive_handler, ArchivesState};

/// Create archive orchestrator routes
pub fn routes(state: ArchivesState) -> Router {
    Router::new()
        .route(
            "/api/archives",
            post(archive_handler::archive_channel).get(archive_handler::list_archives),
        )
        .route("/api/archives/restore", post(archive_handler::restore_channel))
        .route("/api/archives/forget", post(archive_handler::forget_channel))
        .route(
            "/api/archives/{id}",
            get(archive_handler::get_archive).delete(archive_handler::forget_archive),
        )
        .route(
            "/api/archives/{id}/resources",
            get(archive_handler::list_archive_resources),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ArchiveConfig;
    use crate::features::activity::services::ActivityService;
    use crate::features::archives::services::ArchiveService;
    use crate::features::rescue::services::RescueService;
    use crate::shared::test_helpers::{text_message, FakePlatform, MemoryStore};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    fn server() -> (Arc<FakePlatform>, Arc<MemoryStore>, TestServer) {
        let platform = Arc::new(FakePlatform::new());
        let store = Arc::new(MemoryStore::new());
        let rescue = Arc::new(RescueService::new(platform.clone(), store.clone(), 500));
        let config = ArchiveConfig {
            deletion_delay: Duration::ZERO,
            ..ArchiveConfig::default()
        };
        let state = ArchivesState {
            archive: Arc::new(ArchiveService::new(
                platform.clone(),
                store.clone(),
                rescue.clone(),
                &config,
                None,
            )),
            activity: Arc::new(ActivityService::new(platform.clone(), store.clone(), 30, 7)),
            rescue,
        };
        (platform, store, TestServer::new(routes(state)).unwrap())
    }

    #[tokio::test]
    async fn test_archive_then_read_back() {
        let (platform, _, server) = server();
        platform.add_text_channel("c1", "g1", "old-project");
        platform.push_messages(
            "c1",
            vec![text_message("1", "ada", "https://github.com/serde-rs/serde")],
        );

        let response = server
            .post("/api/archives")
            .json(&json!({"channel_id": "c1"}))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["resource_count"], 1);
        assert_eq!(body["data"]["channel_deleted"], true);
        let id = body["data"]["archived_channel_id"].as_str().unwrap().to_string();

        let detail: Value = server.get(&format!("/api/archives/{}", id)).await.json();
        assert_eq!(detail["data"]["resource_count"], 1);
        assert_eq!(detail["data"]["name"], "old-project");

        let resources: Value = server
            .get(&format!("/api/archives/{}/resources", id))
            .await
            .json();
        assert_eq!(resources["meta"]["total"], 1);
        assert_eq!(resources["data"][0]["resource_type"], "LINK");

        let list: Value = server
            .get("/api/archives")
            .add_query_param("guild_id", "g1")
            .await
            .json();
        assert_eq!(list["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_archive_conflict_and_missing() {
        let (platform, store, server) = server();
        platform.add_text_channel("c1", "g1", "general");
        store.seed_archive("c1", "g1", "general");

        let response = server
            .post("/api/archives")
            .json(&json!({"channel_id": "c1"}))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "ALREADY_ARCHIVED");

        server
            .post("/api/archives")
            .json(&json!({"channel_id": "missing"}))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_restore_ambiguous_lists_candidates() {
        let (_, store, server) = server();
        store.seed_archive("a", "g1", "general");
        store.seed_archive("b", "g1", "general");

        let response = server
            .post("/api/archives/restore")
            .json(&json!({"channel_name": "general", "guild_id": "g1"}))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["errors"][0], "AMBIGUOUS_MATCH");
        assert_eq!(body["errors"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_forget_requires_confirmation() {
        let (_, store, server) = server();
        store.seed_archive("a", "g1", "general");

        server
            .post("/api/archives/forget")
            .json(&json!({
                "guild_id": "g1",
                "channel_name": "general",
                "reason": "user request",
                "requested_by": "mod",
                "confirm": false
            }))
            .await
            .assert_status_bad_request();
        assert_eq!(store.archive_rows().len(), 1);

        server
            .post("/api/archives/forget")
            .json(&json!({
                "guild_id": "g1",
                "channel_name": "general",
                "reason": "user request",
                "requested_by": "mod",
                "confirm": true
            }))
            .await
            .assert_status_ok();
        assert!(store.archive_rows().is_empty());
    }

    #[tokio::test]
    async fn test_forget_by_id() {
        let (_, store, server) = server();
        let archive = store.seed_archive("a", "g1", "general");

        let body: Value = server
            .delete(&format!("/api/archives/{}", archive.id))
            .json(&json!({"reason": "cleanup", "requested_by": "mod"}))
            .await
            .json();

        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["resources_deleted"], 0);
        assert!(store.archive_rows().is_empty());
    }
}
