use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::activity::handlers::{event_handler, watch_handler};
use crate::features::activity::{dtos as activity_dtos, models as activity_models};
use crate::features::archives::{dtos as archives_dtos, handlers as archives_handlers};
use crate::features::rescue::{
    dtos as rescue_dtos, handlers as rescue_handlers, models as rescue_models,
};
use crate::features::stats::{dtos as stats_dtos, handlers as stats_handlers};
use crate::modules::discord::models::PlatformAttachment;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Activity
        watch_handler::watch_channel,
        watch_handler::unwatch_channel,
        watch_handler::postpone_archive,
        watch_handler::list_watched,
        // Events
        event_handler::message_created,
        event_handler::component_pressed,
        event_handler::run_sweep,
        event_handler::guild_left,
        // Archives
        archives_handlers::archive_handler::archive_channel,
        archives_handlers::archive_handler::restore_channel,
        archives_handlers::archive_handler::forget_channel,
        archives_handlers::archive_handler::forget_archive,
        archives_handlers::archive_handler::list_archives,
        archives_handlers::archive_handler::get_archive,
        archives_handlers::archive_handler::list_archive_resources,
        // Rescue
        rescue_handlers::rescue_handler::preview_rescue,
        rescue_handlers::rescue_handler::search_resources,
        // Stats
        stats_handlers::stats_handler::get_activity_stats,
        stats_handlers::stats_handler::get_guild_stats,
    ),
    components(
        schemas(
            // Shared
            Meta,
            PlatformAttachment,
            // Activity
            activity_models::WarningType,
            activity_dtos::WatchChannelDto,
            activity_dtos::PostponeDto,
            activity_dtos::WatchedChannelDto,
            activity_dtos::ActivityStatsDto,
            activity_dtos::MessageEventDto,
            activity_dtos::MessageEventResultDto,
            activity_dtos::ComponentInteractionDto,
            activity_dtos::SweepReportDto,
            activity_dtos::GuildLeftDto,
            ApiResponse<activity_dtos::WatchedChannelDto>,
            ApiResponse<Vec<activity_dtos::WatchedChannelDto>>,
            ApiResponse<activity_dtos::ActivityStatsDto>,
            ApiResponse<activity_dtos::MessageEventResultDto>,
            ApiResponse<activity_dtos::SweepReportDto>,
            ApiResponse<activity_dtos::GuildLeftDto>,
            // Archives
            archives_dtos::ArchiveChannelDto,
            archives_dtos::RestoreChannelDto,
            archives_dtos::ForgetChannelDto,
            archives_dtos::ForgetByIdDto,
            archives_dtos::ArchivedChannelDto,
            archives_dtos::ArchiveResultDto,
            archives_dtos::RestoreResultDto,
            archives_dtos::ForgetResultDto,
            ApiResponse<archives_dtos::ArchivedChannelDto>,
            ApiResponse<Vec<archives_dtos::ArchivedChannelDto>>,
            ApiResponse<archives_dtos::ArchiveResultDto>,
            ApiResponse<archives_dtos::RestoreResultDto>,
            ApiResponse<archives_dtos::ForgetResultDto>,
            // Rescue
            rescue_models::ResourceType,
            rescue_dtos::ResourceDto,
            rescue_dtos::DetectedResourceDto,
            rescue_dtos::ResourceMatchDto,
            ApiResponse<Vec<rescue_dtos::ResourceDto>>,
            ApiResponse<Vec<rescue_dtos::DetectedResourceDto>>,
            ApiResponse<Vec<rescue_dtos::ResourceMatchDto>>,
            // Stats
            stats_dtos::GuildStatsDto,
            stats_dtos::ResourceTypeCountDto,
            stats_dtos::ChannelResourceCountDto,
            ApiResponse<stats_dtos::GuildStatsDto>,
        )
    ),
    tags(
        (name = "Activity", description = "Watched channels, postponement and inactivity thresholds"),
        (name = "Events", description = "Gateway event ingestion and manual sweeps"),
        (name = "Archives", description = "Archive, restore and forget channels"),
        (name = "Rescue", description = "Resource detection and search"),
        (name = "Stats", description = "Activity and archive statistics"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Archivemind API",
        version = "0.1.0",
        description = "API documentation for Archivemind",
    )
)]
pub struct ApiDoc;

/// Adds the operator bearer token scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
