mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::activity::services::EventService;
use crate::features::activity::workers::GatewayListener;
use crate::features::activity::{
    routes as activity_routes, ActivityService, ActivityState, InactivitySweeper,
};
use crate::features::archives::{routes as archives_routes, ArchiveService, ArchivesState};
use crate::features::rescue::{routes as rescue_routes, RescueService};
use crate::features::stats::{routes as stats_routes, StatsService};
use crate::modules::discord::{ChatPlatform, DiscordClient};
use crate::modules::persistence::{ArchiveStore, PgArchiveStore};
use crate::shared::retry::RetryPolicy;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Persistence and chat platform adapters
    let store: Arc<dyn ArchiveStore> = Arc::new(PgArchiveStore::new(pool.clone()));
    let retry = RetryPolicy::new(
        config.archive.platform_max_attempts,
        config.archive.platform_retry_base,
    );
    let platform: Arc<dyn ChatPlatform> = Arc::new(DiscordClient::new(&config.discord, retry));
    tracing::info!(
        "Discord client initialized (request timeout: {:?})",
        config.discord.request_timeout
    );

    // Initialize lifecycle services
    let rescue_service = Arc::new(RescueService::new(
        Arc::clone(&platform),
        Arc::clone(&store),
        config.archive.rescue_message_limit,
    ));
    let archive_service = Arc::new(ArchiveService::new(
        Arc::clone(&platform),
        Arc::clone(&store),
        Arc::clone(&rescue_service),
        &config.archive,
        config.discord.knowledge_base_channel_id.clone(),
    ));
    let activity_service = Arc::new(ActivityService::new(
        Arc::clone(&platform),
        Arc::clone(&store),
        config.archive.default_inactivity_days,
        config.archive.default_postpone_days,
    ));
    let event_service = Arc::new(EventService::new(
        Arc::clone(&activity_service),
        Arc::clone(&rescue_service),
        Arc::clone(&archive_service),
    ));
    let stats_service = Arc::new(StatsService::new(
        Arc::clone(&activity_service),
        Arc::clone(&store),
    ));
    tracing::info!("Lifecycle services initialized");

    // Spawn inactivity sweeper worker
    let sweeper = Arc::new(InactivitySweeper::new(
        Arc::clone(&platform),
        Arc::clone(&store),
        Arc::clone(&archive_service),
        config.archive.sweep_interval,
    ));
    let worker = Arc::clone(&sweeper);
    tokio::spawn(async move {
        worker.run().await;
    });
    tracing::info!(
        "Inactivity sweeper spawned (interval: {:?})",
        config.archive.sweep_interval
    );

    // Spawn gateway listener feeding the event service
    if config.discord.gateway_enabled {
        let listener = Arc::new(GatewayListener::new(
            config.discord.bot_token.clone(),
            Arc::clone(&event_service),
        ));
        tokio::spawn(async move {
            listener.run().await;
        });
        tracing::info!("Gateway listener spawned");
    } else {
        tracing::warn!("Gateway listener disabled; events arrive only via /api/events");
    }

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Operator API routes
    let mut api_routes = Router::new()
        .merge(activity_routes(ActivityState {
            activity: Arc::clone(&activity_service),
            events: Arc::clone(&event_service),
            sweeper: Arc::clone(&sweeper),
        }))
        .merge(archives_routes(ArchivesState {
            archive: Arc::clone(&archive_service),
            activity: Arc::clone(&activity_service),
            rescue: Arc::clone(&rescue_service),
        }))
        .merge(rescue_routes(Arc::clone(&rescue_service)))
        .merge(stats_routes(stats_service));

    if let Some(token) = config.app.admin_api_token.clone() {
        tracing::info!("Admin API token required on /api routes");
        api_routes = api_routes.route_layer(axum::middleware::from_fn_with_state(
            Arc::new(token),
            middleware::admin_token_middleware,
        ));
    } else {
        tracing::warn!("ADMIN_API_TOKEN not set; /api routes are unauthenticated");
    }

    // Health check endpoint (no auth required), fails when Postgres is unreachable
    async fn health_check(
        axum::extract::State(pool): axum::extract::State<sqlx::PgPool>,
    ) -> axum::http::StatusCode {
        match database::ping(&pool).await {
            Ok(()) => axum::http::StatusCode::OK,
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                axum::http::StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
    let health_route = Router::new()
        .route("/health", axum::routing::get(health_check))
        .with_state(pool.clone());

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
