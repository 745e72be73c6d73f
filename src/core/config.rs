use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub discord: DiscordConfig,
    pub archive: ArchiveConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Bearer token required on `/api/*` when set
    pub admin_api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Chat platform (Discord) connection settings
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub request_timeout: Duration,
    /// Listen for messages and button presses over the gateway
    pub gateway_enabled: bool,
    /// Channel that receives the knowledge-base mirror of rescued resources
    pub knowledge_base_channel_id: Option<String>,
}

/// Lifecycle tuning for sweeps, rescue and deletion
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub sweep_interval: Duration,
    pub default_inactivity_days: i32,
    pub rescue_message_limit: usize,
    pub deletion_delay: Duration,
    pub default_postpone_days: i64,
    pub platform_max_attempts: u32,
    pub platform_retry_base: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            discord: DiscordConfig::from_env()?,
            archive: ArchiveConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_api_token = env::var("ADMIN_API_TOKEN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            admin_api_token,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl DiscordConfig {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

    pub fn from_env() -> Result<Self, String> {
        let bot_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable is required".to_string())?;

        let request_timeout_secs = env::var("DISCORD_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DISCORD_REQUEST_TIMEOUT_SECS must be a valid number".to_string())?;

        let gateway_enabled = env::var("DISCORD_GATEWAY_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|_| "DISCORD_GATEWAY_ENABLED must be true or false".to_string())?;

        let knowledge_base_channel_id = env::var("KNOWLEDGE_BASE_CHANNEL_ID")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            bot_token,
            request_timeout: Duration::from_secs(request_timeout_secs),
            gateway_enabled,
            knowledge_base_channel_id,
        })
    }
}

impl ArchiveConfig {
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_INACTIVITY_DAYS: i32 = 30;
    const DEFAULT_RESCUE_MESSAGE_LIMIT: usize = 500;
    const DEFAULT_DELETION_DELAY_SECS: u64 = 5;
    const DEFAULT_POSTPONE_DAYS: i64 = 7;
    const DEFAULT_PLATFORM_MAX_ATTEMPTS: u32 = 3;
    const DEFAULT_PLATFORM_RETRY_BASE_MS: u64 = 1000;

    pub fn from_env() -> Result<Self, String> {
        let sweep_interval_secs = env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SWEEP_INTERVAL_SECS must be a valid number".to_string())?;

        let default_inactivity_days = env::var("DEFAULT_INACTIVITY_DAYS")
            .unwrap_or_else(|_| Self::DEFAULT_INACTIVITY_DAYS.to_string())
            .parse::<i32>()
            .map_err(|_| "DEFAULT_INACTIVITY_DAYS must be a valid number".to_string())?;

        if !(1..=365).contains(&default_inactivity_days) {
            return Err("DEFAULT_INACTIVITY_DAYS must be between 1 and 365".to_string());
        }

        let rescue_message_limit = env::var("RESCUE_MESSAGE_LIMIT")
            .unwrap_or_else(|_| Self::DEFAULT_RESCUE_MESSAGE_LIMIT.to_string())
            .parse::<usize>()
            .map_err(|_| "RESCUE_MESSAGE_LIMIT must be a valid number".to_string())?;

        let deletion_delay_secs = env::var("DELETION_DELAY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_DELETION_DELAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DELETION_DELAY_SECS must be a valid number".to_string())?;

        let default_postpone_days = env::var("DEFAULT_POSTPONE_DAYS")
            .unwrap_or_else(|_| Self::DEFAULT_POSTPONE_DAYS.to_string())
            .parse::<i64>()
            .map_err(|_| "DEFAULT_POSTPONE_DAYS must be a valid number".to_string())?;

        let platform_max_attempts = env::var("PLATFORM_MAX_ATTEMPTS")
            .unwrap_or_else(|_| Self::DEFAULT_PLATFORM_MAX_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|_| "PLATFORM_MAX_ATTEMPTS must be a valid number".to_string())?;

        let platform_retry_base_ms = env::var("PLATFORM_RETRY_BASE_MS")
            .unwrap_or_else(|_| Self::DEFAULT_PLATFORM_RETRY_BASE_MS.to_string())
            .parse::<u64>()
            .map_err(|_| "PLATFORM_RETRY_BASE_MS must be a valid number".to_string())?;

        Ok(Self {
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            default_inactivity_days,
            rescue_message_limit,
            deletion_delay: Duration::from_secs(deletion_delay_secs),
            default_postpone_days,
            platform_max_attempts: platform_max_attempts.max(1),
            platform_retry_base: Duration::from_millis(platform_retry_base_ms),
        })
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(Self::DEFAULT_SWEEP_INTERVAL_SECS),
            default_inactivity_days: Self::DEFAULT_INACTIVITY_DAYS,
            rescue_message_limit: Self::DEFAULT_RESCUE_MESSAGE_LIMIT,
            deletion_delay: Duration::from_secs(Self::DEFAULT_DELETION_DELAY_SECS),
            default_postpone_days: Self::DEFAULT_POSTPONE_DAYS,
            platform_max_attempts: Self::DEFAULT_PLATFORM_MAX_ATTEMPTS,
            platform_retry_base: Duration::from_millis(Self::DEFAULT_PLATFORM_RETRY_BASE_MS),
        }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Archivemind API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Channel lifecycle management: inactivity tracking, resource rescue and archives"
                .to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
