//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > config.toml > defaults

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use serde::Deserialize;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let cfg = defaults()?
        // Optional config file
        .add_source(config::File::with_name("config").required(false))
        // Environment variables (WARDEN_SERVER__PORT, WARDEN_DATABASE__URL, etc.)
        .add_source(
            config::Environment::with_prefix("WARDEN")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Builder pre-populated with every default value.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "sqlite://data/warden.db?mode=rwc")?
        .set_default("database.max_connections", 5)?
        .set_default("database.min_connections", 1)?
        .set_default("confessions.rate_limit_secs", 300)?
        .set_default("confessions.max_length", 1500)?
        .set_default("moderation.default_reason", "No reason provided")?
        .set_default("logging.debug", false)?
        .set_default("logging.json", false)
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub confessions: ConfessionConfig,
    pub moderation: ModerationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection URL (`sqlite://path?mode=rwc` or `sqlite::memory:`)
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct RedisConfig {
    /// Redis connection URL — optional; omit to keep confession cooldowns in-process.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfessionConfig {
    /// Minimum delay between two confessions from the same user
    pub rate_limit_secs: u64,
    /// Maximum confession length in characters
    pub max_length: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModerationConfig {
    /// Reason recorded when a moderator gives none
    pub default_reason: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub debug: bool,
    /// One JSON object per line instead of human-readable output
    pub json: bool,
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> &'static str {
        if self.debug {
            "warden=debug,tower_http=debug"
        } else {
            "warden=info,tower_http=info"
        }
    }
}
