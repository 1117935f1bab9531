//! # warden-db
//!
//! Database layer for Warden. Manages:
//! - **SQLite** (through `sqlx::AnyPool`) — members, moderation logs, AFK statuses, confessions
//! - **Redis** (optional) — confession cooldowns shared across processes
//!
//! Query functions live in [`repository`]; the small amount of domain logic
//! that decides what gets written lives in [`moderation`], [`afk`] and
//! [`confession`].

pub mod afk;
pub mod confession;
pub mod cooldown;
pub mod moderation;
pub mod redis_pool;
pub mod repository;

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use sqlx::{any::AnyPoolOptions, AnyPool};
use warden_common::config::AppConfig;

use crate::cooldown::{CooldownStore, MemoryCooldown, RedisCooldown};

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pool: AnyPool,
    pub redis: Option<redis::aio::ConnectionManager>,
}

impl Database {
    /// Connect to all configured backends.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        ensure_sqlite_parent_dir(&config.database.url)?;

        tracing::info!(url = %config.database.url, "Opening database");
        let pool = AnyPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await
            .with_context(|| format!("Failed to open database {}", config.database.url))?;
        tracing::info!("Database connection established");

        let redis = match config.redis.url.as_deref() {
            Some(url) => {
                tracing::info!("Connecting to Redis...");
                let client = redis::Client::open(url)?;
                let manager = redis::aio::ConnectionManager::new(client).await?;
                tracing::info!("Connected to Redis");
                Some(manager)
            }
            None => None,
        };

        Ok(Self { pool, redis })
    }

    /// Fresh, migrated in-memory database. Each call is fully isolated.
    ///
    /// An in-memory SQLite database lives and dies with its connection, so the
    /// pool is pinned to exactly one connection that never expires.
    pub async fn in_memory() -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool, redis: None };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Health check — verify the database is reachable.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Cooldown store backing confession rate limits: Redis when configured,
    /// otherwise process-local.
    pub fn cooldown_store(&self) -> Arc<dyn CooldownStore> {
        match &self.redis {
            Some(conn) => Arc::new(RedisCooldown::new(conn.clone())),
            None => Arc::new(MemoryCooldown::new()),
        }
    }
}

/// SQLite creates the database file on demand (`mode=rwc`) but not its directory.
fn ensure_sqlite_parent_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
