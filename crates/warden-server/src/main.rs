//! # Warden Server
//!
//! Main binary for Warden:
//! - `serve` (default) runs migrations and the REST API
//! - `migrate` only runs migrations
//! - `check` prints an integrity report and fails if it finds violations

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::process::ExitCode;
use warden_api::{build_router, AppState};
use warden_common::config::{AppConfig, LoggingConfig};
use warden_db::{repository::integrity, Database};

#[derive(Parser)]
#[command(name = "warden", version, about = "Moderation data store for community guilds")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
    /// Run migrations and serve the REST API
    #[default]
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Report data integrity violations
    Check,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.default_filter().into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = warden_common::config::init()?;

    // Initialize tracing (structured logging)
    init_tracing(&config.logging);

    let db = Database::connect(config).await?;

    match cli.command.unwrap_or_default() {
        Command::Serve => {
            db.migrate().await?;
            serve(db, config).await?;
        }
        Command::Migrate => db.migrate().await?,
        Command::Check => {
            let report = integrity::check(&db.pool).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                tracing::warn!("Integrity violations found");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn serve(db: Database, config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    let router = build_router(AppState::new(db, config));
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
