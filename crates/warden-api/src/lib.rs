//! # warden-api
//!
//! REST API layer for Warden. Exposes members, moderation logs, AFK statuses
//! and confessions as JSON under `/api/v1`.

pub mod extractors;
pub mod routes;

use std::{sync::Arc, time::Instant};

use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use warden_common::config::AppConfig;
use warden_db::{confession::ConfessionService, Database};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub confessions: ConfessionService,
    /// Reason recorded for moderation actions submitted without one
    pub default_reason: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let confessions = ConfessionService::from_config(&db, &config.confessions);
        Self {
            db,
            confessions,
            default_reason: config.moderation.default_reason.clone(),
            started_at: Instant::now(),
        }
    }
}

/// Largest accepted request body. Confessions are the biggest payload.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::health::router())
        .merge(routes::members::router())
        .merge(routes::modlogs::router())
        .merge(routes::afk::router())
        .merge(routes::confessions::router());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::compression::CompressionLayer::new())
        .with_state(Arc::new(state))
}
