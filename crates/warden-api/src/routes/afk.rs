//! AFK routes.
//!
//! GET    /afk             — Everyone currently AFK, with the total count
//! POST   /afk/activity    — Process a message (author returns, mentions resolved)
//! GET    /afk/{user_id}   — One user's status
//! PUT    /afk/{user_id}   — Go AFK
//! DELETE /afk/{user_id}   — Clear status

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_common::{
    error::{WardenError, WardenResult},
    models::{AfkActivity, AfkActivityRequest, AfkStatus, SetAfkRequest},
    snowflake::Snowflake,
    time,
    validation::validate_request,
};
use warden_db::{afk, repository};

use crate::{
    extractors::{Json, Path, Query},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/afk", get(list_afk))
        .route("/afk/activity", post(activity))
        .route("/afk/{user_id}", get(get_afk).put(set_afk).delete(clear_afk))
}

#[derive(Deserialize)]
struct ListAfkQuery {
    limit: Option<i64>,
}

#[derive(Serialize)]
struct AfkPage {
    statuses: Vec<AfkStatus>,
    total: i64,
}

async fn list_afk(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAfkQuery>,
) -> WardenResult<Json<AfkPage>> {
    let limit = repository::page_size(query.limit);
    let statuses = repository::afk::list_afk(&state.db.pool, limit).await?;
    let total = repository::afk::count_afk(&state.db.pool).await?;
    Ok(Json(AfkPage { statuses, total }))
}

async fn get_afk(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
) -> WardenResult<Json<AfkStatus>> {
    repository::afk::find_afk(&state.db.pool, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| WardenError::not_found("AFK status"))
}

async fn set_afk(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
    body: Option<Json<SetAfkRequest>>,
) -> WardenResult<Json<AfkStatus>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    validate_request(&body)?;
    let status = afk::go_afk(&state.db.pool, user_id, body.reason.as_deref(), time::now()).await?;
    Ok(Json(status))
}

async fn clear_afk(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
) -> WardenResult<Json<AfkStatus>> {
    repository::afk::clear_afk(&state.db.pool, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| WardenError::not_found("AFK status"))
}

async fn activity(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AfkActivityRequest>,
) -> Json<AfkActivity> {
    Json(afk::on_message(&state.db.pool, body.author_id, &body.mentions, time::now()).await)
}
