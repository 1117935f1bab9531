//! Confession routes.
//!
//! GET    /confessions               — Recent confessions (limit, include_deleted)
//! POST   /confessions               — Submit (rate limited per user)
//! GET    /confessions/{id}          — One confession
//! DELETE /confessions/{id}          — Soft delete
//! PUT    /confessions/{id}/message  — Record the posted message ID

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use warden_common::{
    error::{WardenError, WardenResult},
    models::{
        AttachMessageRequest, Confession, ListConfessionsQuery, SubmitConfessionRequest,
        PREVIEW_LENGTH,
    },
    time,
};
use warden_db::repository::{self, confessions};

use crate::{
    extractors::{Json, Path, Query},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/confessions", get(list_confessions).post(submit_confession))
        .route(
            "/confessions/{id}",
            get(get_confession).delete(delete_confession),
        )
        .route("/confessions/{id}/message", put(attach_message))
}

/// Response to a removal: the row plus a preview suitable for a moderator notice.
#[derive(Serialize)]
struct RemovedConfession {
    confession: Confession,
    preview: String,
}

async fn list_confessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListConfessionsQuery>,
) -> WardenResult<Json<Vec<Confession>>> {
    let limit = repository::page_size(query.limit);
    let rows = confessions::list_recent(&state.db.pool, limit, query.include_deleted).await?;
    Ok(Json(rows))
}

async fn submit_confession(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitConfessionRequest>,
) -> WardenResult<(StatusCode, Json<Confession>)> {
    let confession = state
        .confessions
        .submit(body.user_id, body.category, &body.message, time::now())
        .await?;
    Ok((StatusCode::CREATED, Json(confession)))
}

async fn get_confession(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> WardenResult<Json<Confession>> {
    confessions::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| WardenError::not_found(format!("Confession #{id}")))
}

async fn attach_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<AttachMessageRequest>,
) -> WardenResult<Json<Confession>> {
    let confession = state.confessions.attach_message(id, body.message_id).await?;
    Ok(Json(confession))
}

async fn delete_confession(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> WardenResult<Json<RemovedConfession>> {
    let confession = state.confessions.remove(id).await?;
    let preview = confession.preview(PREVIEW_LENGTH);
    Ok(Json(RemovedConfession {
        confession,
        preview,
    }))
}
