//! Moderation log routes.
//!
//! GET  /modlogs       — Most recent entries (limit, offset)
//! POST /modlogs       — Log an action
//! GET  /modlogs/{id}  — One entry

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;
use warden_common::{
    error::{WardenError, WardenResult},
    models::{CreateModerationLogRequest, ListLogsQuery, ModerationLog},
    validation::{require_storable_time, require_text, validate_request},
};
use warden_db::{
    moderation::{self, ModLogResult},
    repository::{self, moderation_logs},
};

use crate::{
    extractors::{Json, Path, Query},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/modlogs", get(list_logs).post(create_log))
        .route("/modlogs/{id}", get(get_log))
}

async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLogsQuery>,
) -> WardenResult<Json<Vec<ModerationLog>>> {
    let limit = repository::page_size(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);
    let logs = moderation_logs::list_recent(&state.db.pool, limit, offset).await?;
    Ok(Json(logs))
}

/// Always answers with the rendered report. A storage failure is reported
/// in the body (`db_ok: false`) with a 500 status.
async fn create_log(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateModerationLogRequest>,
) -> WardenResult<(StatusCode, Json<ModLogResult>)> {
    validate_request(&body)?;
    require_text("Target name", &body.target_name)?;
    require_text("Moderator name", &body.moderator_name)?;
    if let Some(ts) = body.timestamp {
        require_storable_time("timestamp", ts)?;
    }

    let result = moderation::log_moderation_action(&state.db.pool, &state.default_reason, body).await;
    let status = if result.db_ok {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result)))
}

async fn get_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> WardenResult<Json<ModerationLog>> {
    moderation_logs::find_by_id(&state.db.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| WardenError::not_found(format!("Moderation log #{id}")))
}
