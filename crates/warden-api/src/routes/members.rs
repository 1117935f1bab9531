//! Member routes — join/leave lifecycle and profile fields.
//!
//! GET   /members                    — List members (filter, limit, offset)
//! POST  /members                    — Record a join
//! GET   /members/{user_id}          — Get one member
//! PATCH /members/{user_id}          — Update username / nickname
//! POST  /members/{user_id}/leave    — Record a leave
//! GET   /members/{user_id}/modlogs  — Moderation history of a member

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warden_common::{
    error::{WardenError, WardenResult},
    models::{
        GuildMember, JoinRequest, LeaveRequest, ListMembersQuery, ModerationLog,
        UpdateMemberRequest,
    },
    snowflake::Snowflake,
    time,
    validation::{require_storable_time, require_text, validate_request},
};
use warden_db::repository::{self, members, moderation_logs};

use crate::{
    extractors::{Json, Path, Query},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/members", get(list_members).post(join_member))
        .route("/members/{user_id}", get(get_member).patch(update_member))
        .route("/members/{user_id}/leave", post(leave_member))
        .route("/members/{user_id}/modlogs", get(member_modlogs))
}

#[derive(Serialize)]
struct MemberPage {
    members: Vec<GuildMember>,
    total: i64,
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

async fn list_members(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMembersQuery>,
) -> WardenResult<Json<MemberPage>> {
    let limit = repository::page_size(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);
    let members = members::list_members(&state.db.pool, query.filter, limit, offset).await?;
    let total = members::count_members(&state.db.pool, query.filter).await?;
    Ok(Json(MemberPage { members, total }))
}

async fn join_member(
    State(state): State<Arc<AppState>>,
    Json(body): Json<JoinRequest>,
) -> WardenResult<(StatusCode, Json<GuildMember>)> {
    validate_request(&body)?;
    require_text("Username", &body.username)?;

    let nickname = body.nickname.as_deref().filter(|n| !n.is_empty());
    let joined_at = body.joined_at.unwrap_or_else(time::now);
    require_storable_time("joined_at", joined_at)?;
    let member =
        members::record_join(&state.db.pool, body.user_id, &body.username, nickname, joined_at)
            .await?;

    let rejoin = member.first_joined_at != joined_at;
    tracing::info!(user = %member.user_id, rejoin, "Member joined");
    Ok((StatusCode::CREATED, Json(member)))
}

async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
) -> WardenResult<Json<GuildMember>> {
    members::find_member(&state.db.pool, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| WardenError::not_found("Member"))
}

async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
    Json(body): Json<UpdateMemberRequest>,
) -> WardenResult<Json<GuildMember>> {
    validate_request(&body)?;

    let mut member = members::find_member(&state.db.pool, user_id)
        .await?
        .ok_or_else(|| WardenError::not_found("Member"))?;

    if let Some(username) = body.username.as_deref() {
        require_text("Username", username)?;
        if let Some(updated) = members::update_username(&state.db.pool, user_id, username).await? {
            member = updated;
        }
    }
    if let Some(nickname) = body.nickname.as_deref() {
        let nickname = Some(nickname).filter(|n| !n.is_empty());
        if let Some(updated) = members::update_nickname(&state.db.pool, user_id, nickname).await? {
            member = updated;
        }
    }

    Ok(Json(member))
}

async fn leave_member(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
    body: Option<Json<LeaveRequest>>,
) -> WardenResult<Json<GuildMember>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let left_at = body.left_at.unwrap_or_else(time::now);
    let member = members::record_leave(&state.db.pool, user_id, left_at).await?;
    tracing::info!(user = %user_id, "Member left");
    Ok(Json(member))
}

async fn member_modlogs(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Snowflake>,
    Query(query): Query<HistoryQuery>,
) -> WardenResult<Json<Vec<ModerationLog>>> {
    let limit = repository::page_size(query.limit);
    let logs = moderation_logs::list_for_target(&state.db.pool, user_id, limit).await?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support::{app, send};

    #[tokio::test]
    async fn test_join_get_leave_rejoin() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(json!({
                "user_id": "175928847299117063",
                "username": "alice",
                "nickname": "Al",
                "joined_at": "2024-01-01T10:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user_id"], "175928847299117063");
        assert_eq!(body["left_at"], serde_json::Value::Null);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/members/175928847299117063/leave",
            Some(json!({ "left_at": "2024-01-02T10:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["left_at"].is_string());

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(json!({
                "user_id": 175928847299117063u64,
                "username": "alice",
                "joined_at": "2024-01-03T10:00:00Z"
            })),
        )
        .await;
        assert_eq!(body["left_at"], serde_json::Value::Null);

        let (status, body) = send(&app, Method::GET, "/api/v1/members/175928847299117063", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first_joined_at"], "2024-01-01T10:00:00Z");
        assert_eq!(body["last_joined_at"], "2024-01-03T10:00:00Z");
    }

    #[tokio::test]
    async fn test_errors_map_to_status_codes() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/members/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(json!({ "user_id": 1, "username": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        send(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(json!({ "user_id": 1, "username": "bob", "joined_at": "2024-01-05T00:00:00Z" })),
        )
        .await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/members/1/leave",
            Some(json!({ "left_at": "2024-01-04T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_filters_and_patch() {
        let app = app().await;
        for (id, name) in [(1, "a"), (2, "b")] {
            send(
                &app,
                Method::POST,
                "/api/v1/members",
                Some(json!({
                    "user_id": id,
                    "username": name,
                    "nickname": "nick",
                    "joined_at": "2024-02-01T00:00:00Z"
                })),
            )
            .await;
        }
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/members/2/leave",
            Some(json!({ "left_at": "2024-02-02T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/api/v1/members", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["members"][0]["username"], "a");

        let (_, body) = send(&app, Method::GET, "/api/v1/members?filter=all&limit=1&offset=1", None).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["members"][0]["username"], "b");

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/members/1",
            Some(json!({ "username": "alpha", "nickname": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alpha");
        assert_eq!(body["nickname"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_malformed_requests_get_json_errors() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/members/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, body) = send(&app, Method::GET, "/api/v1/members?filter=weird", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/members")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], 400);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_out_of_range_years_are_rejected() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(json!({ "user_id": 1, "username": "a", "joined_at": "+10000-01-01T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        send(
            &app,
            Method::POST,
            "/api/v1/members",
            Some(json!({ "user_id": 1, "username": "a", "joined_at": "2024-01-01T00:00:00Z" })),
        )
        .await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/members/1/leave",
            Some(json!({ "left_at": "+10000-01-01T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}
