//! Moderation log repository. Append-only.

use sqlx::AnyPool;
use warden_common::{
    models::{ModerationLog, NewModerationLog},
    snowflake::Snowflake,
    time,
};

/// Append a log entry. Target and moderator must already exist in
/// `guild_members` (foreign keys).
pub async fn create(pool: &AnyPool, entry: &NewModerationLog) -> Result<ModerationLog, sqlx::Error> {
    sqlx::query_as::<_, ModerationLog>(
        r#"
        INSERT INTO moderation_logs
            (action, target_id, target_name, moderator_id, moderator_name, reason, timestamp, success, note)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(entry.action.as_str())
    .bind(entry.target_id.to_db())
    .bind(entry.target_name.as_str())
    .bind(entry.moderator_id.to_db())
    .bind(entry.moderator_name.as_str())
    .bind(entry.reason.as_deref().unwrap_or_default())
    .bind(time::to_db(entry.timestamp))
    .bind(entry.success)
    .bind(entry.note.as_deref().unwrap_or_default())
    .fetch_one(pool)
    .await
}

/// Find a log entry by ID.
pub async fn find_by_id(pool: &AnyPool, id: i64) -> Result<Option<ModerationLog>, sqlx::Error> {
    sqlx::query_as::<_, ModerationLog>("SELECT * FROM moderation_logs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Most recent entries first.
pub async fn list_recent(
    pool: &AnyPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ModerationLog>, sqlx::Error> {
    sqlx::query_as::<_, ModerationLog>(
        "SELECT * FROM moderation_logs ORDER BY timestamp DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// History of actions taken against one user, most recent first.
pub async fn list_for_target(
    pool: &AnyPool,
    target_id: Snowflake,
    limit: i64,
) -> Result<Vec<ModerationLog>, sqlx::Error> {
    sqlx::query_as::<_, ModerationLog>(
        r#"
        SELECT * FROM moderation_logs
        WHERE target_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(target_id.to_db())
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Actions taken by one moderator, most recent first.
pub async fn list_by_moderator(
    pool: &AnyPool,
    moderator_id: Snowflake,
    limit: i64,
) -> Result<Vec<ModerationLog>, sqlx::Error> {
    sqlx::query_as::<_, ModerationLog>(
        r#"
        SELECT * FROM moderation_logs
        WHERE moderator_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(moderator_id.to_db())
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count_for_target(pool: &AnyPool, target_id: Snowflake) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM moderation_logs WHERE target_id = ?")
            .bind(target_id.to_db())
            .fetch_one(pool)
            .await?;
    Ok(count)
}
