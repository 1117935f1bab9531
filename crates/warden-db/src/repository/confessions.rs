//! Confession repository. Rows are soft-deleted, never removed.

use chrono::{DateTime, Utc};
use sqlx::AnyPool;
use warden_common::{
    error::{WardenError, WardenResult},
    models::{Confession, ConfessionCategory},
    snowflake::Snowflake,
    time,
};

/// Store a new confession. It starts without a message ID and not deleted.
pub async fn create(
    pool: &AnyPool,
    content: &str,
    category: ConfessionCategory,
    timestamp: DateTime<Utc>,
) -> Result<Confession, sqlx::Error> {
    sqlx::query_as::<_, Confession>(
        r#"
        INSERT INTO confessions (content, category, timestamp, message_id, deleted)
        VALUES (?, ?, ?, NULL, 0)
        RETURNING *
        "#,
    )
    .bind(content)
    .bind(category.as_str())
    .bind(time::to_db(timestamp))
    .fetch_one(pool)
    .await
}

/// Remember which message a confession was posted as.
pub async fn attach_message(
    pool: &AnyPool,
    id: i64,
    message_id: Snowflake,
) -> Result<Option<Confession>, sqlx::Error> {
    sqlx::query_as::<_, Confession>(
        "UPDATE confessions SET message_id = ? WHERE id = ? RETURNING *",
    )
    .bind(message_id.to_db())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Soft-delete a confession. Deleting twice is not an error.
pub async fn mark_deleted(pool: &AnyPool, id: i64) -> WardenResult<Confession> {
    sqlx::query_as::<_, Confession>("UPDATE confessions SET deleted = 1 WHERE id = ? RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| WardenError::not_found(format!("Confession #{id}")))
}

pub async fn find_by_id(pool: &AnyPool, id: i64) -> Result<Option<Confession>, sqlx::Error> {
    sqlx::query_as::<_, Confession>("SELECT * FROM confessions WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Most recent confessions first.
pub async fn list_recent(
    pool: &AnyPool,
    limit: i64,
    include_deleted: bool,
) -> Result<Vec<Confession>, sqlx::Error> {
    let sql = if include_deleted {
        "SELECT * FROM confessions ORDER BY timestamp DESC, id DESC LIMIT ?"
    } else {
        "SELECT * FROM confessions WHERE deleted = 0 ORDER BY timestamp DESC, id DESC LIMIT ?"
    };
    sqlx::query_as::<_, Confession>(sql)
        .bind(limit)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::TimeZone;

    fn t(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let db = Database::in_memory().await.unwrap();
        let c = create(&db.pool, "I like pineapple pizza", ConfessionCategory::Secret, t(0))
            .await
            .unwrap();
        assert!(c.id > 0);
        assert!(!c.deleted);
        assert!(c.message_id.is_none());
        assert_eq!(c.category, ConfessionCategory::Secret);
    }

    #[tokio::test]
    async fn test_attach_and_soft_delete() {
        let db = Database::in_memory().await.unwrap();
        let c = create(&db.pool, "hi", ConfessionCategory::Other, t(0)).await.unwrap();

        let c = attach_message(&db.pool, c.id, Snowflake(777)).await.unwrap().unwrap();
        assert_eq!(c.message_id, Some(Snowflake(777)));

        let c = mark_deleted(&db.pool, c.id).await.unwrap();
        assert!(c.deleted);
        // row is kept
        assert!(find_by_id(&db.pool, c.id).await.unwrap().unwrap().deleted);
        // idempotent
        assert!(mark_deleted(&db.pool, c.id).await.unwrap().deleted);
    }

    #[tokio::test]
    async fn test_missing_rows() {
        let db = Database::in_memory().await.unwrap();
        assert!(attach_message(&db.pool, 5, Snowflake(1)).await.unwrap().is_none());
        let err = mark_deleted(&db.pool, 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Confession #5 not found");
    }

    #[tokio::test]
    async fn test_list_recent_hides_deleted_by_default() {
        let db = Database::in_memory().await.unwrap();
        let a = create(&db.pool, "a", ConfessionCategory::Love, t(1)).await.unwrap();
        create(&db.pool, "b", ConfessionCategory::Rant, t(2)).await.unwrap();
        mark_deleted(&db.pool, a.id).await.unwrap();

        let visible = list_recent(&db.pool, 10, false).await.unwrap();
        assert_eq!(visible.iter().map(|c| c.content.as_str()).collect::<Vec<_>>(), vec!["b"]);

        let all = list_recent(&db.pool, 10, true).await.unwrap();
        assert_eq!(
            all.iter().map(|c| c.content.as_str()).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
    }
}
