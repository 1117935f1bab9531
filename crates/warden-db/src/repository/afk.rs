//! AFK repository — who is away, why, and since when.

use chrono::{DateTime, Utc};
use sqlx::AnyPool;
use warden_common::{models::AfkStatus, snowflake::Snowflake, time};

/// Mark a user AFK, replacing any previous status.
pub async fn set_afk(
    pool: &AnyPool,
    user_id: Snowflake,
    reason: &str,
    since: DateTime<Utc>,
) -> Result<AfkStatus, sqlx::Error> {
    sqlx::query_as::<_, AfkStatus>(
        r#"
        INSERT INTO afk_statuses (user_id, reason, since)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            reason = excluded.reason,
            since = excluded.since
        RETURNING *
        "#,
    )
    .bind(user_id.to_db())
    .bind(reason)
    .bind(time::to_db(since))
    .fetch_one(pool)
    .await
}

/// Remove a user's AFK status, returning what was removed.
///
/// Delete-and-return happens in one statement, so of two concurrent callers
/// only one sees the status.
pub async fn clear_afk(pool: &AnyPool, user_id: Snowflake) -> Result<Option<AfkStatus>, sqlx::Error> {
    sqlx::query_as::<_, AfkStatus>("DELETE FROM afk_statuses WHERE user_id = ? RETURNING *")
        .bind(user_id.to_db())
        .fetch_optional(pool)
        .await
}

pub async fn find_afk(pool: &AnyPool, user_id: Snowflake) -> Result<Option<AfkStatus>, sqlx::Error> {
    sqlx::query_as::<_, AfkStatus>("SELECT * FROM afk_statuses WHERE user_id = ?")
        .bind(user_id.to_db())
        .fetch_optional(pool)
        .await
}

/// AFK statuses for any of `user_ids`. Unknown IDs are skipped.
pub async fn find_many(
    pool: &AnyPool,
    user_ids: &[Snowflake],
) -> Result<Vec<AfkStatus>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(vec![]);
    }

    let placeholders = vec!["?"; user_ids.len()].join(", ");
    let sql = format!(
        "SELECT * FROM afk_statuses WHERE user_id IN ({placeholders}) ORDER BY since DESC"
    );
    let mut query = sqlx::query_as::<_, AfkStatus>(&sql);
    for id in user_ids {
        query = query.bind(id.to_db());
    }
    query.fetch_all(pool).await
}

/// Everyone currently AFK, most recent first.
pub async fn list_afk(pool: &AnyPool, limit: i64) -> Result<Vec<AfkStatus>, sqlx::Error> {
    sqlx::query_as::<_, AfkStatus>("SELECT * FROM afk_statuses ORDER BY since DESC LIMIT ?")
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn count_afk(pool: &AnyPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM afk_statuses")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::TimeZone;

    fn t(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, min, 0).unwrap()
    }

    #[tokio::test]
    async fn test_set_replaces_existing_status() {
        let db = Database::in_memory().await.unwrap();
        set_afk(&db.pool, Snowflake(1), "lunch", t(0)).await.unwrap();
        let s = set_afk(&db.pool, Snowflake(1), "sleep", t(30)).await.unwrap();
        assert_eq!(s.reason, "sleep");
        assert_eq!(s.since, t(30));
        assert_eq!(count_afk(&db.pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clear_returns_status_exactly_once() {
        let db = Database::in_memory().await.unwrap();
        set_afk(&db.pool, Snowflake(1), "lunch", t(0)).await.unwrap();

        let removed = clear_afk(&db.pool, Snowflake(1)).await.unwrap().unwrap();
        assert_eq!(removed.reason, "lunch");
        assert!(clear_afk(&db.pool, Snowflake(1)).await.unwrap().is_none());
        assert!(find_afk(&db.pool, Snowflake(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_many_and_list_order() {
        let db = Database::in_memory().await.unwrap();
        set_afk(&db.pool, Snowflake(1), "a", t(1)).await.unwrap();
        set_afk(&db.pool, Snowflake(2), "b", t(5)).await.unwrap();
        set_afk(&db.pool, Snowflake(3), "c", t(3)).await.unwrap();

        let some = find_many(&db.pool, &[Snowflake(1), Snowflake(3), Snowflake(9)])
            .await
            .unwrap();
        assert_eq!(
            some.iter().map(|s| s.user_id).collect::<Vec<_>>(),
            vec![Snowflake(3), Snowflake(1)]
        );
        assert!(find_many(&db.pool, &[]).await.unwrap().is_empty());

        let all = list_afk(&db.pool, 2).await.unwrap();
        assert_eq!(
            all.iter().map(|s| s.user_id).collect::<Vec<_>>(),
            vec![Snowflake(2), Snowflake(3)]
        );
    }
}
