//! Member repository — join/leave lifecycle of guild members.

use chrono::{DateTime, Utc};
use sqlx::AnyPool;
use warden_common::{
    error::{WardenError, WardenResult},
    models::{GuildMember, MemberFilter},
    snowflake::Snowflake,
    time, validation,
};

fn filter_clause(filter: MemberFilter) -> &'static str {
    match filter {
        MemberFilter::Active => "WHERE left_at IS NULL",
        MemberFilter::Departed => "WHERE left_at IS NOT NULL",
        MemberFilter::All => "",
    }
}

/// Record a join. The first join creates the row; a rejoin refreshes the
/// names, moves `last_joined_at` forward and clears `left_at`.
/// `first_joined_at` is never touched after the insert.
pub async fn record_join(
    pool: &AnyPool,
    user_id: Snowflake,
    username: &str,
    nickname: Option<&str>,
    joined_at: DateTime<Utc>,
) -> Result<GuildMember, sqlx::Error> {
    let ts = time::to_db(joined_at);
    sqlx::query_as::<_, GuildMember>(
        r#"
        INSERT INTO guild_members (user_id, username, nickname, first_joined_at, last_joined_at, left_at)
        VALUES (?, ?, ?, ?, ?, NULL)
        ON CONFLICT (user_id) DO UPDATE SET
            username = excluded.username,
            nickname = excluded.nickname,
            last_joined_at = excluded.last_joined_at,
            left_at = NULL
        RETURNING *
        "#,
    )
    .bind(user_id.to_db())
    .bind(username)
    .bind(nickname)
    .bind(ts.clone())
    .bind(ts)
    .fetch_one(pool)
    .await
}

/// Record that a member left.
///
/// Fails with `NotFound` for an unknown user and with `Validation` when the
/// member already left or `left_at` is not strictly after `last_joined_at`.
pub async fn record_leave(
    pool: &AnyPool,
    user_id: Snowflake,
    left_at: DateTime<Utc>,
) -> WardenResult<GuildMember> {
    let member = find_member(pool, user_id)
        .await?
        .ok_or_else(|| WardenError::not_found("Member"))?;

    validation::require_storable_time("left_at", left_at)?;
    if !member.is_active() {
        return Err(WardenError::validation(format!(
            "Member {user_id} has already left"
        )));
    }
    if left_at <= member.last_joined_at {
        return Err(WardenError::validation(
            "left_at must be later than last_joined_at",
        ));
    }

    let updated = sqlx::query_as::<_, GuildMember>(
        "UPDATE guild_members SET left_at = ? WHERE user_id = ? AND left_at IS NULL RETURNING *",
    )
    .bind(time::to_db(left_at))
    .bind(user_id.to_db())
    .fetch_optional(pool)
    .await?;

    // Lost a race with a concurrent leave.
    updated.ok_or_else(|| WardenError::validation(format!("Member {user_id} has already left")))
}

/// Get a member by user ID.
pub async fn find_member(
    pool: &AnyPool,
    user_id: Snowflake,
) -> Result<Option<GuildMember>, sqlx::Error> {
    sqlx::query_as::<_, GuildMember>("SELECT * FROM guild_members WHERE user_id = ?")
        .bind(user_id.to_db())
        .fetch_optional(pool)
        .await
}

/// List members with pagination, oldest first.
pub async fn list_members(
    pool: &AnyPool,
    filter: MemberFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<GuildMember>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM guild_members {} ORDER BY first_joined_at, user_id LIMIT ? OFFSET ?",
        filter_clause(filter)
    );
    sqlx::query_as::<_, GuildMember>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Count members matching a filter.
pub async fn count_members(pool: &AnyPool, filter: MemberFilter) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM guild_members {}", filter_clause(filter));
    let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(pool).await?;
    Ok(count)
}

/// Update member nickname. `None` clears it.
pub async fn update_nickname(
    pool: &AnyPool,
    user_id: Snowflake,
    nickname: Option<&str>,
) -> Result<Option<GuildMember>, sqlx::Error> {
    sqlx::query_as::<_, GuildMember>(
        "UPDATE guild_members SET nickname = ? WHERE user_id = ? RETURNING *",
    )
    .bind(nickname)
    .bind(user_id.to_db())
    .fetch_optional(pool)
    .await
}

/// Update the stored username.
pub async fn update_username(
    pool: &AnyPool,
    user_id: Snowflake,
    username: &str,
) -> Result<Option<GuildMember>, sqlx::Error> {
    sqlx::query_as::<_, GuildMember>(
        "UPDATE guild_members SET username = ? WHERE user_id = ? RETURNING *",
    )
    .bind(username)
    .bind(user_id.to_db())
    .fetch_optional(pool)
    .await
}

/// Insert a minimal member row if the user is unknown. Existing rows are left
/// untouched. Returns whether a row was created.
pub async fn ensure_member(
    pool: &AnyPool,
    user_id: Snowflake,
    username: &str,
    seen_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let ts = time::to_db(seen_at);
    let result = sqlx::query(
        r#"
        INSERT INTO guild_members (user_id, username, nickname, first_joined_at, last_joined_at, left_at)
        VALUES (?, ?, NULL, ?, ?, NULL)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id.to_db())
    .bind(username)
    .bind(ts.clone())
    .bind(ts)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::TimeZone;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_first_join_sets_both_timestamps() {
        let db = Database::in_memory().await.unwrap();
        let m = record_join(&db.pool, Snowflake(10), "alice", Some("Al"), t(1))
            .await
            .unwrap();
        assert_eq!(m.user_id, Snowflake(10));
        assert_eq!(m.nickname.as_deref(), Some("Al"));
        assert_eq!(m.first_joined_at, t(1));
        assert_eq!(m.last_joined_at, t(1));
        assert!(m.is_active());
    }

    #[tokio::test]
    async fn test_rejoin_preserves_first_join_and_clears_left_at() {
        let db = Database::in_memory().await.unwrap();
        record_join(&db.pool, Snowflake(10), "alice", None, t(1)).await.unwrap();
        let left = record_leave(&db.pool, Snowflake(10), t(2)).await.unwrap();
        assert_eq!(left.left_at, Some(t(2)));

        let back = record_join(&db.pool, Snowflake(10), "alice2", None, t(3))
            .await
            .unwrap();
        assert_eq!(back.first_joined_at, t(1));
        assert_eq!(back.last_joined_at, t(3));
        assert_eq!(back.username, "alice2");
        assert!(back.left_at.is_none());
    }

    #[tokio::test]
    async fn test_leave_rejects_unknown_repeated_and_early() {
        let db = Database::in_memory().await.unwrap();
        let err = record_leave(&db.pool, Snowflake(99), t(2)).await.unwrap_err();
        assert!(matches!(err, WardenError::NotFound { .. }));

        record_join(&db.pool, Snowflake(10), "alice", None, t(5)).await.unwrap();
        let err = record_leave(&db.pool, Snowflake(10), t(5)).await.unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));
        let err = record_leave(&db.pool, Snowflake(10), t(4)).await.unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));

        record_leave(&db.pool, Snowflake(10), t(6)).await.unwrap();
        let err = record_leave(&db.pool, Snowflake(10), t(7)).await.unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_leave_rejects_five_digit_year() {
        let db = Database::in_memory().await.unwrap();
        record_join(&db.pool, Snowflake(10), "alice", None, t(5)).await.unwrap();
        let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        let err = record_leave(&db.pool, Snowflake(10), far).await.unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));
        assert!(find_member(&db.pool, Snowflake(10)).await.unwrap().unwrap().is_active());
    }

    #[tokio::test]
    async fn test_check_constraint_guards_left_at() {
        let db = Database::in_memory().await.unwrap();
        record_join(&db.pool, Snowflake(10), "alice", None, t(5)).await.unwrap();
        let res = sqlx::query("UPDATE guild_members SET left_at = ? WHERE user_id = ?")
            .bind(time::to_db(t(4)))
            .bind(10_i64)
            .execute(&db.pool)
            .await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_list_and_count_by_filter() {
        let db = Database::in_memory().await.unwrap();
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            record_join(&db.pool, Snowflake(i as u64 + 1), name, None, t(i as u32 + 1))
                .await
                .unwrap();
        }
        record_leave(&db.pool, Snowflake(2), t(10)).await.unwrap();

        let active = list_members(&db.pool, MemberFilter::Active, 10, 0).await.unwrap();
        assert_eq!(
            active.iter().map(|m| m.user_id).collect::<Vec<_>>(),
            vec![Snowflake(1), Snowflake(3)]
        );
        let departed = list_members(&db.pool, MemberFilter::Departed, 10, 0).await.unwrap();
        assert_eq!(departed.len(), 1);
        assert_eq!(departed[0].user_id, Snowflake(2));

        let page = list_members(&db.pool, MemberFilter::All, 2, 1).await.unwrap();
        assert_eq!(
            page.iter().map(|m| m.user_id).collect::<Vec<_>>(),
            vec![Snowflake(2), Snowflake(3)]
        );

        assert_eq!(count_members(&db.pool, MemberFilter::All).await.unwrap(), 3);
        assert_eq!(count_members(&db.pool, MemberFilter::Active).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_names() {
        let db = Database::in_memory().await.unwrap();
        record_join(&db.pool, Snowflake(1), "alice", Some("Al"), t(1)).await.unwrap();

        let m = update_nickname(&db.pool, Snowflake(1), None).await.unwrap().unwrap();
        assert!(m.nickname.is_none());
        let m = update_username(&db.pool, Snowflake(1), "alicia").await.unwrap().unwrap();
        assert_eq!(m.username, "alicia");
        assert!(update_nickname(&db.pool, Snowflake(2), Some("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_member_never_overwrites() {
        let db = Database::in_memory().await.unwrap();
        record_join(&db.pool, Snowflake(1), "alice", None, t(1)).await.unwrap();

        assert!(!ensure_member(&db.pool, Snowflake(1), "snapshot", t(9)).await.unwrap());
        let m = find_member(&db.pool, Snowflake(1)).await.unwrap().unwrap();
        assert_eq!(m.username, "alice");
        assert_eq!(m.last_joined_at, t(1));

        assert!(ensure_member(&db.pool, Snowflake(2), "bob", t(9)).await.unwrap());
        let m = find_member(&db.pool, Snowflake(2)).await.unwrap().unwrap();
        assert_eq!(m.first_joined_at, t(9));
    }

    #[tokio::test]
    async fn test_snowflake_above_i64_max_round_trips() {
        let db = Database::in_memory().await.unwrap();
        let id = Snowflake(u64::MAX - 1);
        record_join(&db.pool, id, "big", None, t(1)).await.unwrap();
        let m = find_member(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(m.user_id, id);
    }
}
