//! Cross-table consistency report, used by `warden check`.

use serde::Serialize;
use sqlx::AnyPool;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub members: i64,
    pub moderation_logs: i64,
    pub afk_statuses: i64,
    pub confessions: i64,
    /// Members whose `left_at` is not after `last_joined_at`.
    pub invalid_departures: i64,
    pub orphaned_targets: i64,
    pub orphaned_moderators: i64,
    /// Informational. AFK rows carry no foreign key.
    pub afk_without_member: i64,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_departures == 0 && self.orphaned_targets == 0 && self.orphaned_moderators == 0
    }
}

async fn count(pool: &AnyPool, sql: &str) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(sql).fetch_one(pool).await?;
    Ok(n)
}

pub async fn check(pool: &AnyPool) -> Result<IntegrityReport, sqlx::Error> {
    Ok(IntegrityReport {
        members: count(pool, "SELECT COUNT(*) FROM guild_members").await?,
        moderation_logs: count(pool, "SELECT COUNT(*) FROM moderation_logs").await?,
        afk_statuses: count(pool, "SELECT COUNT(*) FROM afk_statuses").await?,
        confessions: count(pool, "SELECT COUNT(*) FROM confessions").await?,
        invalid_departures: count(
            pool,
            "SELECT COUNT(*) FROM guild_members \
             WHERE left_at IS NOT NULL AND left_at <= last_joined_at",
        )
        .await?,
        orphaned_targets: count(
            pool,
            "SELECT COUNT(*) FROM moderation_logs l \
             WHERE NOT EXISTS (SELECT 1 FROM guild_members m WHERE m.user_id = l.target_id)",
        )
        .await?,
        orphaned_moderators: count(
            pool,
            "SELECT COUNT(*) FROM moderation_logs l \
             WHERE NOT EXISTS (SELECT 1 FROM guild_members m WHERE m.user_id = l.moderator_id)",
        )
        .await?,
        afk_without_member: count(
            pool,
            "SELECT COUNT(*) FROM afk_statuses a \
             WHERE NOT EXISTS (SELECT 1 FROM guild_members m WHERE m.user_id = a.user_id)",
        )
        .await?,
    })
}
