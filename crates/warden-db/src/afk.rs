//! AFK handling: going away, coming back, and being mentioned while away.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::AnyPool;
use warden_common::{
    models::{AfkActivity, AfkReturn, AfkStatus, DEFAULT_AFK_REASON},
    snowflake::Snowflake,
    time,
};

use crate::repository::afk;

/// Mark `user_id` AFK. A missing or blank reason stores the default one.
pub async fn go_afk(
    pool: &AnyPool,
    user_id: Snowflake,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<AfkStatus, sqlx::Error> {
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_AFK_REASON);
    let status = afk::set_afk(pool, user_id, reason, now).await?;
    tracing::debug!(user = %user_id, reason, "User went AFK");
    Ok(status)
}

/// Process a message by `author_id` that mentions `mentions`.
///
/// The author's own AFK status is cleared first. Mentioned users are
/// deduplicated (first occurrence wins) and the author is never reported as
/// mentioned. Storage errors are logged and treated as "not AFK".
pub async fn on_message(
    pool: &AnyPool,
    author_id: Snowflake,
    mentions: &[Snowflake],
    now: DateTime<Utc>,
) -> AfkActivity {
    let returned = match afk::clear_afk(pool, author_id).await {
        Ok(Some(status)) => {
            let away_for = time::format_duration(status.since, now);
            tracing::debug!(user = %author_id, %away_for, "User back from AFK");
            Some(AfkReturn { status, away_for })
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(user = %author_id, error = %e, "Failed to clear AFK status");
            None
        }
    };

    let mut seen = HashSet::new();
    let wanted: Vec<Snowflake> = mentions
        .iter()
        .copied()
        .filter(|id| *id != author_id && seen.insert(*id))
        .collect();

    let mentioned = match afk::find_many(pool, &wanted).await {
        Ok(found) => wanted
            .iter()
            .filter_map(|id| found.iter().find(|s| s.user_id == *id).cloned())
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to look up AFK mentions");
            Vec::new()
        }
    };

    AfkActivity { returned, mentioned }
}
