//! Manual `sqlx::FromRow<'_, sqlx::any::AnyRow>` implementations for all
//! warden-common model types.
//!
//! `sqlx::AnyPool` only decodes primitive types natively (i64, f64, bool,
//! String, bytes). Snowflakes are stored as INTEGER, timestamps as RFC 3339
//! TEXT, and enums as lowercase TEXT; everything else is parsed here.
//!
//! The models do not `#[derive(sqlx::FromRow)]`; the derive emits a blanket
//! `impl<DB>` that would conflict with these.

use chrono::{DateTime, Utc};
use sqlx::{any::AnyRow, Row};

use crate::{
    models::{AfkStatus, Confession, GuildMember, ModAction, ModerationLog},
    snowflake::Snowflake,
    time,
};

// ── Internal helpers ──────────────────────────────────────────────────────────

fn snowflake(row: &AnyRow, col: &str) -> Result<Snowflake, sqlx::Error> {
    let v: i64 = row.try_get(col)?;
    Ok(Snowflake::from_db(v))
}

fn opt_snowflake(row: &AnyRow, col: &str) -> Result<Option<Snowflake>, sqlx::Error> {
    let v: Option<i64> = row.try_get(col)?;
    Ok(v.map(Snowflake::from_db))
}

fn dt(row: &AnyRow, col: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let s: String = row.try_get(col)?;
    time::parse(&s).map_err(sqlx::Error::Decode)
}

fn opt_dt(row: &AnyRow, col: &str) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let s: Option<String> = row.try_get(col)?;
    s.map(|v| time::parse(&v).map_err(sqlx::Error::Decode))
        .transpose()
}

/// SQLite has no boolean type; depending on the declared column type the
/// Any driver hands back either a bool or an integer.
fn flag(row: &AnyRow, col: &str) -> Result<bool, sqlx::Error> {
    match row.try_get::<bool, _>(col) {
        Ok(b) => Ok(b),
        Err(_) => Ok(row.try_get::<i64, _>(col)? != 0),
    }
}

/// TEXT NOT NULL DEFAULT '' columns: empty means absent.
fn non_empty(row: &AnyRow, col: &str) -> Result<Option<String>, sqlx::Error> {
    let s: Option<String> = row.try_get(col)?;
    Ok(s.filter(|v| !v.is_empty()))
}

// ── GuildMember ───────────────────────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for GuildMember {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(GuildMember {
            user_id: snowflake(row, "user_id")?,
            username: row.try_get("username")?,
            nickname: row.try_get("nickname")?,
            first_joined_at: dt(row, "first_joined_at")?,
            last_joined_at: dt(row, "last_joined_at")?,
            left_at: opt_dt(row, "left_at")?,
        })
    }
}

// ── ModerationLog ─────────────────────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for ModerationLog {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let action: String = row.try_get("action")?;
        Ok(ModerationLog {
            id: row.try_get("id")?,
            action: action
                .parse::<ModAction>()
                .unwrap_or_else(|never| match never {}),
            target_id: snowflake(row, "target_id")?,
            target_name: row.try_get("target_name")?,
            moderator_id: snowflake(row, "moderator_id")?,
            moderator_name: row.try_get("moderator_name")?,
            reason: non_empty(row, "reason")?,
            timestamp: dt(row, "timestamp")?,
            success: flag(row, "success")?,
            note: non_empty(row, "note")?,
        })
    }
}

// ── AfkStatus ─────────────────────────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for AfkStatus {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(AfkStatus {
            user_id: snowflake(row, "user_id")?,
            reason: row.try_get("reason")?,
            since: dt(row, "since")?,
        })
    }
}

// ── Confession ────────────────────────────────────────────────────────────────

impl<'r> sqlx::FromRow<'r, AnyRow> for Confession {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        Ok(Confession {
            id: row.try_get("id")?,
            content: row.try_get("content")?,
            category: category
                .parse()
                .map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            timestamp: dt(row, "timestamp")?,
            message_id: opt_snowflake(row, "message_id")?,
            deleted: flag(row, "deleted")?,
        })
    }
}
