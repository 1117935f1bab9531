//! Moderation action logging.
//!
//! Logging never fails from the caller's point of view: the action already
//! happened, so a storage problem is reported in [`ModLogResult`] alongside a
//! rendered [`ModLogReport`] the caller can post wherever it likes.

use serde::Serialize;
use sqlx::AnyPool;
use warden_common::{
    models::{CreateModerationLogRequest, ModerationLog, NewModerationLog},
    time,
};

use crate::repository::{members, moderation_logs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Human-readable summary of a logged action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModLogReport {
    pub title: String,
    pub fields: Vec<ReportField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModLogResult {
    pub db_ok: bool,
    pub db_id: Option<i64>,
    pub db_error: Option<String>,
    pub log: Option<ModerationLog>,
    pub report: ModLogReport,
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> ReportField {
    ReportField {
        name: name.to_string(),
        value: value.into(),
        inline,
    }
}

/// Render the report for an entry. `db_error` adds a trailing note.
pub fn render_report(entry: &NewModerationLog, db_error: Option<&str>) -> ModLogReport {
    let mut fields = vec![
        field(
            "Target",
            format!("{} (`{}`)", entry.target_name, entry.target_id),
            false,
        ),
        field(
            "Moderator",
            format!("{} (`{}`)", entry.moderator_name, entry.moderator_id),
            false,
        ),
        field(
            "Reason",
            entry.reason.as_deref().unwrap_or("No reason provided"),
            false,
        ),
        field("Success", if entry.success { "True" } else { "False" }, true),
    ];
    if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
        fields.push(field("Note", note, false));
    }
    if let Some(err) = db_error {
        fields.push(field("DB note", err, false));
    }

    ModLogReport {
        title: format!("Moderation: {}", entry.action.label()),
        fields,
    }
}

/// Record a moderation action.
///
/// Both users are registered as members first if unknown, so the log row's
/// foreign keys hold. A blank reason is replaced with `default_reason`.
pub async fn log_moderation_action(
    pool: &AnyPool,
    default_reason: &str,
    req: CreateModerationLogRequest,
) -> ModLogResult {
    let reason = req
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| default_reason.to_string());

    let entry = NewModerationLog {
        action: req.action,
        target_id: req.target_id,
        target_name: req.target_name,
        moderator_id: req.moderator_id,
        moderator_name: req.moderator_name,
        reason: Some(reason),
        timestamp: req.timestamp.unwrap_or_else(time::now),
        success: req.success,
        note: req.note.filter(|n| !n.trim().is_empty()),
    };

    match write_entry(pool, &entry).await {
        Ok(log) => {
            tracing::info!(
                id = log.id,
                action = %log.action,
                target = %log.target_id,
                moderator = %log.moderator_id,
                success = log.success,
                "Moderation action logged"
            );
            ModLogResult {
                db_ok: true,
                db_id: Some(log.id),
                db_error: None,
                report: render_report(&entry, None),
                log: Some(log),
            }
        }
        Err(e) => {
            tracing::error!(
                action = %entry.action,
                target = %entry.target_id,
                error = %e,
                "Failed to store moderation log"
            );
            let db_error = e.to_string();
            ModLogResult {
                db_ok: false,
                db_id: None,
                report: render_report(&entry, Some(&db_error)),
                db_error: Some(db_error),
                log: None,
            }
        }
    }
}

async fn write_entry(pool: &AnyPool, entry: &NewModerationLog) -> Result<ModerationLog, sqlx::Error> {
    members::ensure_member(pool, entry.target_id, &entry.target_name, entry.timestamp).await?;
    members::ensure_member(pool, entry.moderator_id, &entry.moderator_name, entry.timestamp).await?;
    moderation_logs::create(pool, entry).await
}
