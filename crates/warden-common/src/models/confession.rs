//! Confession model — anonymous messages.
//!
//! A confession row never records who submitted it.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snowflake::Snowflake;

/// Length a confession is cut to when quoted elsewhere (e.g. a removal notice).
pub const PREVIEW_LENGTH: usize = 1900;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfessionCategory {
    Love,
    Secret,
    Rant,
    Question,
    Other,
}

impl ConfessionCategory {
    pub const ALL: [ConfessionCategory; 5] = [
        Self::Love,
        Self::Secret,
        Self::Rant,
        Self::Question,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Secret => "secret",
            Self::Rant => "rant",
            Self::Question => "question",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ConfessionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfessionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown confession category: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confession {
    pub id: i64,
    pub content: String,
    pub category: ConfessionCategory,
    pub timestamp: DateTime<Utc>,

    /// Message the confession was posted as, once known
    pub message_id: Option<Snowflake>,

    /// Soft-delete flag
    pub deleted: bool,
}

impl Confession {
    /// Content cut to at most `limit` characters, ending in `...` when cut.
    pub fn preview(&self, limit: usize) -> String {
        truncate(&self.content, limit)
    }
}

/// Truncate on a character boundary, appending `...` when shortened.
pub fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let keep = limit.saturating_sub(3);
    let cut: String = s.chars().take(keep).collect();
    format!("{}...", cut.trim_end())
}

#[derive(Debug, Deserialize)]
pub struct SubmitConfessionRequest {
    /// Submitter, used only for the cooldown and never stored
    pub user_id: Snowflake,
    pub category: ConfessionCategory,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AttachMessageRequest {
    pub message_id: Snowflake,
}

#[derive(Debug, Deserialize)]
pub struct ListConfessionsQuery {
    pub limit: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("Rant".parse::<ConfessionCategory>(), Ok(ConfessionCategory::Rant));
        assert!("gossip".parse::<ConfessionCategory>().is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("hello world again", 10), "hello w...");
        assert_eq!(truncate("ab  cdefgh", 7), "ab...");
        // multi-byte characters count as one
        assert_eq!(truncate("ééééé", 5), "ééééé");
        assert_eq!(truncate("éééééé", 5), "éé...");
    }
}
