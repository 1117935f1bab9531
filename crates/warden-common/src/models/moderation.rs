//! Moderation log model — append-only audit trail of actions taken against members.

use std::{convert::Infallible, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use validator::Validate;

use crate::snowflake::Snowflake;

/// The kind of moderation action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModAction {
    Kick,
    Ban,
    Unban,
    Timeout,
    Warn,
    /// Any other action word, stored lowercased
    Other(String),
}

impl ModAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Timeout => "timeout",
            Self::Warn => "warn",
            Self::Other(s) => s,
        }
    }

    /// Capitalized label, e.g. `Kick`.
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for ModAction {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Ok(match s.as_str() {
            "kick" => Self::Kick,
            "ban" => Self::Ban,
            "unban" => Self::Unban,
            "timeout" => Self::Timeout,
            "warn" => Self::Warn,
            _ => Self::Other(s),
        })
    }
}

impl fmt::Display for ModAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.trim().is_empty() {
            return Err(serde::de::Error::custom("action cannot be empty"));
        }
        Ok(s.parse().unwrap_or_else(|never: Infallible| match never {}))
    }
}

/// A persisted moderation log entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationLog {
    pub id: i64,
    pub action: ModAction,

    pub target_id: Snowflake,
    /// Target's display name when the action was taken
    pub target_name: String,

    pub moderator_id: Snowflake,
    /// Moderator's display name when the action was taken
    pub moderator_name: String,

    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,

    /// Whether the action itself went through
    pub success: bool,

    /// Free-text detail, typically why the action failed
    pub note: Option<String>,
}

/// Values for a new log row.
#[derive(Debug, Clone)]
pub struct NewModerationLog {
    pub action: ModAction,
    pub target_id: Snowflake,
    pub target_name: String,
    pub moderator_id: Snowflake,
    pub moderator_name: String,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateModerationLogRequest {
    pub action: ModAction,

    pub target_id: Snowflake,
    #[validate(length(min = 1, max = 100, message = "Target name must be 1-100 characters"))]
    pub target_name: String,

    pub moderator_id: Snowflake,
    #[validate(length(min = 1, max = 100, message = "Moderator name must be 1-100 characters"))]
    pub moderator_name: String,

    #[validate(length(max = 512))]
    pub reason: Option<String>,

    pub success: bool,

    #[validate(length(max = 1024))]
    pub note: Option<String>,

    /// Defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ListLogsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
