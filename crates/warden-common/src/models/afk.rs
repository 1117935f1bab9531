//! AFK model — users who marked themselves away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::snowflake::Snowflake;

/// Reason stored when the user gives none.
pub const DEFAULT_AFK_REASON: &str = "No reason provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AfkStatus {
    pub user_id: Snowflake,
    pub reason: String,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SetAfkRequest {
    #[validate(length(max = 200, message = "AFK reason must be at most 200 characters"))]
    pub reason: Option<String>,
}

/// A message seen in the guild, reduced to what AFK handling needs.
#[derive(Debug, Deserialize)]
pub struct AfkActivityRequest {
    pub author_id: Snowflake,
    #[serde(default)]
    pub mentions: Vec<Snowflake>,
}

/// The author came back from AFK.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AfkReturn {
    pub status: AfkStatus,
    /// Compact duration, e.g. `3h12m`
    pub away_for: String,
}

/// Outcome of processing one message.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AfkActivity {
    /// Set when the author's AFK status was cleared by this message
    pub returned: Option<AfkReturn>,
    /// Mentioned users who are currently AFK
    pub mentioned: Vec<AfkStatus>,
}

impl AfkActivity {
    pub fn is_empty(&self) -> bool {
        self.returned.is_none() && self.mentioned.is_empty()
    }
}
