//! Member model — one row per user ever seen in the guild.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::snowflake::Snowflake;

/// A guild member, past or present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMember {
    pub user_id: Snowflake,

    /// Account username at the time of the last join or rename
    pub username: String,

    /// Guild-specific nickname
    pub nickname: Option<String>,

    /// When the user joined for the very first time (never changes)
    pub first_joined_at: DateTime<Utc>,

    /// When the user most recently joined
    pub last_joined_at: DateTime<Utc>,

    /// When the user left; `None` while still a member
    pub left_at: Option<DateTime<Utc>>,
}

impl GuildMember {
    /// Whether the user is currently in the guild.
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }

    /// Nickname if set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.username)
    }
}

/// Which members a listing should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberFilter {
    /// Currently in the guild
    #[default]
    Active,
    /// Left and not rejoined
    Departed,
    All,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    pub user_id: Snowflake,

    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(length(max = 100, message = "Nickname must be at most 100 characters"))]
    pub nickname: Option<String>,

    /// Defaults to now
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaveRequest {
    /// Defaults to now
    pub left_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: Option<String>,

    /// An empty string clears the nickname.
    #[validate(length(max = 100))]
    pub nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListMembersQuery {
    #[serde(default)]
    pub filter: MemberFilter,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
