//! Core domain models shared across all Warden crates.
//!
//! These are the "truth" types — what the database stores and the API serializes.
//! Users and messages carry Discord-style snowflake IDs; log and confession rows
//! use their own autoincrement keys.

pub mod afk;
pub mod confession;
pub mod member;
pub mod moderation;

/// Re-export all model types for convenience.
pub use afk::*;
pub use confession::*;
pub use member::*;
pub use moderation::*;
