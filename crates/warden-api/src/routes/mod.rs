//! API route modules.

pub mod afk;
pub mod confessions;
pub mod health;
pub mod members;
pub mod modlogs;
