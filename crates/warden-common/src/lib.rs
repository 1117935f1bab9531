//! # warden-common
//!
//! Shared types, configuration, error handling, and utilities used across all Warden crates.
//! This is the foundation layer — no queries, no I/O beyond config loading.

pub mod any_row;
pub mod config;
pub mod error;
pub mod models;
pub mod snowflake;
pub mod time;
pub mod validation;
