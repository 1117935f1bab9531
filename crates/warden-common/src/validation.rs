//! Input validation utilities.
//!
//! Centralized validation helpers used by the services and API routes.

use chrono::{DateTime, Datelike, Utc};
use validator::Validate;

use crate::error::WardenError;

/// Validate a request body, returning a WardenError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), WardenError> {
    body.validate().map_err(|e| WardenError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    messages.sort();
    messages.join("; ")
}

/// Reject empty or whitespace-only text.
pub fn require_text(field: &str, value: &str) -> Result<(), WardenError> {
    if value.trim().is_empty() {
        return Err(WardenError::Validation {
            message: format!("{field} cannot be empty or whitespace only"),
        });
    }
    Ok(())
}

/// Reject timestamps whose year falls outside 0000-9999.
///
/// Anything else formats with a sign or a fifth year digit and breaks the
/// text ordering of stored timestamps.
pub fn require_storable_time(field: &str, ts: DateTime<Utc>) -> Result<(), WardenError> {
    if !(0..=9999).contains(&ts.year()) {
        return Err(WardenError::Validation {
            message: format!("{field} must fall between years 0000 and 9999"),
        });
    }
    Ok(())
}

/// Validate confession content: non-blank and at most `max_length` characters.
pub fn validate_confession(content: &str, max_length: usize) -> Result<(), WardenError> {
    if content.trim().is_empty() {
        return Err(WardenError::Validation {
            message: "Please provide a non-empty confession".into(),
        });
    }
    if content.chars().count() > max_length {
        return Err(WardenError::Validation {
            message: format!("Confession is too long (max {max_length} characters)"),
        });
    }
    Ok(())
}
