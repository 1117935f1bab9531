//! Timestamp helpers.
//!
//! Timestamps are stored as fixed-width RFC 3339 text (`2024-01-15T10:30:00.000000Z`)
//! so that comparing and ordering the TEXT column matches comparing the instants.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time truncated to the precision we persist.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    parse(&to_db(now)).unwrap_or(now)
}

/// Format a timestamp for storage.
pub fn to_db(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` layout, with or
/// without fractional seconds.
pub fn parse(
    s: &str,
) -> Result<DateTime<Utc>, Box<dyn std::error::Error + Send + Sync + 'static>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Ok(d.with_timezone(&Utc));
    }
    if let Ok(d) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(d.and_utc());
    }
    if let Ok(d) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(d.and_utc());
    }
    Err(format!("cannot parse timestamp '{s}'").into())
}

/// Compact human duration between `since` and `now`: `42s`, `3m12s`, `5h4m`, `2d7h`.
///
/// A `since` in the future yields `0s`.
pub fn format_duration(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else if secs < 86_400 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d{}h", secs / 86_400, (secs % 86_400) / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_db_format_is_fixed_width_and_sortable() {
        let a = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let b = a + Duration::microseconds(1);
        let (sa, sb) = (to_db(a), to_db(b));
        assert_eq!(sa, "2024-01-15T10:30:00.000000Z");
        assert_eq!(sa.len(), sb.len());
        assert!(sa < sb);
        assert_eq!(parse(&sb).unwrap(), b);
    }

    #[test]
    fn test_parse_sqlite_layouts() {
        let want = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse("2024-01-15 10:30:00").unwrap(), want);
        assert_eq!(parse("2024-01-15 10:30:00.000").unwrap(), want);
        assert!(parse("yesterday").is_err());
    }

    #[test]
    fn test_format_duration_buckets() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_duration(t0, t0 + Duration::seconds(42)), "42s");
        assert_eq!(format_duration(t0, t0 + Duration::seconds(192)), "3m12s");
        assert_eq!(format_duration(t0, t0 + Duration::minutes(304)), "5h4m");
        assert_eq!(format_duration(t0, t0 + Duration::hours(55)), "2d7h");
        assert_eq!(format_duration(t0 + Duration::seconds(5), t0), "0s");
    }
}
