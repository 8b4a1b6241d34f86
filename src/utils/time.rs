//! Time and timestamp utilities

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with second precision, e.g. `2025-01-15T10:30:00Z`
pub fn now_rfc3339() -> String {
    rfc3339_utc(Utc::now())
}

pub fn rfc3339_utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Local time with offset, used as the prefix of app.log lines
pub fn local_log_stamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Local-time file stem for backups: `2025-01-15_103000`
///
/// Lexical order of these names is chronological order.
pub fn backup_stamp() -> String {
    Local::now().format("%Y-%m-%d_%H%M%S").to_string()
}

/// Local-time file stem for event documents: `2025-01-15T103000`
///
/// No colons, so the name is valid on every filesystem.
pub fn event_stamp() -> String {
    Local::now().format("%Y-%m-%dT%H%M%S").to_string()
}
