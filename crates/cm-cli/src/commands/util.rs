//! Shared helpers for command output.

use chrono::SecondsFormat;

/// Current wall-clock time in milliseconds since epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Formats a millisecond epoch timestamp as RFC 3339 UTC.
pub fn format_ts(ts_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts_ms).map_or_else(
        || format!("{ts_ms} ms"),
        |dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}
