use chrono::{DateTime, Utc};
use serde_json::Value;

/// Parse a raw JSON timestamp value that may be an integer (epoch ms) or an
/// RFC3339 string. Returns `None` for anything else.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// Parse an RFC3339 timestamp string, tolerating the timezone-less form some
/// agent CLIs write (`2025-01-15T10:30:00.123`).
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
