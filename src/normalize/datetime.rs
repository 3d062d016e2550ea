//! Feed timestamps (`ctt`, `eid`), e.g. "20240101161234" in JST.
//!
//! The stamps carry no offset, so they are kept as `NaiveDateTime`.

use chrono::{NaiveDateTime, Timelike};
use serde_json::Value;

use crate::logging::{DataSource, Logger};
use crate::model::FEED_DATETIME_FORMAT;

/// Decodes a `YYYYMMDDHHMMSS` value.
///
/// Null, missing or empty input is `None` with nothing logged. Anything
/// else that is not exactly 14 ASCII digits forming a valid date-time
/// (leap seconds excluded) is `None` plus one warning, tagged with
/// `event_id` in the log file.
pub fn parse_timestamp(
    value: &Value,
    event_id: Option<&str>,
    logger: &Logger,
) -> Option<NaiveDateTime> {
    let raw = match value {
        Value::Null => return None,
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match strict_parse(&raw) {
        Some(dt) => Some(dt),
        None => {
            logger.warn(
                DataSource::Parser,
                event_id,
                &format!("Invalid datetime format: {}", raw),
            );
            None
        }
    }
}

/// chrono alone tolerates leading whitespace and second 60.
fn strict_parse(raw: &str) -> Option<NaiveDateTime> {
    if raw.len() != 14 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let dt = NaiveDateTime::parse_from_str(raw, FEED_DATETIME_FORMAT).ok()?;
    if dt.nanosecond() >= 1_000_000_000 {
        return None;
    }
    Some(dt)
}
