//! Packed coordinate strings.
//!
//! The feed encodes the hypocentre as one string, e.g. `"+36.4+140.6-10000/"`:
//! signed two-digit latitude, signed three-digit longitude, then depth (in
//! metres, possibly with a suffix) up to a `/` delimiter.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::safe_float;
use crate::logging::{DataSource, Logger};
use crate::model::Coordinates;

static COORDINATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?[0-9]{2}\.[0-9]+)([+-]?[0-9]{3}\.[0-9]+)(.*)/").expect("coordinate pattern is valid")
});

/// Decodes a packed coordinate value. Degree digits must be ASCII.
///
/// - Not a string: all `None`, nothing logged.
/// - String that does not match: all `None`, one warning.
/// - Match: each group through `safe_float`, so a non-numeric depth
///   suffix yields `Some(0.0)` rather than `None`.
pub fn parse_coordinates(value: &Value, event_id: Option<&str>, logger: &Logger) -> Coordinates {
    let Some(raw) = value.as_str() else {
        return Coordinates::default();
    };

    match COORDINATE_PATTERN.captures(raw) {
        Some(caps) => Coordinates {
            latitude: Some(safe_float(&caps[1], 0.0)),
            longitude: Some(safe_float(&caps[2], 0.0)),
            depth: Some(safe_float(&caps[3], 0.0)),
        },
        None => {
            logger.warn(
                DataSource::Parser,
                event_id,
                &format!("Invalid coordinates format: {}", raw),
            );
            Coordinates::default()
        }
    }
}
