//! Normalization of the nested JMA event list into flat rows.
//!
//! Submodules:
//! - `coordinates` decodes packed `cod` strings into latitude/longitude/depth.
//! - `datetime` decodes `YYYYMMDDHHMMSS` stamps.
//! - `flatten` expands each event into one row per region/city pair.
//!
//! None of these fail on malformed per-record data. Bad coordinate and
//! date-time strings become `None` and are reported through the `Logger`.

pub mod coordinates;
pub mod datetime;
pub mod flatten;

pub use coordinates::parse_coordinates;
pub use datetime::parse_timestamp;
pub use flatten::flatten_events;

/// Parses `value` as an `f64`, returning `default` on any failure.
///
/// Surrounding whitespace is ignored and a leading `+` is accepted.
pub fn safe_float(value: &str, default: f64) -> f64 {
    value.trim().parse().unwrap_or(default)
}
