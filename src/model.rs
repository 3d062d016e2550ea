//! Core data types for the JMA earthquake feed flattener.
//!
//! Event records themselves are not modelled as structs: the feed's shape
//! varies field by field, so the normalizer reads them as `serde_json::Value`
//! maps and checks presence and type at each access. This module holds the
//! derived output row, the parsed coordinate triple and the error type.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Feed constants
// ---------------------------------------------------------------------------

/// JMA earthquake report list (array of event records at the top level).
pub const FEED_URL: &str = "https://www.jma.go.jp/bosai/quake/data/list.json";

/// Format of the `ctt` and `eid` fields in the feed, e.g. "20240101161234".
pub const FEED_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format used when writing parsed date-times to the tabular output.
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Latitude, longitude and depth decoded from a packed `cod` string.
///
/// All three are `None` when the string could not be matched at all.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<f64>,
}

/// One output row: an event's base fields plus at most one intensity
/// region and at most one city within it.
///
/// Field order is the column order of the tabular output. Region and city
/// fields are `None` when the event (or region) carried no such entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    #[serde(serialize_with = "serialize_datetime")]
    pub ctt: Option<NaiveDateTime>,
    #[serde(serialize_with = "serialize_datetime")]
    pub eid: Option<NaiveDateTime>,
    pub rdt: Option<String>,
    pub anm: Option<String>,
    pub en_anm: Option<String>,
    pub mag: Option<String>,
    pub maxi: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth: Option<f64>,
    pub region_code: Option<String>,
    pub region_maxi: Option<String>,
    pub city_code: Option<String>,
    pub city_maxi: Option<String>,
}

impl FlatRow {
    /// Header row of the tabular output.
    pub const COLUMNS: [&'static str; 14] = [
        "ctt",
        "eid",
        "rdt",
        "anm",
        "en_anm",
        "mag",
        "maxi",
        "latitude",
        "longitude",
        "depth",
        "region_code",
        "region_maxi",
        "city_code",
        "city_maxi",
    ];
}

fn serialize_datetime<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.collect_str(&dt.format(OUTPUT_DATETIME_FORMAT)),
        None => serializer.serialize_none(),
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching, flattening or persisting the feed.
///
/// Malformed per-record fields never show up here; they degrade to null
/// values inside the normalizer.
#[derive(Debug, PartialEq)]
pub enum QuakeError {
    /// Non-2xx HTTP response from the feed.
    HttpError(u16),
    /// The request could not be sent or the body could not be read.
    Transport(String),
    /// The document is not valid JSON.
    ParseError(String),
    /// The top-level document is not an array of records.
    NotASequence(String),
    /// Reading or writing a local file failed.
    Io(String),
    /// Writing the tabular output failed.
    Csv(String),
    /// The configuration file is missing or invalid.
    Config(String),
}

impl std::fmt::Display for QuakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuakeError::HttpError(code) => write!(f, "HTTP error: {}", code),
            QuakeError::Transport(msg) => write!(f, "Request error: {}", msg),
            QuakeError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            QuakeError::NotASequence(kind) => {
                write!(f, "Feed document must be an array of records, got {}", kind)
            }
            QuakeError::Io(msg) => write!(f, "I/O error: {}", msg),
            QuakeError::Csv(msg) => write!(f, "CSV error: {}", msg),
            QuakeError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for QuakeError {}

impl From<std::io::Error> for QuakeError {
    fn from(err: std::io::Error) -> Self {
        QuakeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for QuakeError {
    fn from(err: serde_json::Error) -> Self {
        QuakeError::ParseError(err.to_string())
    }
}

impl From<csv::Error> for QuakeError {
    fn from(err: csv::Error) -> Self {
        QuakeError::Csv(err.to_string())
    }
}

impl From<reqwest::Error> for QuakeError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => QuakeError::HttpError(status.as_u16()),
            None => QuakeError::Transport(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for QuakeError {
    fn from(err: toml::de::Error) -> Self {
        QuakeError::Config(err.to_string())
    }
}
