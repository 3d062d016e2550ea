//! Expands the nested event list into flat rows.
//!
//! One row per (event, region, city). An event without a usable `int`
//! list still yields one row, and so does a region without a usable
//! `city` list; the missing fields are `None`. An empty list counts as
//! unusable, so every event and every region shows up at least once.

use serde_json::{Map, Value};

use super::{parse_coordinates, parse_timestamp};
use crate::logging::Logger;
use crate::model::{Coordinates, FlatRow, QuakeError};

const DEFAULT_MAG: &str = "0.0";
const DEFAULT_MAXI: &str = "0";

/// Flattens a decoded feed document.
///
/// Returns `QuakeError::NotASequence` only when the document itself is not
/// an array. Individual records never fail; see module docs.
pub fn flatten_events(events: &Value, logger: &Logger) -> Result<Vec<FlatRow>, QuakeError> {
    let Value::Array(events) = events else {
        return Err(QuakeError::NotASequence(json_kind(events).to_string()));
    };

    let mut rows = Vec::new();
    for event in events {
        flatten_event(event, logger, &mut rows);
    }
    Ok(rows)
}

/// Appends the rows for a single event record to `rows`.
pub fn flatten_event(event: &Value, logger: &Logger, rows: &mut Vec<FlatRow>) {
    let empty = Map::new();
    let event = event.as_object().unwrap_or(&empty);

    // Raw eid tags parse warnings in the log file.
    let event_id = event.get("eid").and_then(Value::as_str);
    let ctt = event.get("ctt").and_then(|v| parse_timestamp(v, event_id, logger));
    let eid = event.get("eid").and_then(|v| parse_timestamp(v, event_id, logger));
    let coordinates = match event.get("cod") {
        Some(cod) if !is_blank(cod) => parse_coordinates(cod, event_id, logger),
        _ => Coordinates::default(),
    };

    let base = FlatRow {
        ctt,
        eid,
        rdt: text_field(event, "rdt"),
        anm: text_field(event, "anm"),
        en_anm: text_field(event, "en_anm"),
        mag: text_field_or(event, "mag", DEFAULT_MAG),
        maxi: text_field_or(event, "maxi", DEFAULT_MAXI),
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        depth: coordinates.depth,
        region_code: None,
        region_maxi: None,
        city_code: None,
        city_maxi: None,
    };

    let regions = match event.get("int") {
        Some(Value::Array(regions)) if !regions.is_empty() => regions,
        _ => {
            rows.push(base);
            return;
        }
    };

    for region in regions {
        let region = region.as_object().unwrap_or(&empty);
        let region_code = text_field_or(region, "code", "");
        let region_maxi = text_field_or(region, "maxi", "");

        match region.get("city") {
            Some(Value::Array(cities)) if !cities.is_empty() => {
                for city in cities {
                    let city = city.as_object().unwrap_or(&empty);
                    rows.push(FlatRow {
                        region_code: region_code.clone(),
                        region_maxi: region_maxi.clone(),
                        city_code: text_field_or(city, "code", ""),
                        city_maxi: text_field_or(city, "maxi", ""),
                        ..base.clone()
                    });
                }
            }
            _ => rows.push(FlatRow {
                region_code,
                region_maxi,
                ..base.clone()
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Field access helpers
// ---------------------------------------------------------------------------

/// Reads a text column. Absent or null is `None`; a non-string scalar keeps
/// its JSON text so nothing from the feed is silently dropped.
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(value_text)
}

/// Like `text_field`, but an absent key yields `default`. An explicit
/// `null` in the feed is still `None`.
fn text_field_or(record: &Map<String, Value>, key: &str, default: &str) -> Option<String> {
    match record.get(key) {
        Some(value) => value_text(value),
        None => Some(default.to_string()),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemorySink};
    use serde_json::json;

    fn capture() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::with_sink(LogLevel::Debug, sink.clone()), sink)
    }

    fn base_event() -> Value {
        json!({
            "ctt": "20240101161234",
            "eid": "20240101161010",
            "rdt": "2024-01-01T16:12:00+09:00",
            "ttl": "震源・震度情報",
            "anm": "石川県能登地方",
            "en_anm": "Noto, Ishikawa Prefecture",
            "mag": "7.6",
            "maxi": "7",
            "cod": "+37.5+137.3-10000/"
        })
    }

    #[test]
    fn test_event_without_regions_yields_one_null_row() {
        let (logger, sink) = capture();
        let rows = flatten_events(&json!([base_event()]), &logger).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.anm.as_deref(), Some("石川県能登地方"));
        assert_eq!(row.mag.as_deref(), Some("7.6"));
        assert_eq!(row.latitude, Some(37.5));
        assert_eq!(row.longitude, Some(137.3));
        assert_eq!(row.depth, Some(-10000.0));
        assert_eq!(row.region_code, None);
        assert_eq!(row.region_maxi, None);
        assert_eq!(row.city_code, None);
        assert_eq!(row.city_maxi, None);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_regions_without_cities_yield_one_row_each() {
        let (logger, _) = capture();
        let mut event = base_event();
        event["int"] = json!([
            {"code": "390", "maxi": "7"},
            {"code": "391", "maxi": "6+"},
            {"code": "400", "maxi": "5-"}
        ]);
        let rows = flatten_events(&json!([event]), &logger).unwrap();

        assert_eq!(rows.len(), 3);
        let codes: Vec<_> = rows.iter().map(|r| r.region_code.as_deref()).collect();
        assert_eq!(codes, vec![Some("390"), Some("391"), Some("400")]);
        for row in &rows {
            assert_eq!(row.city_code, None);
            assert_eq!(row.city_maxi, None);
            assert_eq!(row.eid, rows[0].eid);
            assert_eq!(row.anm, rows[0].anm);
            assert_eq!(row.latitude, rows[0].latitude);
        }
    }

    #[test]
    fn test_region_with_cities_yields_one_row_per_city() {
        let (logger, _) = capture();
        let mut event = base_event();
        event["int"] = json!([
            {
                "code": "390",
                "maxi": "7",
                "city": [
                    {"code": "1720400", "maxi": "7"},
                    {"code": "1746300", "maxi": "6+"}
                ]
            },
            {"code": "391", "maxi": "6+"}
        ]);
        let rows = flatten_events(&json!([event]), &logger).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].region_code.as_deref(), Some("390"));
        assert_eq!(rows[0].city_code.as_deref(), Some("1720400"));
        assert_eq!(rows[0].city_maxi.as_deref(), Some("7"));
        assert_eq!(rows[1].region_code.as_deref(), Some("390"));
        assert_eq!(rows[1].region_maxi.as_deref(), Some("7"));
        assert_eq!(rows[1].city_code.as_deref(), Some("1746300"));
        assert_eq!(rows[2].region_code.as_deref(), Some("391"));
        assert_eq!(rows[2].city_code, None);
    }

    #[test]
    fn test_empty_city_list_still_yields_region_row() {
        let (logger, _) = capture();
        let mut event = base_event();
        event["int"] = json!([
            {"code": "390", "maxi": "7", "city": []},
            {"code": "391", "maxi": "6+"}
        ]);
        let rows = flatten_events(&json!([event]), &logger).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region_code.as_deref(), Some("390"));
        assert_eq!(rows[0].city_code, None);
        assert_eq!(rows[1].region_code.as_deref(), Some("391"));
    }

    #[test]
    fn test_empty_region_list_still_yields_event_row() {
        let (logger, _) = capture();
        let mut event = base_event();
        event["int"] = json!([]);
        let rows = flatten_events(&json!([event]), &logger).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].region_code, None);
        assert_eq!(rows[0].mag.as_deref(), Some("7.6"));
    }

    #[test]
    fn test_missing_mag_and_maxi_use_defaults() {
        let (logger, _) = capture();
        let event = json!({"eid": "20240101161010"});
        let rows = flatten_events(&json!([event]), &logger).unwrap();

        assert_eq!(rows[0].mag.as_deref(), Some("0.0"));
        assert_eq!(rows[0].maxi.as_deref(), Some("0"));
        assert_eq!(rows[0].ctt, None);
        assert_eq!(rows[0].rdt, None);
        assert_eq!(rows[0].latitude, None);
    }

    #[test]
    fn test_explicit_null_mag_is_kept_null() {
        let (logger, _) = capture();
        let rows = flatten_events(&json!([{"mag": null}]), &logger).unwrap();
        assert_eq!(rows[0].mag, None);
        assert_eq!(rows[0].maxi.as_deref(), Some("0"));
    }

    #[test]
    fn test_scalar_int_is_treated_as_absent() {
        let (logger, sink) = capture();
        let mut event = base_event();
        event["int"] = json!(5);
        let rows = flatten_events(&json!([event]), &logger).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].region_code, None);
        assert_eq!(rows[0].city_code, None);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_region_missing_code_defaults_to_empty() {
        let (logger, _) = capture();
        let mut event = base_event();
        event["int"] = json!([{"city": [{"maxi": "3"}]}, "not-a-region"]);
        let rows = flatten_events(&json!([event]), &logger).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region_code.as_deref(), Some(""));
        assert_eq!(rows[0].region_maxi.as_deref(), Some(""));
        assert_eq!(rows[0].city_code.as_deref(), Some(""));
        assert_eq!(rows[0].city_maxi.as_deref(), Some("3"));
        assert_eq!(rows[1].region_code.as_deref(), Some(""));
        assert_eq!(rows[1].city_code, None);
    }

    #[test]
    fn test_malformed_fields_degrade_with_warnings() {
        let (logger, sink) = capture();
        let event = json!({"ctt": "bad", "eid": "", "cod": "notacoordinate"});
        let rows = flatten_events(&json!([event]), &logger).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ctt, None);
        assert_eq!(rows[0].eid, None);
        assert_eq!(rows[0].latitude, None);
        assert_eq!(rows[0].depth, None);
        assert_eq!(
            sink.lines(),
            vec![
                "[Warning] Invalid datetime format: bad",
                "[Warning] Invalid coordinates format: notacoordinate",
            ]
        );
    }

    #[test]
    fn test_log_file_warnings_carry_raw_event_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parse.log");
        let logger = Logger::new(LogLevel::Warning, Some(path.clone()), false);
        let event = json!({"eid": "20240101161010", "ctt": "bad", "cod": "notacoordinate"});

        flatten_events(&json!([event]), &logger).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("WARN PARSE [20240101161010]: Invalid datetime format: bad"));
        assert!(lines[1].ends_with(
            "WARN PARSE [20240101161010]: Invalid coordinates format: notacoordinate"
        ));
    }

    #[test]
    fn test_empty_cod_is_skipped_without_warning() {
        let (logger, sink) = capture();
        let rows = flatten_events(&json!([{"cod": ""}]), &logger).unwrap();
        assert_eq!(rows[0].latitude, None);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_non_object_record_yields_default_row() {
        let (logger, _) = capture();
        let rows = flatten_events(&json!(["oops", 42]), &logger).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mag.as_deref(), Some("0.0"));
        assert_eq!(rows[1].region_code, None);
    }

    #[test]
    fn test_event_order_is_preserved() {
        let (logger, _) = capture();
        let events = json!([
            {"anm": "first", "int": [{"code": "a"}, {"code": "b"}]},
            {"anm": "second"},
            {"anm": "third", "int": [{"code": "c", "city": [{"code": "c1"}, {"code": "c2"}]}]}
        ]);
        let rows = flatten_events(&events, &logger).unwrap();

        let names: Vec<_> = rows.iter().map(|r| r.anm.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["first", "first", "second", "third", "third"]);
        assert_eq!(rows[3].city_code.as_deref(), Some("c1"));
        assert_eq!(rows[4].city_code.as_deref(), Some("c2"));
    }

    #[test]
    fn test_non_string_text_fields_keep_json_text() {
        let (logger, _) = capture();
        let rows = flatten_events(&json!([{"mag": 6.1, "maxi": 4}]), &logger).unwrap();
        assert_eq!(rows[0].mag.as_deref(), Some("6.1"));
        assert_eq!(rows[0].maxi.as_deref(), Some("4"));
    }

    #[test]
    fn test_top_level_object_is_rejected() {
        let (logger, _) = capture();
        let err = flatten_events(&json!({"eid": "20240101161010"}), &logger).unwrap_err();
        assert_eq!(err, QuakeError::NotASequence("object".to_string()));
    }

    #[test]
    fn test_empty_feed_yields_no_rows() {
        let (logger, _) = capture();
        assert!(flatten_events(&json!([]), &logger).unwrap().is_empty());
    }
}
