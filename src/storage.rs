//! Persistence of the raw feed document and the flattened rows.

use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::model::{FlatRow, QuakeError};

fn ensure_parent_dir(path: &Path) -> Result<(), QuakeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes `document` as pretty JSON with 4-space indentation. Non-ASCII
/// text (region names) is written as UTF-8, not escaped.
pub fn save_json(path: &Path, document: &Value) -> Result<(), QuakeError> {
    ensure_parent_dir(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    document.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}

/// Reads a document previously written by `save_json`.
pub fn load_json(path: &Path) -> Result<Value, QuakeError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Writes `rows` as CSV with a header row and no index column.
///
/// The header is written even when there are no rows. `None` fields are
/// empty cells.
pub fn save_csv(path: &Path, rows: &[FlatRow]) -> Result<(), QuakeError> {
    ensure_parent_dir(path)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(FlatRow::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
