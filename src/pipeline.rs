//! One batch run: fetch -> flatten -> persist raw -> persist flat.

use serde_json::Value;
use std::path::PathBuf;

use crate::config::Config;
use crate::ingest::jma;
use crate::logging::{self, DataSource, Logger};
use crate::model::QuakeError;
use crate::normalize::flatten_events;
use crate::storage;

/// Where the feed document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    /// Fetch `config.feed.url`.
    Live,
    /// Re-read a raw document saved by an earlier run. The raw file is not
    /// rewritten.
    Replay(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub events: usize,
    pub rows: usize,
    /// `None` when the raw document was not written (replay).
    pub json_path: Option<PathBuf>,
    pub csv_path: PathBuf,
}

pub fn run(config: &Config, source: &FeedSource, logger: &Logger) -> Result<RunSummary, QuakeError> {
    match source {
        FeedSource::Live => {
            let client = jma::build_client(config.feed.timeout_secs)?;
            let document = jma::fetch_feed(&client, &config.feed.url, logger)?;
            process_document(config, &document, true, logger)
        }
        FeedSource::Replay(path) => {
            logger.info(
                DataSource::System,
                None,
                &format!("Replaying saved feed from {}", path.display()),
            );
            let document = storage::load_json(path)?;
            process_document(config, &document, false, logger)
        }
    }
}

/// Flatten an already decoded document and write the outputs.
///
/// Nothing is written when the document is not an array of records.
pub fn process_document(
    config: &Config,
    document: &Value,
    save_raw: bool,
    logger: &Logger,
) -> Result<RunSummary, QuakeError> {
    let rows = flatten_events(document, logger)?;
    let events = document.as_array().map(Vec::len).unwrap_or(0);

    let json_path = if save_raw {
        let path = config.json_path();
        storage::save_json(&path, document)?;
        logger.debug(
            DataSource::Storage,
            None,
            &format!("Saved raw feed to {}", path.display()),
        );
        Some(path)
    } else {
        None
    };

    let csv_path = config.csv_path();
    storage::save_csv(&csv_path, &rows)?;
    logger.debug(
        DataSource::Storage,
        None,
        &format!("Saved {} rows to {}", rows.len(), csv_path.display()),
    );

    logging::log_run_summary(logger, events, rows.len());

    Ok(RunSummary {
        events,
        rows: rows.len(),
        json_path,
        csv_path,
    })
}
