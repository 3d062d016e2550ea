//! JMA (Japan Meteorological Agency) earthquake list client
//!
//! Retrieves the public earthquake report list used by the bosai site.
//! The document is a JSON array of event records, newest first.
//!
//! Feed: https://www.jma.go.jp/bosai/quake/data/list.json

use serde_json::Value;
use std::time::Duration;

use crate::logging::{DataSource, Logger};
use crate::model::QuakeError;

// ============================================================================
// Client
// ============================================================================

/// Build a blocking HTTP client with the given request timeout.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, QuakeError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch the feed and decode it as JSON.
///
/// The document is returned verbatim; no shape checks happen here.
///
/// # Errors
/// - `HttpError` for a non-2xx status
/// - `Transport` when the request cannot be sent or the body read
/// - `ParseError` when the body is not JSON
pub fn fetch_feed(
    client: &reqwest::blocking::Client,
    url: &str,
    logger: &Logger,
) -> Result<Value, QuakeError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()?;

    let status = response.status();
    logger.info(
        DataSource::Feed,
        None,
        &format!("Response Status: {}", status.as_u16()),
    );

    if !status.is_success() {
        return Err(QuakeError::HttpError(status.as_u16()));
    }

    let body = response.text()?;
    parse_feed(&body)
}

/// Decode a feed body.
pub fn parse_feed(body: &str) -> Result<Value, QuakeError> {
    Ok(serde_json::from_str(body)?)
}

// ============================================================================
// Tests
// ============================================================================
