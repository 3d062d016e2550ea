//! Fetches the JMA earthquake report list and flattens it into one row per
//! (event, intensity region, city), saving both the raw document and a CSV.

pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod storage;
