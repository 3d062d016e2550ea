//! Runtime configuration.
//!
//! Settings come from an optional TOML file (`jma_quake.toml` by default),
//! then environment variables (a `.env` file is honoured), then command-line
//! flags applied by the binary. Every field has a default, so an empty or
//! missing default file is a valid configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::logging::LogLevel;
use crate::model::{FEED_URL, QuakeError};

/// File looked up when no `--config` path is given.
pub const DEFAULT_CONFIG_PATH: &str = "./jma_quake.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub json_file: String,
    pub csv_file: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of debug, info, warn, error.
    pub level: String,
    pub file: Option<PathBuf>,
    pub timestamps: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url: FEED_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            data_dir: PathBuf::from("./data"),
            json_file: "jma_data.json".to_string(),
            csv_file: "jma_data.csv".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, QuakeError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from `path`, or from `DEFAULT_CONFIG_PATH` when
    /// `path` is `None`.
    ///
    /// An explicitly named file must exist. A missing default file yields
    /// `Config::default()`.
    pub fn load(path: Option<&Path>) -> Result<Self, QuakeError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                return Err(QuakeError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Config::default());
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| QuakeError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Apply `JMA_*` overrides from the process environment, after loading
    /// `.env` if one exists.
    pub fn apply_env(&mut self) {
        dotenv::dotenv().ok();
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("JMA_FEED_URL") {
            self.feed.url = url;
        }
        if let Some(dir) = get("JMA_DATA_DIR") {
            self.output.data_dir = PathBuf::from(dir);
        }
        if let Some(level) = get("JMA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(file) = get("JMA_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
    }

    pub fn json_path(&self) -> PathBuf {
        self.output.data_dir.join(&self.output.json_file)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output.data_dir.join(&self.output.csv_file)
    }

    pub fn log_level(&self) -> Result<LogLevel, QuakeError> {
        self.logging.level.parse().map_err(QuakeError::Config)
    }
}
