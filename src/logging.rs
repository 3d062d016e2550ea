//! Structured logging for the earthquake feed flattener
//!
//! Provides leveled logging with source tags and optional event identifiers.
//! Console lines go to an injectable `LogSink` so tests can capture parse
//! warnings; a log file, when configured, receives timestamped entries.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Label used in bracketed console lines, e.g. `[Warning]`.
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Feed,
    Parser,
    Storage,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Feed => write!(f, "JMA"),
            DataSource::Parser => write!(f, "PARSE"),
            DataSource::Storage => write!(f, "STORE"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for console log lines.
pub trait LogSink {
    fn write_line(&self, level: LogLevel, line: &str);
}

/// Warnings and errors to stderr, everything else to stdout.
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
            LogLevel::Info | LogLevel::Debug => println!("{}", line),
        }
    }
}

/// In-memory sink. Clones share the same buffer, so a test can keep one
/// handle and give the other to a `Logger`.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, _level: LogLevel, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<PathBuf>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
    sink: Box<dyn LogSink>,
}

impl Logger {
    /// Console logger, as used by the binary.
    pub fn new(min_level: LogLevel, log_file: Option<PathBuf>, console_timestamps: bool) -> Self {
        Logger {
            min_level,
            log_file,
            console_timestamps,
            sink: Box::new(ConsoleSink),
        }
    }

    /// Logger writing plain console lines to `sink`, with no log file.
    pub fn with_sink(min_level: LogLevel, sink: impl LogSink + 'static) -> Self {
        Logger {
            min_level,
            log_file: None,
            console_timestamps: false,
            sink: Box::new(sink),
        }
    }

    pub fn log(&self, level: LogLevel, source: &DataSource, event_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let event_part = event_id.map(|id| format!(" [{}]", id)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, source, event_part, message
        );

        if self.console_timestamps {
            self.sink.write_line(level, &log_entry);
        } else {
            self.sink
                .write_line(level, &format!("[{}] {}", level.label(), message));
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path.display(), e);
            }
        }
    }

    fn append_to_file(path: &Path, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }

    pub fn info(&self, source: DataSource, event_id: Option<&str>, message: &str) {
        self.log(LogLevel::Info, &source, event_id, message);
    }

    pub fn warn(&self, source: DataSource, event_id: Option<&str>, message: &str) {
        self.log(LogLevel::Warning, &source, event_id, message);
    }

    pub fn error(&self, source: DataSource, event_id: Option<&str>, message: &str) {
        self.log(LogLevel::Error, &source, event_id, message);
    }

    pub fn debug(&self, source: DataSource, event_id: Option<&str>, message: &str) {
        self.log(LogLevel::Debug, &source, event_id, message);
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one fetch-and-flatten run.
pub fn log_run_summary(logger: &Logger, events: usize, rows: usize) {
    let message = format!("Flattened {} events into {} rows", events, rows);

    if events > 0 && rows == 0 {
        logger.warn(DataSource::System, None, &message);
    } else {
        logger.info(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" Warning ".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_plain_console_format() {
        let sink = MemorySink::new();
        let logger = Logger::with_sink(LogLevel::Debug, sink.clone());
        logger.warn(DataSource::Parser, None, "Invalid datetime format: bad");
        assert_eq!(sink.lines(), vec!["[Warning] Invalid datetime format: bad"]);
    }

    #[test]
    fn test_min_level_filters() {
        let sink = MemorySink::new();
        let logger = Logger::with_sink(LogLevel::Warning, sink.clone());
        logger.debug(DataSource::System, None, "hidden");
        logger.info(DataSource::System, None, "hidden");
        logger.error(DataSource::Feed, None, "shown");
        assert_eq!(sink.lines(), vec!["[Error] shown"]);
    }

    #[test]
    fn test_log_file_receives_timestamped_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let logger = Logger {
            min_level: LogLevel::Info,
            log_file: Some(path.clone()),
            console_timestamps: false,
            sink: Box::new(MemorySink::new()),
        };
        logger.info(DataSource::Feed, Some("20240101161010"), "Response Status: 200");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("INFO JMA [20240101161010]: Response Status: 200"));
        assert!(contents.contains(" UTC "));
    }

    #[test]
    fn test_run_summary_warns_on_empty_output() {
        let sink = MemorySink::new();
        let logger = Logger::with_sink(LogLevel::Info, sink.clone());
        log_run_summary(&logger, 3, 0);
        log_run_summary(&logger, 3, 7);
        assert_eq!(
            sink.lines(),
            vec![
                "[Warning] Flattened 3 events into 0 rows",
                "[Info] Flattened 3 events into 7 rows",
            ]
        );
    }
}
