use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use jma_quake::config::Config;
use jma_quake::logging::{DataSource, Logger};
use jma_quake::model::QuakeError;
use jma_quake::pipeline::{self, FeedSource};

/// Fetch the JMA earthquake list and write raw JSON plus a flattened CSV.
#[derive(Debug, Parser)]
#[command(name = "jma_quake", version, about)]
struct Cli {
    /// TOML config file (defaults to ./jma_quake.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flatten a previously saved raw document instead of fetching
    #[arg(long, value_name = "JSON_FILE")]
    replay: Option<PathBuf>,

    /// Output directory for jma_data.json / jma_data.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(cli: &Cli) -> Result<Config, QuakeError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();

    if let Some(dir) = &cli.data_dir {
        config.output.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let level = match config.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let logger = Logger::new(level, config.logging.file.clone(), config.logging.timestamps);

    let source = match cli.replay {
        Some(path) => FeedSource::Replay(path),
        None => FeedSource::Live,
    };

    match pipeline::run(&config, &source, &logger) {
        Ok(summary) => {
            if let Some(path) = &summary.json_path {
                logger.info(DataSource::Storage, None, &format!("Raw feed: {}", path.display()));
            }
            logger.info(
                DataSource::Storage,
                None,
                &format!("Flat rows: {}", summary.csv_path.display()),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            logger.error(DataSource::System, None, &e.to_string());
            ExitCode::FAILURE
        }
    }
}
