//! Logging configuration for EventPulse

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOGS_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "eventpulse.log";

/// Initialize logging from `RUST_LOG`, with file output
pub fn init_logging() -> Result<()> {
    init_logging_with_config(None)
}

/// Initialize logging with configuration
pub fn init_logging_with_config(config: Option<&crate::config::AppConfig>) -> Result<()> {
    // Use config if available, otherwise RUST_LOG or default
    let (env_filter, level) = if let Some(config) = config {
        let level = config.logging.level.as_str();
        (level_filter(level), level.to_string())
    } else {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,eventpulse=debug"));
        (filter, level)
    };

    install(env_filter, &level)
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<()> {
    install(level_filter(level), level)
}

/// Where the CLI takes its log level from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelSource {
    Verbose,
    Env,
    Config,
}

/// `--verbose` wins, then `RUST_LOG` when set, then `logging.level`
const fn level_source(verbose: bool, rust_log_set: bool) -> LevelSource {
    if verbose {
        LevelSource::Verbose
    } else if rust_log_set {
        LevelSource::Env
    } else {
        LevelSource::Config
    }
}

/// Initialize logging for the binary
pub fn init_cli_logging(config: &crate::config::AppConfig, verbose: bool) -> Result<()> {
    match level_source(verbose, std::env::var_os("RUST_LOG").is_some()) {
        LevelSource::Verbose => init_logging_with_level("debug"),
        LevelSource::Env => init_logging(),
        LevelSource::Config => init_logging_with_config(Some(config)),
    }
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},eventpulse={level}"))
}

fn install(env_filter: EnvFilter, level: &str) -> Result<()> {
    let logs_dir = Path::new(LOGS_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(LOGS_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::EventPulseError::Custom(e.to_string()))?;

    tracing::info!("Logging initialized with level: {level} - console and file output enabled");
    tracing::info!("Log files will be saved to: {LOGS_DIR}/{LOG_FILE_PREFIX}.YYYY-MM-DD");

    // The writer thread must outlive the process-wide subscriber
    std::mem::forget(guard);

    Ok(())
}
