//! Logging configuration module
//!
//! Console output for the test run, plus optional JSON files for CI artifact
//! collection.

use crate::config::LoggingSettings;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// File name prefix of the rolling log files
const LOG_FILE_NAME: &str = "connect-templates.log";

/// Logging initialisation errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{0}': {1}")]
    Filter(String, String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global tracing subscriber
///
/// The returned guard flushes the file writer on drop and must be held for as
/// long as the test run logs to disk.
pub fn init(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|e| LoggingError::Filter(settings.level.clone(), e.to_string()))?,
    };

    let console_layer = if settings.json_format {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .json()
            .with_writer(io::stdout)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .with_writer(io::stdout)
            .boxed()
    };

    let (file_layer, guard) = match settings.log_dir {
        Some(ref dir) => {
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_NAME));
            let layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::info!("Logging initialized - level: {}", settings.level);

    Ok(guard)
}
