use core::str::FromStr;
use std::{fs::create_dir_all, io};

use thiserror::Error;
use tracing::{
    Level,
    subscriber::{SetGlobalDefaultError, set_global_default},
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{layer::SubscriberExt, registry};

use crate::config::LoggingConfig;

/// Create and set the global loggers.
///
/// The returned guards must be held until the program exits so buffered logs are flushed.
pub fn init_logger(config: &LoggingConfig) -> Result<Vec<WorkerGuard>, LoggerError> {
    let level = Level::from_str(&config.level)
        .map_err(|_| LoggerError::InvalidLevel(config.level.clone()))?;
    let filter = tracing_subscriber::filter::Targets::new().with_default(level);

    let mut guards = Vec::new();

    // File layer
    let file_layer = match &config.directory {
        Some(directory) => {
            create_dir_all(directory).map_err(LoggerError::CreateDirectory)?;

            let appender = RollingFileAppender::builder()
                .filename_prefix("pg_container")
                .filename_suffix("log")
                .rotation(Rotation::DAILY)
                .max_log_files(90)
                .build(directory)?;

            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);

            Some(layer)
        }
        None => None,
    };

    // Std layer
    let std_layer = {
        let (writer, guard) = tracing_appender::non_blocking(io::stdout());
        guards.push(guard);

        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(true)
            .with_target(false)
            .without_time()
    };

    // Create registry
    let registry = registry().with(file_layer).with(std_layer).with(filter);

    // Set global subscriber
    set_global_default(registry)?;

    Ok(guards)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("Failed to create rolling appender:\n{0}")]
    CreateRollingAppender(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to create log directory:\n{0}")]
    CreateDirectory(#[source] io::Error),

    #[error("Failed to set the global logger:\n{0}")]
    SetGlobal(#[from] SetGlobalDefaultError),
}
