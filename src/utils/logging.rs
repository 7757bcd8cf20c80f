//! Logging Setup
//!
//! Installs the global tracing subscriber for the command-line client.
//! Library code only emits through `tracing` macros and never calls this.

use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::settings::{LogFormat, LoggingConfig};
use crate::utils::error::{AppError, AppResult};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV_VAR: &str = "RAGIO_LOG";

/// Initialize logging from configuration.
///
/// `RAGIO_LOG` takes precedence over `config.level` and accepts full
/// `EnvFilter` directives (e.g. `ragio_client=debug,reqwest=warn`).
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let env_filter = match EnvFilter::try_from_env(LOG_ENV_VAR) {
        Ok(filter) => filter,
        Err(_) => match parse_log_level(&config.level) {
            Ok(level) => EnvFilter::new(level.to_string().to_lowercase()),
            Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
                AppError::config(format!("Invalid log filter '{}': {}", config.level, e))
            })?,
        },
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr or a file so stdout stays reserved for streamed text.
    let result = match (&config.format, &config.file_path) {
        (LogFormat::Json, Some(path)) => {
            let file = open_log_file(path)?;
            registry
                .with(fmt::layer().json().with_target(true).with_writer(Arc::new(file)))
                .try_init()
        }
        (LogFormat::Json, None) => registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        (LogFormat::Pretty, Some(path)) => {
            let file = open_log_file(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .try_init()
        }
        (LogFormat::Pretty, None) => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| AppError::internal(format!("Failed to install logger: {}", e)))
}

fn open_log_file(path: &std::path::Path) -> AppResult<std::fs::File> {
    crate::utils::paths::ensure_parent_dir(path)?;
    Ok(std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?)
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> AppResult<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(AppError::config(format!("Invalid log level: {}", level))),
    }
}
