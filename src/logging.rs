//! File-backed `tracing` subscriber. The terminal belongs to the UI, so log
//! output never goes to stdout or stderr.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Environment variable holding a filter directive; wins over `[log] level`.
pub const LOG_ENV_VAR: &str = "NOTETREE_LOG";

/// Install the global subscriber. Returns the log file path in use.
pub fn init_logging(config: &AppConfig) -> Result<PathBuf> {
    let path = config
        .log_file()
        .ok_or_else(|| AppError::InvalidPath("no location for the log file".into()))?;
    let filter = build_env_filter(config.log_level())?;
    let writer = open_log_file(&path)?;

    Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(writer)),
        )
        .try_init()
        .map_err(|e| AppError::InvalidOperation(format!("logging already initialised: {}", e)))?;

    Ok(path)
}

/// `$NOTETREE_LOG` if set and valid, else `level`.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| AppError::InvalidArgument(format!("invalid log level '{}': {}", level, e)))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
