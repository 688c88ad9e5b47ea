use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Rotated log files kept on disk.
const MAX_LOG_FILES: usize = 5;

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Failed to create log directory '{path}': {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create log file appender: {0}")]
    Appender(String),

    #[error("Logging is already initialized")]
    AlreadyInitialized,
}

/// Installs console and daily-rotated file logging for the process.
///
/// `base_level` is an `EnvFilter` directive used when `RUST_LOG` is unset.
/// Files are named `<file_prefix>.<date>.log` inside `log_dir`. Warnings and
/// errors go to stderr, everything else to stdout.
pub fn setup_logging(base_level: &str, log_dir: &Path, file_prefix: &str) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(base_level).map_err(|e| LogSetupError::InvalidFilter {
            directive: base_level.to_string(),
            message: e.to_string(),
        })?,
    };

    std::fs::create_dir_all(log_dir).map_err(|source| LogSetupError::LogDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let appender = Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_prefix)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .map_err(|e| LogSetupError::Appender(e.to_string()))?;

    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    FILE_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
