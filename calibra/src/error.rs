//! Error types for loading and persisting frame indexes, configs and plans.

use std::io;
use std::path::PathBuf;

use common::{FileExtensionError, SerdeError};
use thiserror::Error;

/// Errors raised at the I/O edges of the crate.
///
/// Data-quality problems (missing fields, no matching master) are never
/// errors; they end up as skip entries in the plan.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: SerdeError,
    },

    #[error("Invalid config '{path}': {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] SerdeError),

    #[error(transparent)]
    Format(#[from] FileExtensionError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use super::*;

    #[test]
    fn read_error_mentions_path_and_cause() {
        let err = Error::Read {
            path: PathBuf::from("/data/lights.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/lights.json"));
        assert!(msg.contains("file not found"));
        assert!(err.source().is_some());
    }

    #[test]
    fn format_error_is_transparent() {
        let err: Error = FileExtensionError::UnsupportedFileExtension("plan.xml".into()).into();
        assert_eq!(err.to_string(), "Unsupported file extension for file: plan.xml");
    }
}
