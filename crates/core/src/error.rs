//! Error types for steplog.
//!
//! Every backend returns these errors verbatim. Nothing is retried or
//! suppressed except the documented "missing file on read means no entries"
//! contract of [`LogService::log_find`](crate::LogService::log_find).

use crate::types::StepId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// All steplog errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (empty base path, bad config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// The base directory could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// I/O error from open, read, write, sync or remove.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored line could not be decoded.
    #[error("malformed log entry at {path}:{line}: {source}")]
    Decode {
        /// File being read.
        path: PathBuf,
        /// 1-based line number within the file.
        line: usize,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An entry could not be serialized.
    #[error("failed to encode log entry: {0}")]
    Encode(#[source] serde_json::Error),

    /// A batch contained an entry owned by another step.
    #[error("log entry for step {found} appended to step {expected}")]
    StepMismatch {
        /// Step the batch was appended to.
        expected: StepId,
        /// Step the offending entry belongs to.
        found: StepId,
    },
}

/// Result type for steplog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is an OS-level not-found error.
    ///
    /// Returned by delete when the step has no file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }

    /// Check if this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::CreateDir { .. })
    }

    /// Build the not-found error for a step that has no stored log.
    pub fn step_not_found(step: StepId) -> Self {
        Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no log stored for step {}", step),
        ))
    }
}
