//! Core types for steplog.
//!
//! This crate defines the pieces every log backend shares:
//! - [`StepId`], [`LogEntry`], [`LogEntryType`]: the data model
//! - [`Error`]: the error taxonomy returned by every backend
//! - [`codec`]: the JSON Lines encoding of a step's log file
//! - [`LogService`]: the interface callers program against

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod traits;
pub mod types;

pub use codec::{decode_line, encode_line};
pub use error::{Error, Result};
pub use traits::LogService;
pub use types::{LogEntry, LogEntryType, StepId, Timestamp};
