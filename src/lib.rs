//! # steplog
//!
//! Durable per-step log store for a pipeline execution platform.
//!
//! Every pipeline step emits timestamped output lines. steplog persists
//! them as one append-only JSON Lines file per step and serves them back
//! in full.
//!
//! ## Quick Start
//!
//! ```ignore
//! use steplog::prelude::*;
//!
//! let logs = LogStoreBuilder::new().path("./logs").open()?;
//! let step = StepId::new(1);
//!
//! logs.log_append(&LogEntry::new(step, 0, LogEntryType::Stdout, "building"))?;
//! logs.log_append(&LogEntry::new(step, 1, LogEntryType::Stderr, "warning"))?;
//! logs.log_finish(step)?;
//!
//! let entries = logs.log_find(step)?;
//! assert_eq!(entries.len(), 2);
//! ```
//!
//! ## Backends
//!
//! - [`FileLogStore`] - one file per step, handles cached until finish
//! - [`MemoryLogStore`] - ephemeral, for tests
//!
//! Callers should hold an `Arc<dyn LogService>` and never depend on the
//! backend type.

#![warn(missing_docs)]

mod builder;

pub mod prelude;

pub use builder::{open, LogStoreBuilder};

// Re-export core types
pub use steplog_core::codec;
pub use steplog_core::{Error, LogEntry, LogEntryType, LogService, Result, StepId, Timestamp};

// Re-export backends
pub use steplog_storage::{
    FileLogStore, FileStoreConfig, HandleCache, MemoryLogStore, StepHandle, SyncMode,
};
