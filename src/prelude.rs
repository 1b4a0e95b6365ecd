//! Convenient imports for steplog.
//!
//! ```ignore
//! use steplog::prelude::*;
//!
//! let logs = LogStoreBuilder::new().path("./logs").open()?;
//! logs.log_append(&LogEntry::new(StepId::new(1), 0, LogEntryType::Stdout, "hello"))?;
//! ```

// Entry points
pub use crate::builder::{open, LogStoreBuilder};

// Error handling
pub use crate::{Error, Result};

// Interface and backends
pub use crate::{FileLogStore, LogService, MemoryLogStore};

// Core types
pub use crate::{LogEntry, LogEntryType, StepId, Timestamp};

// Configuration
pub use crate::{FileStoreConfig, SyncMode};
