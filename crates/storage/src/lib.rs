//! Storage backends for steplog.
//!
//! This crate implements the step log backends:
//! - FileLogStore: one JSON Lines file per step under a base directory
//! - HandleCache: step -> open append handle, one mutex over the map
//! - MemoryLogStore: ephemeral backend with the same contract
//! - SyncMode / FileStoreConfig: durability and configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod file_store;
pub mod handle_cache;
pub mod memory_store;
pub mod sync_mode;

pub use config::FileStoreConfig;
pub use file_store::FileLogStore;
pub use handle_cache::{HandleCache, StepHandle};
pub use memory_store::MemoryLogStore;
pub use sync_mode::SyncMode;
