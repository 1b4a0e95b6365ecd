//! Entry point for opening a step log backend.
//!
//! [`LogStoreBuilder`] picks a backend and its settings and returns it as
//! an `Arc<dyn LogService>`, the only type the streaming, orchestration and
//! API layers need to know about.

use crate::{Error, FileLogStore, FileStoreConfig, LogService, MemoryLogStore, Result, SyncMode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Builder for a step log backend.
///
/// # Example
///
/// ```ignore
/// // Production: one file per step under a data directory
/// let logs = LogStoreBuilder::new()
///     .path("/var/lib/pipeline/logs")
///     .open()?;
///
/// // Settings from a TOML file, with the path overridden
/// let logs = LogStoreBuilder::new()
///     .config_file("/etc/pipeline/logs.toml")
///     .path("/tmp/logs")
///     .open()?;
///
/// // Unit testing: nothing touches disk
/// let logs = LogStoreBuilder::new().ephemeral().open()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogStoreBuilder {
    base_dir: Option<PathBuf>,
    sync_mode: Option<SyncMode>,
    config: Option<FileStoreConfig>,
    config_file: Option<PathBuf>,
    ephemeral: bool,
}

impl LogStoreBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory for step files.
    ///
    /// Overrides the directory of any config or config file.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the sync mode.
    pub fn sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = Some(sync_mode);
        self
    }

    /// Never fsync step files.
    ///
    /// Use for integration tests where you want files but not durability.
    pub fn no_sync(self) -> Self {
        self.sync_mode(SyncMode::None)
    }

    /// fsync after every append (safest, slowest).
    pub fn strict(self) -> Self {
        self.sync_mode(SyncMode::EveryAppend)
    }

    /// Start from an explicit configuration.
    pub fn config(mut self, config: FileStoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the configuration from a TOML file when opening.
    ///
    /// Takes precedence over [`LogStoreBuilder::config`].
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use the in-memory backend. No files are created.
    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Resolve the file store configuration.
    ///
    /// Config file, then explicit config, then individual overrides.
    pub fn build_config(&self) -> Result<FileStoreConfig> {
        let base = match (&self.config_file, &self.config) {
            (Some(path), _) => Some(FileStoreConfig::from_toml_file(path)?),
            (None, Some(config)) => Some(config.clone()),
            (None, None) => None,
        };

        let mut config = match (base, &self.base_dir) {
            (Some(config), Some(dir)) => FileStoreConfig {
                base_dir: dir.clone(),
                ..config
            },
            (Some(config), None) => config,
            (None, Some(dir)) => FileStoreConfig::new(dir.clone()),
            (None, None) => {
                return Err(Error::Config(
                    "file storage base path is required".to_string(),
                ))
            }
        };
        if let Some(sync_mode) = self.sync_mode {
            config.sync_mode = sync_mode;
        }
        config.validate()?;
        Ok(config)
    }

    /// Open a file store, ignoring [`LogStoreBuilder::ephemeral`].
    pub fn open_file(self) -> Result<FileLogStore> {
        FileLogStore::with_config(self.build_config()?)
    }

    /// Open the configured backend.
    pub fn open(self) -> Result<Arc<dyn LogService>> {
        if self.ephemeral {
            debug!("Opening ephemeral step log store");
            return Ok(Arc::new(MemoryLogStore::new()));
        }
        Ok(Arc::new(self.open_file()?))
    }
}

/// Open a file store at `path` with default settings.
pub fn open(path: impl AsRef<Path>) -> Result<Arc<dyn LogService>> {
    LogStoreBuilder::new().path(path).open()
}
