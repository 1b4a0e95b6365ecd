//! File store configuration.
//!
//! The only required setting is the base directory. Configuration can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! base_dir = "/var/lib/pipeline/logs"
//! sync_mode = "on_finish"
//! ```

use crate::sync_mode::SyncMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use steplog_core::{Error, Result};

/// Configuration for [`FileLogStore`](crate::FileLogStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStoreConfig {
    /// Directory holding one log file per step.
    pub base_dir: PathBuf,
    /// When appended lines are fsynced.
    #[serde(default)]
    pub sync_mode: SyncMode,
}

impl FileStoreConfig {
    /// Configuration rooted at `base_dir` with the default sync mode.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FileStoreConfig {
            base_dir: base_dir.into(),
            sync_mode: SyncMode::default(),
        }
    }

    /// Set the sync mode.
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Parse configuration from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: FileStoreConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Reject an empty base directory.
    pub fn validate(&self) -> Result<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(Error::Config(
                "file storage base path is required".to_string(),
            ));
        }
        Ok(())
    }
}
