//! File-backed step log store.
//!
//! Each step's output lives in `<base_dir>/<step_id>.json`, one JSON object
//! per line (JSON Lines, despite the extension). Files are opened lazily on
//! the first append and kept open in a [`HandleCache`] until the step is
//! finished.
//!
//! ## Lifecycle
//!
//! ```text
//! log_append  ... log_append   (first append opens, later ones reuse)
//! log_finish                   (close + evict; idempotent)
//! log_find                     (any time, reads the file directly)
//! log_delete                   (unlinks under the step's slot lock)
//! ```
//!
//! ## Concurrency
//!
//! Any number of threads may call any operation. Appends to the same step
//! are serialized by the step's slot lock, so lines never interleave and
//! land in the order the slot lock is acquired. Appends to different steps
//! never contend beyond a map lookup. Only this process may write a step's
//! file; there is no cross-process coordination.

use crate::config::FileStoreConfig;
use crate::handle_cache::{HandleCache, SlotAccess};
use crate::sync_mode::SyncMode;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use steplog_core::codec::{self, encode_line_into};
use steplog_core::traits::check_batch;
use steplog_core::{Error, LogEntry, LogService, Result, StepId};
use tracing::{debug, info, trace, warn};

/// Suffix of every step log file.
const FILE_SUFFIX: &str = "json";

/// Step log store writing one JSON Lines file per step.
#[derive(Debug)]
pub struct FileLogStore {
    base_dir: PathBuf,
    sync_mode: SyncMode,
    handles: HandleCache,
}

impl FileLogStore {
    /// Open a store rooted at `base_dir` with the default sync mode.
    ///
    /// Creates the directory (and its parents) if it does not exist.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(FileStoreConfig::new(base_dir))
    }

    /// Open a store from an explicit configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the base directory is empty
    /// - [`Error::CreateDir`] if the base directory cannot be created
    pub fn with_config(config: FileStoreConfig) -> Result<Self> {
        config.validate()?;
        create_base_dir(&config.base_dir)?;

        info!(
            "Opened file log store at {} ({})",
            config.base_dir.display(),
            config.sync_mode.description()
        );

        Ok(FileLogStore {
            handles: HandleCache::with_sync_on_close(config.sync_mode.syncs_on_finish()),
            base_dir: config.base_dir,
            sync_mode: config.sync_mode,
        })
    }

    /// Directory holding the step files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Current sync mode.
    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    /// Path of the log file for `step`. Pure, no I/O.
    pub fn file_path(&self, step: StepId) -> PathBuf {
        self.base_dir.join(format!("{}.{}", step, FILE_SUFFIX))
    }

    /// Number of steps with a cached handle.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Check if `step` currently has an open handle.
    pub fn is_open(&self, step: StepId) -> bool {
        self.handles
            .get(step)
            .map(|handle| handle.is_open())
            .unwrap_or(false)
    }

    /// Close every cached handle.
    ///
    /// Called on shutdown; also run on drop. Returns the first close error.
    pub fn close_all(&self) -> Result<()> {
        let open = self.handles.len();
        if open > 0 {
            debug!("Closing {} open step log handles", open);
        }
        self.handles.close_all()
    }

    /// Write pre-encoded lines to the step's file with a single write call.
    ///
    /// Opens the file on first use. Retries with a fresh slot if the step
    /// was finished or deleted between the lookup and the write. A failed
    /// open leaves nothing cached for the step.
    fn write_lines(&self, step: StepId, buf: &[u8]) -> Result<()> {
        let path = self.file_path(step);
        let sync = self.sync_mode.syncs_on_append();

        loop {
            let handle = self.handles.slot(step);
            let written = handle.write_with(
                || {
                    debug!("Opening log file {} for append", path.display());
                    open_append(&path)
                },
                |file| {
                    file.write_all(buf)?;
                    if sync {
                        file.sync_data()?;
                    }
                    Ok(())
                },
            );

            match written {
                Ok(SlotAccess::Done(())) => {
                    trace!(step = step.as_i64(), bytes = buf.len(), "appended log lines");
                    return Ok(());
                }
                Ok(SlotAccess::Retired) => {
                    self.handles.discard_retired(step, &handle);
                }
                Err(e) => {
                    self.handles.discard_retired(step, &handle);
                    return Err(e.into());
                }
            }
        }
    }
}

impl LogService for FileLogStore {
    /// Read every entry stored for `step`.
    ///
    /// A missing file yields an empty vector. Blank lines are skipped. The
    /// first malformed line aborts the read with [`Error::Decode`]; no
    /// partial result is returned.
    fn log_find(&self, step: StepId) -> Result<Vec<LogEntry>> {
        let path = self.file_path(step);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let decoded = codec::decode_line(&line).map_err(|source| Error::Decode {
                path: path.clone(),
                line: index + 1,
                source,
            })?;
            if let Some(entry) = decoded {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn log_append(&self, entry: &LogEntry) -> Result<()> {
        let buf = codec::encode_line(entry)?;
        self.write_lines(entry.step_id, &buf)
    }

    /// Append a batch as one write.
    ///
    /// Either every line of the batch reaches the write call or none does.
    fn log_append_batch(&self, step: StepId, entries: &[LogEntry]) -> Result<()> {
        check_batch(step, entries)?;
        if entries.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::new();
        for entry in entries {
            encode_line_into(&mut buf, entry)?;
        }
        self.write_lines(step, &buf)
    }

    fn log_finish(&self, step: StepId) -> Result<()> {
        if self.handles.contains(step) {
            debug!("Finishing log for step {}", step);
        }
        self.handles.close(step)
    }

    /// Remove the step's file.
    ///
    /// The file is unlinked while the step's slot is locked and retired, so
    /// a concurrent append either lands before the delete or starts a new
    /// file after it. A cached handle is dropped without fsync, since its
    /// contents are being removed; closing it cannot fail. A missing file is
    /// reported as a not-found I/O error.
    fn log_delete(&self, step: StepId) -> Result<()> {
        let path = self.file_path(step);
        self.handles.remove_with(step, |was_open| {
            if was_open {
                warn!("Deleting log for step {} while its handle is still open", step);
            }
            fs::remove_file(&path)
        })?;
        debug!("Deleted log file {}", path.display());
        Ok(())
    }
}

impl Drop for FileLogStore {
    fn drop(&mut self) {
        if let Err(e) = self.close_all() {
            warn!("Failed to close step log handles on drop: {}", e);
        }
    }
}

/// Create the base directory with owner-only permissions.
fn create_base_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Open a step file for append, creating it owner-read/write if missing.
fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}
