//! The log service interface.
//!
//! Streaming, orchestration and API layers depend only on [`LogService`];
//! the file store and the in-memory store both implement it.

use crate::error::{Error, Result};
use crate::types::{LogEntry, StepId};

/// Storage for the output lines of pipeline steps.
///
/// # Contract
///
/// - Entries for a step are returned in the order they were appended.
/// - `log_find` on a step with no stored log returns an empty vector, not
///   an error. `log_delete` on such a step returns a not-found error
///   ([`Error::is_not_found`]). Callers rely on this asymmetry to tell
///   "no logs yet" apart from "deletion failed".
/// - `log_finish` releases per-step resources and is idempotent. Appending
///   after finish is allowed and continues the existing log.
/// - `log_delete` discards unflushed data instead of syncing it. Its only
///   errors come from removing the stored log. An append racing a delete
///   either lands before it or starts a fresh log after it.
pub trait LogService: Send + Sync {
    /// Return every stored entry for `step`, in append order.
    fn log_find(&self, step: StepId) -> Result<Vec<LogEntry>>;

    /// Append one entry to the log of `entry.step_id`.
    fn log_append(&self, entry: &LogEntry) -> Result<()>;

    /// Append a batch of entries to the log of `step`.
    ///
    /// Every entry must belong to `step`; otherwise
    /// [`Error::StepMismatch`] is returned and nothing is written.
    fn log_append_batch(&self, step: StepId, entries: &[LogEntry]) -> Result<()> {
        check_batch(step, entries)?;
        for entry in entries {
            self.log_append(entry)?;
        }
        Ok(())
    }

    /// Mark the step's log finished and release its resources.
    fn log_finish(&self, step: StepId) -> Result<()>;

    /// Remove every stored entry for `step`.
    fn log_delete(&self, step: StepId) -> Result<()>;
}

/// Verify that every entry in a batch belongs to `step`.
pub fn check_batch(step: StepId, entries: &[LogEntry]) -> Result<()> {
    match entries.iter().find(|entry| entry.step_id != step) {
        Some(entry) => Err(Error::StepMismatch {
            expected: step,
            found: entry.step_id,
        }),
        None => Ok(()),
    }
}
