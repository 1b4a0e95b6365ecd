//! In-memory step log store.
//!
//! Ephemeral backend with the same contract as the file store. Nothing
//! touches disk and everything is lost on drop. Used by tests and by
//! embedders that only stream logs live.

use parking_lot::RwLock;
use std::collections::HashMap;
use steplog_core::traits::check_batch;
use steplog_core::{Error, LogEntry, LogService, Result, StepId};

/// Step log store backed by a map of vectors.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    steps: RwLock<HashMap<StepId, Vec<LogEntry>>>,
}

impl MemoryLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps with stored entries.
    pub fn step_count(&self) -> usize {
        self.steps.read().len()
    }
}

impl LogService for MemoryLogStore {
    fn log_find(&self, step: StepId) -> Result<Vec<LogEntry>> {
        Ok(self.steps.read().get(&step).cloned().unwrap_or_default())
    }

    fn log_append(&self, entry: &LogEntry) -> Result<()> {
        self.steps
            .write()
            .entry(entry.step_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    fn log_append_batch(&self, step: StepId, entries: &[LogEntry]) -> Result<()> {
        check_batch(step, entries)?;
        if entries.is_empty() {
            return Ok(());
        }
        self.steps
            .write()
            .entry(step)
            .or_default()
            .extend_from_slice(entries);
        Ok(())
    }

    /// Nothing to release.
    fn log_finish(&self, _step: StepId) -> Result<()> {
        Ok(())
    }

    fn log_delete(&self, step: StepId) -> Result<()> {
        match self.steps.write().remove(&step) {
            Some(_) => Ok(()),
            None => Err(Error::step_not_found(step)),
        }
    }
}
