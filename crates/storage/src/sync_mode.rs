//! Sync mode for step log files.
//!
//! Defines when appended lines are fsynced to disk.

use serde::{Deserialize, Serialize};

/// Sync mode for step log writes.
///
/// Appends always go straight to the file with a single write call, so a
/// line is visible to readers as soon as `log_append` returns. The mode only
/// controls when the data is forced to stable storage.
///
/// # Mode Comparison
///
/// | Mode | fsync | Use Case |
/// |------|-------|----------|
/// | None | never | Tests, throwaway runners |
/// | OnFinish | once per step, at finish | Production (default) |
/// | EveryAppend | after every append | Audit logs, flaky hosts |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Never fsync.
    ///
    /// Lines written before a host crash may be lost. The OS still flushes
    /// them eventually on a clean shutdown.
    None,

    /// fsync a step's file when the step is finished or its handle evicted.
    ///
    /// A crash mid-step may lose the tail of that step's output, never
    /// the output of steps that already finished.
    #[default]
    OnFinish,

    /// fsync after every append (slow, maximum durability).
    ///
    /// Expect one disk flush per line.
    EveryAppend,
}

impl SyncMode {
    /// Check if appends must be followed by an fsync.
    pub fn syncs_on_append(&self) -> bool {
        matches!(self, SyncMode::EveryAppend)
    }

    /// Check if closing a handle must fsync it first.
    ///
    /// `EveryAppend` has nothing left to flush at close time.
    pub fn syncs_on_finish(&self) -> bool {
        matches!(self, SyncMode::OnFinish)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            SyncMode::None => "No fsync (fastest, tail of output lost on crash)",
            SyncMode::OnFinish => "fsync on step finish (balanced)",
            SyncMode::EveryAppend => "fsync every append (safest, slowest)",
        }
    }
}
