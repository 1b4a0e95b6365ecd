//! Cache of open append handles, keyed by step.
//!
//! Appending a line must not cost an open/close pair, so the first append
//! to a step opens its file and every later append reuses the handle until
//! the step is finished.
//!
//! # Design
//!
//! - One `parking_lot::Mutex` guards the step -> handle map. It is held only
//!   for lookups and map mutations, never across file I/O.
//! - Each map entry is an `Arc<StepHandle>`, a per-step slot with its own
//!   mutex. Opening, writing and closing a step's file all happen under the
//!   slot lock, so concurrent appends to one step never interleave bytes
//!   and never open two handles.
//! - Closing removes the slot from the map first, drops the map lock, and
//!   only then closes the file. A slow close for step A never delays a
//!   lookup for step B.
//!
//! A closed slot is marked retired. An appender that fetched the slot just
//! before it was closed sees the mark and fetches a fresh slot from the map.
//! A slot whose first open fails is retired too, and dropped from the map
//! by [`HandleCache::discard_retired`], so a broken directory never leaves
//! entries behind.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::sync::Arc;
use steplog_core::{Result, StepId};

/// State of a per-step slot.
#[derive(Debug)]
enum SlotState {
    /// In the map, file not opened yet.
    Empty,
    /// File open for append.
    Open(File),
    /// Closed, or never opened because the open failed; must not be reopened.
    Retired,
}

/// Outcome of [`StepHandle::write_with`].
#[derive(Debug, PartialEq, Eq)]
pub enum SlotAccess<T> {
    /// The write ran against the slot's file.
    Done(T),
    /// The slot was closed before the write could run.
    Retired,
}

/// Per-step slot owning the open handle for one step's file.
#[derive(Debug)]
pub struct StepHandle {
    step: StepId,
    state: Mutex<SlotState>,
}

impl StepHandle {
    fn empty(step: StepId) -> Self {
        StepHandle {
            step,
            state: Mutex::new(SlotState::Empty),
        }
    }

    fn with_file(step: StepId, file: File) -> Self {
        StepHandle {
            step,
            state: Mutex::new(SlotState::Open(file)),
        }
    }

    /// Step this slot belongs to.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Check if the slot currently holds an open file.
    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Open(_))
    }

    /// Check if the slot has been closed.
    pub fn is_retired(&self) -> bool {
        matches!(*self.state.lock(), SlotState::Retired)
    }

    /// Run `write` against the slot's file, opening it with `open` first if
    /// needed.
    ///
    /// Holds the slot lock for the whole open-or-reuse-and-write sequence.
    /// A failed open retires the slot; the caller should pass it to
    /// [`HandleCache::discard_retired`]. A failed write leaves the handle
    /// cached so the next append retries against it.
    pub fn write_with<T>(
        &self,
        open: impl FnOnce() -> io::Result<File>,
        write: impl FnOnce(&mut File) -> io::Result<T>,
    ) -> io::Result<SlotAccess<T>> {
        let mut state = self.state.lock();
        match &mut *state {
            SlotState::Open(file) => return write(file).map(SlotAccess::Done),
            SlotState::Retired => return Ok(SlotAccess::Retired),
            SlotState::Empty => {}
        }

        let mut file = match open() {
            Ok(file) => file,
            Err(e) => {
                *state = SlotState::Retired;
                return Err(e);
            }
        };
        let written = write(&mut file);
        *state = SlotState::Open(file);
        written.map(SlotAccess::Done)
    }

    /// Close the slot's file, fsyncing it first when `sync` is set.
    ///
    /// Idempotent: a retired slot stays retired.
    fn retire(&self, sync: bool) -> io::Result<()> {
        let previous = std::mem::replace(&mut *self.state.lock(), SlotState::Retired);
        match previous {
            SlotState::Open(file) if sync => file.sync_all(),
            _ => Ok(()),
        }
    }
}

/// Thread-safe registry of step -> open append handle.
///
/// Owned by one store instance; there is no process-wide table. Entries
/// are never evicted under memory pressure, only by [`HandleCache::close`],
/// [`HandleCache::close_all`], [`HandleCache::remove_with`] or
/// [`HandleCache::discard_retired`].
#[derive(Debug, Default)]
pub struct HandleCache {
    handles: Mutex<HashMap<StepId, Arc<StepHandle>>>,
    sync_on_close: bool,
}

impl HandleCache {
    /// Create an empty cache that closes handles without fsync.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache; when `sync_on_close` is set, every handle is
    /// fsynced before it is closed.
    pub fn with_sync_on_close(sync_on_close: bool) -> Self {
        HandleCache {
            handles: Mutex::new(HashMap::new()),
            sync_on_close,
        }
    }

    /// Return the cached slot for `step`, if any.
    pub fn get(&self, step: StepId) -> Option<Arc<StepHandle>> {
        self.handles.lock().get(&step).cloned()
    }

    /// Install an open file as the handle for `step`.
    ///
    /// Returns the slot it displaced. The cache does not close it; dropping
    /// the returned slot closes its file without fsync.
    pub fn set(&self, step: StepId, file: File) -> Option<Arc<StepHandle>> {
        let handle = Arc::new(StepHandle::with_file(step, file));
        self.handles.lock().insert(step, handle)
    }

    /// Return the slot for `step`, inserting an empty one if none is cached.
    ///
    /// The slot's file is opened lazily by [`StepHandle::write_with`].
    pub fn slot(&self, step: StepId) -> Arc<StepHandle> {
        self.handles
            .lock()
            .entry(step)
            .or_insert_with(|| Arc::new(StepHandle::empty(step)))
            .clone()
    }

    /// Drop `handle` from the map if it is retired and still the cached
    /// slot for `step`.
    ///
    /// Returns `true` if the entry was removed. The slot lock is only taken
    /// before the map lock, never while holding it.
    pub fn discard_retired(&self, step: StepId, handle: &Arc<StepHandle>) -> bool {
        if !handle.is_retired() {
            return false;
        }
        let mut handles = self.handles.lock();
        let current = handles
            .get(&step)
            .map(|cached| Arc::ptr_eq(cached, handle))
            .unwrap_or(false);
        if current {
            handles.remove(&step);
        }
        current
    }

    /// Retire the slot for `step` and run `remove` while still holding its
    /// lock.
    ///
    /// Any open file is closed without fsync; its contents are about to be
    /// removed. `remove` receives whether a file was open. Appenders blocked
    /// on the slot see it retired once `remove` has run and start over with
    /// a fresh slot, so nothing is written to a file `remove` unlinked.
    pub fn remove_with<T>(
        &self,
        step: StepId,
        remove: impl FnOnce(bool) -> io::Result<T>,
    ) -> Result<T> {
        loop {
            let handle = self.slot(step);
            let mut state = handle.state.lock();
            let previous = std::mem::replace(&mut *state, SlotState::Retired);
            let was_open = match previous {
                // Retired by someone else after we fetched it; a newer slot
                // may hold the file
                SlotState::Retired => {
                    drop(state);
                    self.discard_retired(step, &handle);
                    continue;
                }
                SlotState::Open(file) => {
                    drop(file);
                    true
                }
                SlotState::Empty => false,
            };

            let removed = remove(was_open);
            drop(state);
            self.discard_retired(step, &handle);
            return Ok(removed?);
        }
    }

    /// Close and evict the handle for `step`.
    ///
    /// A no-op when nothing is cached. The entry leaves the map before the
    /// file is closed, and the map lock is released before the close.
    pub fn close(&self, step: StepId) -> Result<()> {
        let removed = self.handles.lock().remove(&step);
        match removed {
            Some(handle) => Ok(handle.retire(self.sync_on_close)?),
            None => Ok(()),
        }
    }

    /// Close and evict every cached handle.
    ///
    /// Every handle is closed even if some fail; the first error is
    /// returned.
    pub fn close_all(&self) -> Result<()> {
        let drained: Vec<Arc<StepHandle>> =
            self.handles.lock().drain().map(|(_, handle)| handle).collect();

        let mut first_err = None;
        for handle in drained {
            if let Err(e) = handle.retire(self.sync_on_close) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Check if a slot is cached for `step`.
    pub fn contains(&self, step: StepId) -> bool {
        self.handles.lock().contains_key(&step)
    }

    /// Number of cached slots.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }
}
