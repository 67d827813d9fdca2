//! Debounced view-state writes.
//!
//! Every persisted slice has its own pending slot. Scheduling a slice replaces
//! whatever was pending for it and pushes its deadline out by the debounce
//! window, so a burst of keystrokes in a filter box becomes a single write.
//! Slices are independent: a sort change does not delay a pending filter write.
//!
//! There is no timer thread. The host drives time by calling
//! [`DebouncedWriter::poll`] from its event loop; dropping the writer flushes
//! whatever is still pending.

use super::{GridKey, SessionBackend, ViewStatePatch, ViewStateStore};
use crate::column::ColumnId;
use crate::filter::FilterState;
use crate::sort::SortSpec;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// The independently debounced parts of the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Sorting,
    Visibility,
    Filter,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

pub struct DebouncedWriter<B: SessionBackend> {
    store: ViewStateStore<B>,
    key: GridKey,
    window: Duration,
    sorting: Option<Pending<Vec<SortSpec>>>,
    visibility: Option<Pending<BTreeMap<ColumnId, bool>>>,
    filter: Option<Pending<FilterState>>,
}

impl<B: SessionBackend> DebouncedWriter<B> {
    pub fn new(store: ViewStateStore<B>, key: GridKey, window: Duration) -> Self {
        Self {
            store,
            key,
            window,
            sorting: None,
            visibility: None,
            filter: None,
        }
    }

    pub fn store(&self) -> &ViewStateStore<B> {
        &self.store
    }

    pub fn key(&self) -> &GridKey {
        &self.key
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn schedule_sorting(&mut self, sorting: Vec<SortSpec>, now: Instant) {
        self.sorting = Some(Pending {
            value: sorting,
            deadline: now + self.window,
        });
    }

    pub fn schedule_visibility(&mut self, visibility: BTreeMap<ColumnId, bool>, now: Instant) {
        self.visibility = Some(Pending {
            value: visibility,
            deadline: now + self.window,
        });
    }

    pub fn schedule_filter(&mut self, filter: FilterState, now: Instant) {
        self.filter = Some(Pending {
            value: filter,
            deadline: now + self.window,
        });
    }

    pub fn is_pending(&self, slice: Slice) -> bool {
        match slice {
            Slice::Sorting => self.sorting.is_some(),
            Slice::Visibility => self.visibility.is_some(),
            Slice::Filter => self.filter.is_some(),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.sorting.is_some() || self.visibility.is_some() || self.filter.is_some()
    }

    /// The earliest pending deadline, for hosts that want to sleep until it.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.sorting.as_ref().map(|p| p.deadline),
            self.visibility.as_ref().map(|p| p.deadline),
            self.filter.as_ref().map(|p| p.deadline),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Writes every slice whose deadline has passed. Returns `true` if a write happened.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut patch = ViewStatePatch::default();
        if let Some(p) = take_due(&mut self.sorting, now) {
            patch.sorting = Some(p);
        }
        if let Some(p) = take_due(&mut self.visibility, now) {
            patch.column_visibility = Some(p);
        }
        if let Some(p) = take_due(&mut self.filter, now) {
            patch.filter_state = Some(p);
        }
        self.write(patch)
    }

    /// Writes everything pending, regardless of deadlines.
    pub fn flush(&mut self) -> bool {
        let patch = ViewStatePatch {
            sorting: self.sorting.take().map(|p| p.value),
            column_visibility: self.visibility.take().map(|p| p.value),
            filter_state: self.filter.take().map(|p| p.value),
        };
        self.write(patch)
    }

    /// Forgets everything pending without writing it.
    pub fn discard(&mut self) {
        self.sorting = None;
        self.visibility = None;
        self.filter = None;
    }

    fn write(&self, patch: ViewStatePatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.store.merge_write(&self.key, patch);
        true
    }
}

impl<B: SessionBackend> Drop for DebouncedWriter<B> {
    fn drop(&mut self) {
        self.flush();
    }
}

fn take_due<T>(slot: &mut Option<Pending<T>>, now: Instant) -> Option<T> {
    if slot.as_ref().is_some_and(|p| p.deadline <= now) {
        slot.take().map(|p| p.value)
    } else {
        None
    }
}
