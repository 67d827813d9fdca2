//! # View-State Persistence
//!
//! A grid remembers how the user looked at it (sorting, visible columns and
//! filters) for the rest of the session. Row data is never persisted here; that
//! belongs to the host.
//!
//! ## Layers
//!
//! | Layer | Type | Job |
//! |-------|------|-----|
//! | Raw storage | [`SessionBackend`] | load/save opaque blobs by key |
//! | Record | [`ViewStateStore`] | JSON (de)serialization, defaults, merge-on-write, error policy |
//! | Scheduling | [`DebouncedWriter`] | coalesce bursts of changes, flush on poll and on drop |
//!
//! ## Record Shape
//!
//! ```json
//! {
//!   "sorting": [{"columnId": "name", "direction": "asc"}],
//!   "columnVisibility": {"notes": false},
//!   "filterState": {"activeColumns": ["name"], "mode": "global", "values": {"global": "bor"}}
//! }
//! ```
//!
//! A missing record, a missing field, or a corrupt blob all read as defaults.
//! `filterState` stays absent until a filter is actually written: its default
//! depends on the grid's columns, which only the grid knows.
//!
//! ## Merge-on-Write
//!
//! Writers only ever carry the slices they changed ([`ViewStatePatch`]). A write
//! reads the current record, overlays the patch and stores the result in one
//! synchronous call, so a pending sort write cannot clobber a filter written a
//! moment earlier.
//!
//! ## Failure Policy
//!
//! Persistence is best-effort. Read and write failures are logged with
//! `tracing::warn!` and swallowed: the grid keeps its state in memory and it
//! simply does not survive navigation.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: one file per key inside a session directory.
//! - [`mem_backend::MemBackend`]: in memory, with write-failure simulation for tests.

use crate::column::ColumnId;
use crate::error::Result;
use crate::filter::FilterState;
use crate::sort::SortSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod backend;
pub mod debounce;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::SessionBackend;
pub use debounce::{DebouncedWriter, Slice};

/// Prefix shared by every key the grid writes.
pub const KEY_PREFIX: &str = "editgrid:";

/// The persisted record for one grid instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewState {
    pub sorting: Vec<SortSpec>,
    pub column_visibility: BTreeMap<ColumnId, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_state: Option<FilterState>,
}

/// A partial [`ViewState`]: `None` slices are left untouched by a write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewStatePatch {
    pub sorting: Option<Vec<SortSpec>>,
    pub column_visibility: Option<BTreeMap<ColumnId, bool>>,
    pub filter_state: Option<FilterState>,
}

impl ViewStatePatch {
    pub fn sorting(sorting: Vec<SortSpec>) -> Self {
        Self {
            sorting: Some(sorting),
            ..Default::default()
        }
    }

    pub fn column_visibility(visibility: BTreeMap<ColumnId, bool>) -> Self {
        Self {
            column_visibility: Some(visibility),
            ..Default::default()
        }
    }

    pub fn filter_state(filter: FilterState) -> Self {
        Self {
            filter_state: Some(filter),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sorting.is_none() && self.column_visibility.is_none() && self.filter_state.is_none()
    }

    /// Later patch wins per slice.
    pub fn merge(&mut self, other: ViewStatePatch) {
        if other.sorting.is_some() {
            self.sorting = other.sorting;
        }
        if other.column_visibility.is_some() {
            self.column_visibility = other.column_visibility;
        }
        if other.filter_state.is_some() {
            self.filter_state = other.filter_state;
        }
    }

    pub fn apply_to(self, state: &mut ViewState) {
        if let Some(sorting) = self.sorting {
            state.sorting = sorting;
        }
        if let Some(visibility) = self.column_visibility {
            state.column_visibility = visibility;
        }
        if let Some(filter) = self.filter_state {
            state.filter_state = Some(filter);
        }
    }
}

/// Namespace of one grid instance inside the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey(String);

impl GridKey {
    /// Derives the key from a page path, ignoring query, fragment and a trailing slash.
    ///
    /// `/characters/?page=2#top` and `/characters` share a key.
    pub fn from_path(path: &str) -> Self {
        let end = path.find(['?', '#']).unwrap_or(path.len());
        let mut path = &path[..end];
        while path.len() > 1 && path.ends_with('/') {
            path = &path[..path.len() - 1];
        }
        if path.is_empty() {
            path = "/";
        }
        Self(format!("{}{}", KEY_PREFIX, path))
    }

    /// A host-supplied instance id, for pages showing more than one grid.
    pub fn explicit(id: &str) -> Self {
        if id.starts_with(KEY_PREFIX) {
            Self(id.to_string())
        } else {
            Self(format!("{}{}", KEY_PREFIX, id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reads and merge-writes [`ViewState`] records on top of a [`SessionBackend`].
pub struct ViewStateStore<B: SessionBackend> {
    backend: B,
}

impl<B: SessionBackend> ViewStateStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The stored record, or defaults when absent or unreadable.
    pub fn read(&self, key: &GridKey) -> ViewState {
        match self.try_read(key) {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read view state, using defaults");
                ViewState::default()
            }
        }
    }

    /// Strict read: `Ok(None)` when no record exists.
    pub fn try_read(&self, key: &GridKey) -> Result<Option<ViewState>> {
        match self.backend.load(key.as_str())? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    /// Read-merge-write in one call. Failures are logged and reported as `false`.
    pub fn merge_write(&self, key: &GridKey, patch: ViewStatePatch) -> bool {
        if patch.is_empty() {
            return true;
        }
        match self.try_merge_write(key, patch) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to persist view state");
                false
            }
        }
    }

    fn try_merge_write(&self, key: &GridKey, patch: ViewStatePatch) -> Result<()> {
        // A corrupt record is replaced rather than blocking every later write.
        let mut state = match self.try_read(key) {
            Ok(state) => state.unwrap_or_default(),
            Err(crate::error::GridError::Serialization(_)) => ViewState::default(),
            Err(e) => return Err(e),
        };
        patch.apply_to(&mut state);
        let blob = serde_json::to_string(&state)?;
        self.backend.save(key.as_str(), &blob)?;
        tracing::debug!(key = %key, "view state written");
        Ok(())
    }

    /// Every grid key stored in this session.
    pub fn keys(&self) -> Result<Vec<GridKey>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(KEY_PREFIX))
            .map(GridKey)
            .collect())
    }

    /// Removes one grid's record.
    pub fn clear(&self, key: &GridKey) -> Result<()> {
        self.backend.remove(key.as_str())?;
        tracing::info!(key = %key, "view state cleared");
        Ok(())
    }

    /// Removes every grid record of the session. Returns how many were removed.
    pub fn clear_session(&self) -> Result<usize> {
        let count = self.backend.clear(KEY_PREFIX)?;
        tracing::info!(count, "session view state cleared");
        Ok(count)
    }
}
