//! # Edit State Machine
//!
//! ```text
//!            start_edit(non-empty)            start_add
//!   ┌──────┐ ───────────────────▶ ┌──────┐   ┌──────┐
//!   │ none │                      │ edit │   │ add  │
//!   └──────┘ ◀─────────────────── └──────┘   └──────┘
//!      ▲      cancel / complete_save             │
//!      └─────────────────────────────────────────┘
//! ```
//!
//! There is no direct `edit ↔ add` transition. Starting either mode while another
//! is active is a no-op, as is starting edit with nothing selected or updating a
//! cell outside edit/add mode. These are internal-consistency slips of the UI, not
//! misuse of a contract, so they are logged at `debug` and otherwise ignored.
//!
//! ## Ownership
//!
//! The machine exclusively owns two maps of working copies:
//! - `editing`: what the user is typing,
//! - `original`: the pristine snapshot taken when the mode started.
//!
//! Both are deep clones of the host rows, so mutating a host row afterwards never
//! leaks into either map. While the mode is not `none` both maps have the same key
//! set: exactly `{temp}` in add mode, exactly the selection snapshot in edit mode.
//!
//! ## Saving
//!
//! [`EditState::save_changes`] is a pure read: it computes the payload and leaves
//! the state untouched. The host commits it and then calls
//! [`EditState::complete_save`]; until then the grid stays in edit mode with the
//! user's input intact, so a failed commit loses nothing.

use crate::column::ColumnSet;
use crate::model::{PartialRow, Row, RowId, Value};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    None,
    Edit,
    Add,
}

/// What a save hands to the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    pub updated_rows: Vec<Row>,
    pub new_row: Option<PartialRow>,
}

impl SavePayload {
    pub fn is_empty(&self) -> bool {
        self.updated_rows.is_empty() && self.new_row.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditState {
    mode: EditMode,
    editing: BTreeMap<RowId, PartialRow>,
    original: BTreeMap<RowId, PartialRow>,
    order: Vec<RowId>,
    /// Bumped on every activation; lets presentation layers apply autofocus once.
    activation: u64,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != EditMode::None
    }

    pub fn is_add_mode(&self) -> bool {
        self.mode == EditMode::Add
    }

    pub fn activation(&self) -> u64 {
        self.activation
    }

    /// Snapshots `rows` and enters edit mode.
    ///
    /// Returns whether the transition happened.
    pub fn start_edit<'r>(&mut self, rows: impl IntoIterator<Item = &'r Row>) -> bool {
        if self.is_active() {
            tracing::debug!(mode = ?self.mode, "start_edit ignored: already editing");
            return false;
        }

        for row in rows {
            if self.editing.contains_key(&row.id) {
                continue;
            }
            self.editing.insert(row.id.clone(), row.fields.clone());
            self.original.insert(row.id.clone(), row.fields.clone());
            self.order.push(row.id.clone());
        }

        if self.order.is_empty() {
            tracing::debug!("start_edit ignored: empty selection");
            return false;
        }

        self.mode = EditMode::Edit;
        self.activation += 1;
        true
    }

    /// Seeds the temp row with empty strings for every editable column.
    pub fn start_add(&mut self, columns: &ColumnSet) -> bool {
        if self.is_active() {
            tracing::debug!(mode = ?self.mode, "start_add ignored: already editing");
            return false;
        }

        let seed: PartialRow = columns
            .editable()
            .map(|c| (c.field_key().to_string(), Value::String(String::new())))
            .collect();

        let temp = RowId::temp();
        self.original.insert(temp.clone(), seed.clone());
        self.editing.insert(temp.clone(), seed);
        self.order.push(temp);
        self.mode = EditMode::Add;
        self.activation += 1;
        true
    }

    /// Merges one field into a row's working copy.
    ///
    /// No validation happens here; that's the host's job before committing.
    pub fn update_cell(&mut self, row_id: &RowId, field: &str, value: Value) -> bool {
        if !self.is_active() {
            tracing::debug!(row = %row_id, field, "update_cell ignored: not editing");
            return false;
        }
        match self.editing.get_mut(row_id) {
            Some(working) => {
                working.insert(field.to_string(), value);
                true
            }
            None => {
                tracing::debug!(row = %row_id, field, "update_cell ignored: row not in edit set");
                false
            }
        }
    }

    /// Computes the save payload without changing any state.
    pub fn save_changes(&self) -> SavePayload {
        match self.mode {
            EditMode::None => SavePayload::default(),
            EditMode::Add => SavePayload {
                updated_rows: Vec::new(),
                new_row: self.editing.get(&RowId::temp()).cloned(),
            },
            EditMode::Edit => SavePayload {
                updated_rows: self
                    .order
                    .iter()
                    .filter(|id| self.is_dirty(id))
                    .filter_map(|id| {
                        let fields = self.editing.get(id)?.clone();
                        Some(Row::from_partial(id.clone(), fields))
                    })
                    .collect(),
                new_row: None,
            },
        }
    }

    /// Whether a row's working copy differs from its snapshot in any field.
    pub fn is_dirty(&self, row_id: &RowId) -> bool {
        let (Some(editing), Some(original)) = (self.editing.get(row_id), self.original.get(row_id))
        else {
            return false;
        };
        let absent = Value::Null;
        editing
            .keys()
            .chain(original.keys())
            .any(|k| editing.get(k).unwrap_or(&absent) != original.get(k).unwrap_or(&absent))
    }

    /// Fields of a row that differ from the snapshot.
    pub fn changed_fields(&self, row_id: &RowId) -> Vec<String> {
        let (Some(editing), Some(original)) = (self.editing.get(row_id), self.original.get(row_id))
        else {
            return Vec::new();
        };
        let absent = Value::Null;
        let mut keys: Vec<String> = editing
            .keys()
            .chain(original.keys())
            .filter(|k| editing.get(*k).unwrap_or(&absent) != original.get(*k).unwrap_or(&absent))
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Host confirmed its commit; back to `none`.
    pub fn complete_save(&mut self) -> bool {
        self.reset()
    }

    /// Abandons all edits; back to `none`.
    pub fn cancel(&mut self) -> bool {
        self.reset()
    }

    fn reset(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.mode = EditMode::None;
        self.editing.clear();
        self.original.clear();
        self.order.clear();
        true
    }

    pub fn is_editing(&self, row_id: &RowId) -> bool {
        self.editing.contains_key(row_id)
    }

    pub fn working_copy(&self, row_id: &RowId) -> Option<&PartialRow> {
        self.editing.get(row_id)
    }

    pub fn original(&self, row_id: &RowId) -> Option<&PartialRow> {
        self.original.get(row_id)
    }

    /// Rows in the edit set, in the order they were snapshotted.
    pub fn edit_order(&self) -> &[RowId] {
        &self.order
    }

    /// The row that receives autofocus.
    pub fn first_row(&self) -> Option<&RowId> {
        self.order.first()
    }
}
