//! # Selection & Bulk Actions
//!
//! Row selection is a set of row ids. What the bulk-action bar offers is derived
//! purely from the selection size and the edit mode:
//!
//! | State | Bar | Edit | Delete | Save/Cancel |
//! |-------|-----|------|--------|-------------|
//! | none, 0 selected | hidden | - | - | no |
//! | none, 1 selected | shown | yes | yes | no |
//! | none, >1 selected | shown | no | yes | no |
//! | edit or add | shown | - | - | yes |
//!
//! The engine never talks to storage. Save and delete are raised to the host
//! through [`GridHost`](crate::api::GridHost); what the host does with them, and
//! whether it succeeds, is the host's business.

use crate::edit::EditMode;
use crate::model::{Row, RowId};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<RowId>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: RowId) {
        self.0.insert(id);
    }

    pub fn deselect(&mut self, id: &RowId) {
        self.0.remove(id);
    }

    /// Flips one row; returns whether it is now selected.
    pub fn toggle(&mut self, id: &RowId) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.clone());
            true
        }
    }

    /// Header checkbox: select every given row, or clear them all if they already are.
    pub fn toggle_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RowId> + Clone) {
        let all_selected = ids.clone().into_iter().all(|id| self.0.contains(id));
        if all_selected {
            for id in ids {
                self.0.remove(id);
            }
        } else {
            self.select_all(ids);
        }
    }

    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a RowId>) {
        self.0.extend(ids.into_iter().cloned());
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RowId> {
        self.0.iter()
    }

    /// Drops ids that are no longer in the data set.
    pub fn retain(&mut self, keep: impl Fn(&RowId) -> bool) {
        self.0.retain(|id| keep(id));
    }

    /// Selected rows as owned copies, in data order.
    pub fn materialize(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter()
            .filter(|r| self.0.contains(&r.id))
            .cloned()
            .collect()
    }

    /// Tri-state of the header checkbox over the given (visible) rows.
    pub fn header_state<'a>(&self, visible: impl IntoIterator<Item = &'a RowId>) -> HeaderCheck {
        let mut total = 0;
        let mut selected = 0;
        for id in visible {
            total += 1;
            if self.0.contains(id) {
                selected += 1;
            }
        }
        match selected {
            0 => HeaderCheck::None,
            n if n == total => HeaderCheck::All,
            _ => HeaderCheck::Some,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderCheck {
    None,
    Some,
    All,
}

/// Availability of the bulk actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkActions {
    pub bar_visible: bool,
    pub edit_enabled: bool,
    pub delete_enabled: bool,
    pub save_cancel_shown: bool,
    pub selected: usize,
}

impl BulkActions {
    pub fn derive(selected: usize, mode: EditMode) -> Self {
        match mode {
            EditMode::Edit | EditMode::Add => Self {
                bar_visible: true,
                save_cancel_shown: true,
                selected,
                ..Default::default()
            },
            EditMode::None => Self {
                bar_visible: selected > 0,
                edit_enabled: selected == 1,
                delete_enabled: selected > 0,
                save_cancel_shown: false,
                selected,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<RowId> {
        names.iter().map(|n| RowId::new(*n)).collect()
    }

    #[test]
    fn nothing_selected_hides_bar() {
        let actions = BulkActions::derive(0, EditMode::None);
        assert!(!actions.bar_visible);
        assert!(!actions.edit_enabled);
        assert!(!actions.delete_enabled);
        assert!(!actions.save_cancel_shown);
    }

    #[test]
    fn single_selection_enables_edit_and_delete() {
        let actions = BulkActions::derive(1, EditMode::None);
        assert!(actions.bar_visible);
        assert!(actions.edit_enabled);
        assert!(actions.delete_enabled);
        assert!(!actions.save_cancel_shown);
    }

    #[test]
    fn multi_selection_only_deletes() {
        let actions = BulkActions::derive(3, EditMode::None);
        assert!(!actions.edit_enabled);
        assert!(actions.delete_enabled);
    }

    #[test]
    fn editing_shows_save_and_cancel_only() {
        for mode in [EditMode::Edit, EditMode::Add] {
            let actions = BulkActions::derive(1, mode);
            assert!(actions.save_cancel_shown);
            assert!(!actions.edit_enabled);
            assert!(!actions.delete_enabled);
        }
    }

    #[test]
    fn toggle_and_clear() {
        let mut sel = Selection::new();
        let a = RowId::new("a");
        assert!(sel.toggle(&a));
        assert!(sel.contains(&a));
        assert!(!sel.toggle(&a));
        assert!(sel.is_empty());

        sel.select_all(&ids(&["a", "b"]));
        assert_eq!(sel.len(), 2);
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn toggle_all_selects_then_clears() {
        let mut sel = Selection::new();
        let visible = ids(&["a", "b", "c"]);
        sel.select(RowId::new("a"));

        sel.toggle_all(&visible);
        assert_eq!(sel.len(), 3);
        sel.toggle_all(&visible);
        assert!(sel.is_empty());
    }

    #[test]
    fn materialize_follows_data_order() {
        let rows = vec![Row::new("a"), Row::new("b"), Row::new("c")];
        let mut sel = Selection::new();
        sel.select(RowId::new("c"));
        sel.select(RowId::new("a"));

        let picked: Vec<_> = sel.materialize(&rows).into_iter().map(|r| r.id).collect();
        assert_eq!(picked, ids(&["a", "c"]));
    }

    #[test]
    fn header_state_tracks_visible_rows() {
        let visible = ids(&["a", "b"]);
        let mut sel = Selection::new();
        assert_eq!(sel.header_state(&visible), HeaderCheck::None);
        sel.select(RowId::new("a"));
        assert_eq!(sel.header_state(&visible), HeaderCheck::Some);
        sel.select(RowId::new("b"));
        assert_eq!(sel.header_state(&visible), HeaderCheck::All);
    }
}
