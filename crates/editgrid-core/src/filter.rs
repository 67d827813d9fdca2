//! # Filter Engine
//!
//! Text filtering runs along two orthogonal axes:
//!
//! - **Mode**: [`FilterMode::Global`] matches one text against *any* active column
//!   (OR); [`FilterMode::Individual`] gives every active column its own text and a
//!   row must pass *all* of them (AND).
//! - **Values**: per-key filter text. The key is a column id in individual mode, or
//!   the literal [`GLOBAL_KEY`] in global mode.
//!
//! All comparisons are case-insensitive substring matches on the column's
//! [`display_text`](crate::model::display_text).
//!
//! ## Match-All Rules
//!
//! Filtering must never hide everything by accident:
//! - An empty filter text matches every row.
//! - Global mode with no active columns matches every row.
//! - Individual mode with no active columns matches every row.
//!
//! ## Persistence Shape
//!
//! [`FilterState`] is stored as-is in the persisted view state, so switching modes
//! or deactivating a column never discards text the user typed; values for
//! inactive columns are simply ignored by the predicate.

use crate::column::{ColumnDef, ColumnId, ColumnSet};
use crate::model::{display_text, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value key used by global mode.
pub const GLOBAL_KEY: &str = "global";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Global,
    Individual,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub active_columns: Vec<ColumnId>,
    pub mode: FilterMode,
    pub values: BTreeMap<String, String>,
}

impl FilterState {
    /// Global mode with every filterable column active.
    pub fn for_columns(columns: &ColumnSet) -> Self {
        Self {
            active_columns: columns.filterable_ids(),
            ..Default::default()
        }
    }

    pub fn is_active(&self, column_id: &str) -> bool {
        self.active_columns.iter().any(|c| c == column_id)
    }

    /// Adds or removes a column from the active set.
    ///
    /// Columns that cannot be filtered (system, opted out, unknown) are ignored.
    /// Returns whether the state changed.
    pub fn toggle_column(&mut self, columns: &ColumnSet, column_id: &str) -> bool {
        if let Some(pos) = self.active_columns.iter().position(|c| c == column_id) {
            self.active_columns.remove(pos);
            return true;
        }

        match columns.get(column_id) {
            Some(col) if col.is_filterable() => {
                self.active_columns.push(column_id.to_string());
                if self.mode == FilterMode::Individual {
                    self.values.entry(column_id.to_string()).or_default();
                }
                true
            }
            _ => {
                tracing::debug!(column = column_id, "column is not filterable");
                false
            }
        }
    }

    /// Replaces the active set, keeping only filterable columns, in column order.
    pub fn set_active_columns(&mut self, columns: &ColumnSet, ids: &[ColumnId]) {
        self.active_columns = columns
            .iter()
            .filter(|c| c.is_filterable() && ids.contains(&c.id))
            .map(|c| c.id.clone())
            .collect();
    }

    /// Switches mode; entered text is kept.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn set_value(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.values.insert(key.into(), text.into());
    }

    pub fn set_global(&mut self, text: impl Into<String>) {
        self.set_value(GLOBAL_KEY, text);
    }

    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Resets every value; active columns and mode stay.
    pub fn clear_all(&mut self) {
        self.values.clear();
    }

    /// Whether any predicate can currently hide a row.
    pub fn is_filtering(&self) -> bool {
        match self.mode {
            FilterMode::Global => {
                !self.active_columns.is_empty() && !self.value(GLOBAL_KEY).trim().is_empty()
            }
            FilterMode::Individual => self
                .active_columns
                .iter()
                .any(|c| !self.value(c).trim().is_empty()),
        }
    }

    /// Builds the row predicate for the current state.
    pub fn predicate<'a>(&'a self, columns: &'a ColumnSet) -> RowPredicate<'a> {
        let active = self
            .active_columns
            .iter()
            .filter_map(|id| columns.get(id))
            .filter(|c| c.is_filterable());

        match self.mode {
            FilterMode::Global => {
                let needle = normalize(self.value(GLOBAL_KEY));
                let active: Vec<_> = active.collect();
                if needle.is_empty() || active.is_empty() {
                    RowPredicate::All
                } else {
                    RowPredicate::Any { columns: active, needle }
                }
            }
            FilterMode::Individual => {
                let terms: Vec<_> = active
                    .filter_map(|c| {
                        let needle = normalize(self.value(&c.id));
                        (!needle.is_empty()).then_some((c, needle))
                    })
                    .collect();
                if terms.is_empty() {
                    RowPredicate::All
                } else {
                    RowPredicate::Every { terms }
                }
            }
        }
    }

    pub fn matches(&self, columns: &ColumnSet, row: &Row) -> bool {
        self.predicate(columns).matches(row)
    }

    /// Filters rows, preserving their order.
    pub fn apply<'r>(&self, columns: &ColumnSet, rows: &'r [Row]) -> Vec<&'r Row> {
        let predicate = self.predicate(columns);
        rows.iter().filter(|r| predicate.matches(r)).collect()
    }
}

/// Compiled row predicate.
///
/// Needles are lowercased once when the predicate is built.
#[derive(Debug)]
pub enum RowPredicate<'a> {
    All,
    Any {
        columns: Vec<&'a ColumnDef>,
        needle: String,
    },
    Every {
        terms: Vec<(&'a ColumnDef, String)>,
    },
}

impl RowPredicate<'_> {
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            RowPredicate::All => true,
            RowPredicate::Any { columns, needle } => columns
                .iter()
                .any(|c| contains_ci(&display_text(&c.value(row)), needle)),
            RowPredicate::Every { terms } => terms
                .iter()
                .all(|(c, needle)| contains_ci(&display_text(&c.value(row)), needle)),
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn contains_ci(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![
            ColumnDef::new("select"),
            ColumnDef::new("name").primary(),
            ColumnDef::new("class"),
            ColumnDef::new("level"),
        ])
        .unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("1").with("name", "Aria").with("class", "Mage").with("level", 60),
            Row::new("2").with("name", "Borin").with("class", "Warrior").with("level", 45),
            Row::new("3").with("name", "Cael").with("class", "Magus").with("level", 12),
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn default_state_activates_filterable_columns() {
        let state = FilterState::for_columns(&columns());
        assert_eq!(state.mode, FilterMode::Global);
        assert_eq!(state.active_columns, vec!["name", "class", "level"]);
        assert!(!state.is_filtering());
    }

    #[test]
    fn global_matches_any_active_column() {
        let cols = columns();
        let data = rows();
        let mut state = FilterState::for_columns(&cols);

        state.set_global("MAG");
        assert_eq!(ids(&state.apply(&cols, &data)), vec!["1", "3"]);

        state.set_global("45");
        assert_eq!(ids(&state.apply(&cols, &data)), vec!["2"]);
    }

    #[test]
    fn global_with_no_active_columns_matches_all() {
        let cols = columns();
        let data = rows();
        let mut state = FilterState::for_columns(&cols);
        state.active_columns.clear();
        state.set_global("nothing-matches-this");

        assert_eq!(state.apply(&cols, &data).len(), 3);
    }

    #[test]
    fn individual_requires_every_active_column() {
        let cols = columns();
        let data = rows();
        let mut state = FilterState::for_columns(&cols);
        state.set_mode(FilterMode::Individual);
        state.set_value("class", "ma");
        state.set_value("name", "cae");

        assert_eq!(ids(&state.apply(&cols, &data)), vec!["3"]);
    }

    #[test]
    fn inactive_column_values_are_ignored_not_deleted() {
        let cols = columns();
        let data = rows();
        let mut state = FilterState::for_columns(&cols);
        state.set_mode(FilterMode::Individual);
        state.set_value("class", "warrior");
        assert_eq!(state.apply(&cols, &data).len(), 1);

        state.toggle_column(&cols, "class");
        assert_eq!(state.apply(&cols, &data).len(), 3);
        assert_eq!(state.value("class"), "warrior");
    }

    #[test]
    fn toggling_in_individual_mode_starts_with_match_all() {
        let cols = columns();
        let data = rows();
        let mut state = FilterState::default();
        state.set_mode(FilterMode::Individual);

        assert!(state.toggle_column(&cols, "name"));
        assert!(state.is_active("name"));
        assert_eq!(state.value("name"), "");
        assert_eq!(state.apply(&cols, &data).len(), 3);
    }

    #[test]
    fn system_and_unknown_columns_cannot_be_activated() {
        let cols = columns();
        let mut state = FilterState::default();
        assert!(!state.toggle_column(&cols, "select"));
        assert!(!state.toggle_column(&cols, "missing"));
        assert!(state.active_columns.is_empty());
    }

    #[test]
    fn switching_modes_keeps_text() {
        let cols = columns();
        let mut state = FilterState::for_columns(&cols);
        state.set_global("aria");
        state.set_mode(FilterMode::Individual);
        state.set_mode(FilterMode::Global);
        assert_eq!(state.value(GLOBAL_KEY), "aria");
    }

    #[test]
    fn clear_all_keeps_columns_and_mode() {
        let cols = columns();
        let mut state = FilterState::for_columns(&cols);
        state.set_mode(FilterMode::Individual);
        state.set_value("name", "a");
        state.clear_all();

        assert!(state.values.is_empty());
        assert_eq!(state.mode, FilterMode::Individual);
        assert_eq!(state.active_columns.len(), 3);
    }

    #[test]
    fn whitespace_only_text_is_match_all() {
        let cols = columns();
        let data = rows();
        let mut state = FilterState::for_columns(&cols);
        state.set_global("   ");
        assert_eq!(state.apply(&cols, &data).len(), 3);
    }

    #[test]
    fn set_active_columns_keeps_column_order_and_drops_system() {
        let cols = columns();
        let mut state = FilterState::default();
        state.set_active_columns(
            &cols,
            &["level".into(), "select".into(), "name".into()],
        );
        assert_eq!(state.active_columns, vec!["name", "level"]);
    }

    #[test]
    fn serializes_camel_case() {
        let mut state = FilterState::default();
        state.active_columns = vec!["name".into()];
        state.set_global("x");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"activeColumns": ["name"], "mode": "global", "values": {"global": "x"}})
        );
    }
}
