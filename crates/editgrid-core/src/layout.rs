//! # Responsive Column Layout
//!
//! Columns are partitioned by priority:
//!
//! | Class | Members | Narrow screens |
//! |-------|---------|----------------|
//! | system | checkbox/action columns | always inline |
//! | primary | `priority = primary` | always inline |
//! | secondary | everything else | moved to the per-row panel |
//!
//! ## Collapse Mode
//!
//! ```text
//! collapse_mode = viewport_width < tablet_breakpoint && !secondary.is_empty()
//! ```
//!
//! It is recomputed on every layout pass with no hysteresis: crossing the
//! breakpoint in either direction flips the mode immediately. With no secondary
//! columns there is nothing to collapse, so the mode stays off at any width.
//!
//! In collapse mode each row gets a synthetic expand toggle inline, and its
//! secondary columns render in a detail panel only while the row id is in the
//! [`ExpandedRows`] set. Rows expand independently of each other.
//!
//! Classification is a pure function of the columns and the current width. It is
//! never cached: the viewport width is volatile.

use crate::column::{ColumnDef, ColumnId, ColumnSet, Priority};
use crate::model::RowId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Default width below which secondary columns collapse.
pub const DEFAULT_TABLET_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnClass {
    System,
    Primary,
    Secondary,
}

pub fn class_of(column: &ColumnDef) -> ColumnClass {
    if column.is_system() {
        ColumnClass::System
    } else if column.meta.priority == Priority::Primary {
        ColumnClass::Primary
    } else {
        ColumnClass::Secondary
    }
}

/// Column ids partitioned by class, each list in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub system: Vec<ColumnId>,
    pub primary: Vec<ColumnId>,
    pub secondary: Vec<ColumnId>,
}

/// Partitions the visible columns. System columns are always visible.
pub fn classify(columns: &ColumnSet, visibility: &BTreeMap<ColumnId, bool>) -> Classification {
    let mut out = Classification::default();
    for column in columns.iter() {
        let class = class_of(column);
        if class != ColumnClass::System && !is_visible(visibility, &column.id) {
            continue;
        }
        let bucket = match class {
            ColumnClass::System => &mut out.system,
            ColumnClass::Primary => &mut out.primary,
            ColumnClass::Secondary => &mut out.secondary,
        };
        bucket.push(column.id.clone());
    }
    out
}

fn is_visible(visibility: &BTreeMap<ColumnId, bool>, id: &str) -> bool {
    visibility.get(id).copied().unwrap_or(true)
}

pub fn collapse_mode(classification: &Classification, viewport_width: u32, breakpoint: u32) -> bool {
    viewport_width < breakpoint && !classification.secondary.is_empty()
}

/// One inline slot of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "column", rename_all = "camelCase")]
pub enum Slot {
    /// The synthetic expand/collapse control (collapse mode only).
    ExpandToggle,
    Column(ColumnId),
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    pub collapse_mode: bool,
    pub inline: Vec<Slot>,
    /// Columns shown in the expandable panel; empty outside collapse mode.
    pub panel: Vec<ColumnId>,
}

impl LayoutPlan {
    pub fn compute(
        columns: &ColumnSet,
        visibility: &BTreeMap<ColumnId, bool>,
        viewport_width: u32,
        breakpoint: u32,
    ) -> Self {
        let classification = classify(columns, visibility);
        let collapse = collapse_mode(&classification, viewport_width, breakpoint);

        // Column order is kept inline; collapse mode just drops secondaries.
        let mut inline = Vec::new();
        if collapse {
            inline.push(Slot::ExpandToggle);
        }
        for column in columns.iter() {
            let id = &column.id;
            let shown = classification.system.contains(id)
                || classification.primary.contains(id)
                || (!collapse && classification.secondary.contains(id));
            if shown {
                inline.push(Slot::Column(id.clone()));
            }
        }

        let panel = if collapse {
            classification.secondary
        } else {
            Vec::new()
        };

        Self {
            collapse_mode: collapse,
            inline,
            panel,
        }
    }

    pub fn inline_columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.inline.iter().filter_map(|slot| match slot {
            Slot::Column(id) => Some(id),
            Slot::ExpandToggle => None,
        })
    }

    /// Per-row view of this plan.
    pub fn for_row(&self, row_id: &RowId, expanded: &ExpandedRows) -> RowLayout {
        let is_expanded = self.collapse_mode && expanded.contains(row_id);
        RowLayout {
            row_id: row_id.clone(),
            inline: self.inline.clone(),
            expanded: is_expanded,
            panel: if is_expanded {
                self.panel.clone()
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowLayout {
    pub row_id: RowId,
    pub inline: Vec<Slot>,
    pub expanded: bool,
    pub panel: Vec<ColumnId>,
}

/// Rows whose detail panel is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedRows(BTreeSet<RowId>);

impl ExpandedRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, row_id: &RowId) -> bool {
        self.0.contains(row_id)
    }

    pub fn expand(&mut self, row_id: RowId) {
        self.0.insert(row_id);
    }

    pub fn collapse(&mut self, row_id: &RowId) {
        self.0.remove(row_id);
    }

    /// Flips a row; returns the new expanded state.
    pub fn toggle(&mut self, row_id: &RowId) -> bool {
        if self.0.remove(row_id) {
            false
        } else {
            self.0.insert(row_id.clone());
            true
        }
    }

    pub fn collapse_all(&mut self) {
        self.0.clear();
    }

    /// Drops ids that no longer exist in the data.
    pub fn retain(&mut self, keep: impl Fn(&RowId) -> bool) {
        self.0.retain(|id| keep(id));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
