//! # Cell Rendering Dispatch
//!
//! Given a column, a row and the edit state, [`dispatch`] picks exactly one
//! [`CellView`]. The presentation layer paints it; the engine only decides *what*
//! goes in the cell.
//!
//! Dispatch order:
//!
//! 1. **System**: the column is a system column. Its own render function produces
//!    the content (checkboxes, action buttons); editability is never consulted.
//! 2. **Readonly**: not editing, the row is outside the edit set, or the column is
//!    not editable. Custom render output if the column has one, else the value
//!    text. Blank values become [`ReadonlyCell::Placeholder`] (a muted dash) so
//!    row heights stay uniform.
//! 3. **Editors**: text, number, textarea or select, chosen by the column's edit
//!    type (text when absent). A select with no options fails closed as
//!    [`CellView::SelectUnavailable`].
//!
//! ## Autofocus
//!
//! Exactly one cell per activation gets autofocus: the first editable, non-system
//! column (column order) of the first row in the edit set. Hidden columns and
//! selects without options are skipped, since neither can take input. See
//! [`autofocus_cell`].

use crate::column::{ColumnDef, ColumnId, ColumnSet, EditType, SelectOption};
use crate::edit::EditState;
use crate::model::{display_text, is_blank, Row, RowId, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default text for empty readonly cells (see `GridConfig::placeholder`).
pub const PLACEHOLDER: &str = "-";

/// Badge text for a select column without options.
pub const NO_OPTIONS_BADGE: &str = "no options";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReadonlyCell {
    Custom { content: String },
    Text { text: String },
    Placeholder,
}

/// Which renderer a cell uses, with everything it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "renderer", rename_all = "camelCase")]
pub enum CellView {
    System {
        content: Option<String>,
    },
    Readonly(ReadonlyCell),
    Text {
        value: String,
        autofocus: bool,
    },
    Number {
        raw: String,
        parsed: Option<f64>,
        autofocus: bool,
    },
    Textarea {
        value: String,
        autofocus: bool,
    },
    Select {
        value: Value,
        options: Vec<SelectOption>,
        autofocus: bool,
    },
    SelectUnavailable {
        badge: String,
    },
}

impl CellView {
    pub fn is_editor(&self) -> bool {
        matches!(
            self,
            CellView::Text { .. }
                | CellView::Number { .. }
                | CellView::Textarea { .. }
                | CellView::Select { .. }
                | CellView::SelectUnavailable { .. }
        )
    }

    pub fn has_autofocus(&self) -> bool {
        match self {
            CellView::Text { autofocus, .. }
            | CellView::Number { autofocus, .. }
            | CellView::Textarea { autofocus, .. }
            | CellView::Select { autofocus, .. } => *autofocus,
            _ => false,
        }
    }

    /// Plain-text rendition, for hosts without widgets (terminals, exports).
    /// Blank readonly cells show `placeholder`.
    pub fn plain_text(&self, placeholder: &str) -> String {
        match self {
            CellView::System { content } => content.clone().unwrap_or_default(),
            CellView::Readonly(ReadonlyCell::Custom { content }) => content.clone(),
            CellView::Readonly(ReadonlyCell::Text { text }) => text.clone(),
            CellView::Readonly(ReadonlyCell::Placeholder) => placeholder.to_string(),
            CellView::Text { value, .. } | CellView::Textarea { value, .. } => value.clone(),
            CellView::Number { raw, .. } => raw.clone(),
            CellView::Select { value, options, .. } => options
                .iter()
                .find(|o| &o.value == value)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| display_text(value)),
            CellView::SelectUnavailable { badge } => format!("[{}]", badge),
        }
    }
}

/// The one cell that gets autofocus in the current activation.
pub fn autofocus_cell(
    columns: &ColumnSet,
    visibility: &BTreeMap<ColumnId, bool>,
    edit: &EditState,
) -> Option<(RowId, ColumnId)> {
    if !edit.is_active() {
        return None;
    }
    let row = edit.first_row()?;
    let column = columns
        .editable()
        .filter(|c| visibility.get(&c.id).copied().unwrap_or(true))
        .find(|c| accepts_input(c))?;
    Some((row.clone(), column.id.clone()))
}

fn accepts_input(column: &ColumnDef) -> bool {
    !matches!(column.edit_type(), EditType::Select { options } if options.is_empty())
}

/// Selects the renderer for one cell.
///
/// `row` is the host row (or the synthesized temp row in add mode). Editor values
/// come from the working copy, not from `row`.
pub fn dispatch(
    column: &ColumnDef,
    row: &Row,
    edit: &EditState,
    autofocus: Option<&(RowId, ColumnId)>,
) -> CellView {
    if column.is_system() {
        let value = column.value(row);
        return CellView::System {
            content: column.render.as_ref().map(|r| r.render(row, &value)),
        };
    }

    let working = match edit.working_copy(&row.id) {
        Some(working) if edit.is_active() && column.is_editable() => working,
        _ => return readonly(column, row),
    };

    let value = working
        .get(column.field_key())
        .cloned()
        .unwrap_or_else(|| column.value(row));
    let focused = autofocus
        .map(|(r, c)| r == &row.id && c == &column.id)
        .unwrap_or(false);

    match column.edit_type() {
        EditType::Text => CellView::Text {
            value: display_text(&value),
            autofocus: focused,
        },
        EditType::Textarea => CellView::Textarea {
            value: display_text(&value),
            autofocus: focused,
        },
        EditType::Number => {
            let raw = display_text(&value);
            let parsed = match &value {
                Value::Number(n) => n.as_f64(),
                _ => raw.trim().parse::<f64>().ok(),
            };
            CellView::Number {
                raw,
                parsed,
                autofocus: focused,
            }
        }
        EditType::Select { options } if options.is_empty() => CellView::SelectUnavailable {
            badge: NO_OPTIONS_BADGE.to_string(),
        },
        EditType::Select { options } => CellView::Select {
            value,
            options: options.clone(),
            autofocus: focused,
        },
        // Filtered out by is_editable.
        EditType::None => readonly(column, row),
    }
}

fn readonly(column: &ColumnDef, row: &Row) -> CellView {
    let value = column.value(row);
    if let Some(renderer) = &column.render {
        return CellView::Readonly(ReadonlyCell::Custom {
            content: renderer.render(row, &value),
        });
    }
    if is_blank(&value) {
        CellView::Readonly(ReadonlyCell::Placeholder)
    } else {
        CellView::Readonly(ReadonlyCell::Text {
            text: display_text(&value),
        })
    }
}
