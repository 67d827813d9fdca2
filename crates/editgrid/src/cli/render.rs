//! Terminal painting of a grid.
//!
//! The engine decides *what* goes in each cell ([`CellView`]) and *where* it goes
//! ([`LayoutPlan`]); this module only turns that into aligned text. Widths are
//! measured with `unicode-width` so wide glyphs don't break alignment, and
//! muted elements (placeholders, disabled actions) are dimmed with `console`,
//! which drops the styling when stdout is not a terminal.

use console::style;
use editgrid_core::api::GridApi;
use editgrid_core::column::ColumnDef;
use editgrid_core::layout::Slot;
use editgrid_core::model::{Row, RowId};
use editgrid_core::persist::SessionBackend;
use editgrid_core::render::{CellView, ReadonlyCell};
use editgrid_core::selection::{BulkActions, HeaderCheck};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL_WIDTH: usize = 32;
const GUTTER: &str = "  ";
const PANEL_INDENT: &str = "    ";
const EXPANDED_MARKER: &str = "▾";
const COLLAPSED_MARKER: &str = "▸";

/// One rendered cell: its text and whether it should be dimmed.
struct Painted {
    text: String,
    muted: bool,
}

impl Painted {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            muted: false,
        }
    }

    fn muted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            muted: true,
        }
    }
}

pub fn grid<B: SessionBackend>(api: &GridApi<B>) -> String {
    let plan = api.layout();
    let rows = api.display_rows();

    let header: Vec<Painted> = plan
        .inline
        .iter()
        .map(|slot| header_cell(api, slot))
        .collect();
    let body: Vec<Vec<Painted>> = rows
        .iter()
        .map(|row| {
            plan.inline
                .iter()
                .map(|slot| body_cell(api, row, slot))
                .collect()
        })
        .collect();

    let widths = column_widths(&plan.inline, &header, &body);

    let mut out = String::new();
    out.push_str(&line(&header, &widths));
    out.push('\n');
    for (row, cells) in rows.iter().zip(body.iter()) {
        out.push_str(&line(cells, &widths));
        out.push('\n');

        let row_layout = api.row_layout(&row.id);
        for column_id in &row_layout.panel {
            if let Some(column) = api.columns().get(column_id) {
                let cell = paint(api, row, column);
                out.push_str(&format!(
                    "{}{}: {}\n",
                    PANEL_INDENT,
                    column.header_text(),
                    styled(&cell, cell.text.width())
                ));
            }
        }
    }

    if rows.is_empty() {
        out.push_str(&format!("{}\n", style("(no rows)").dim()));
    }

    if let Some(bar) = bulk_bar(&api.bulk_actions(), api.is_add_mode()) {
        out.push_str(&bar);
        out.push('\n');
    }
    out.push_str(&footer(api));
    out.push('\n');
    out
}

fn header_cell<B: SessionBackend>(api: &GridApi<B>, slot: &Slot) -> Painted {
    match slot {
        Slot::ExpandToggle => Painted::plain(" "),
        Slot::Column(id) => match api.columns().get(id) {
            Some(column) if column.header.is_none() && column.id == "select" => {
                Painted::plain(match api.header_check() {
                    HeaderCheck::None => "[ ]",
                    HeaderCheck::Some => "[-]",
                    HeaderCheck::All => "[x]",
                })
            }
            Some(column) => Painted::plain(column.header_content(api.header_check())),
            None => Painted::plain(id.as_str()),
        },
    }
}

fn body_cell<B: SessionBackend>(api: &GridApi<B>, row: &Row, slot: &Slot) -> Painted {
    match slot {
        Slot::ExpandToggle => {
            if api.row_layout(&row.id).expanded {
                Painted::plain(EXPANDED_MARKER)
            } else {
                Painted::plain(COLLAPSED_MARKER)
            }
        }
        Slot::Column(id) => match api.columns().get(id) {
            Some(column) => paint(api, row, column),
            None => Painted::plain(""),
        },
    }
}

fn paint<B: SessionBackend>(api: &GridApi<B>, row: &Row, column: &ColumnDef) -> Painted {
    let Some(view) = api.cell(&row.id, &column.id) else {
        return Painted::plain("");
    };
    let placeholder = api.config().placeholder.as_str();
    match view {
        CellView::System { content: None } => system_fallback(api, &row.id, column),
        CellView::Readonly(ReadonlyCell::Placeholder) | CellView::SelectUnavailable { .. } => {
            Painted::muted(view.plain_text(placeholder))
        }
        other => Painted::plain(single_line(&other.plain_text(placeholder))),
    }
}

/// System columns without a renderer: the checkbox is painted from the selection.
fn system_fallback<B: SessionBackend>(api: &GridApi<B>, id: &RowId, column: &ColumnDef) -> Painted {
    if column.id != "select" {
        return Painted::plain("");
    }
    if id.is_temp() {
        Painted::muted("new")
    } else if api.selection().contains(id) {
        Painted::plain("[x]")
    } else {
        Painted::plain("[ ]")
    }
}

fn column_widths(slots: &[Slot], header: &[Painted], body: &[Vec<Painted>]) -> Vec<usize> {
    (0..slots.len())
        .map(|i| {
            let widest = body
                .iter()
                .map(|cells| cells[i].text.width())
                .chain(std::iter::once(header[i].text.width()))
                .max()
                .unwrap_or(0);
            widest.min(MAX_CELL_WIDTH)
        })
        .collect()
}

fn line(cells: &[Painted], widths: &[usize]) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| styled(cell, *width))
        .collect();
    parts.join(GUTTER).trim_end().to_string()
}

/// Truncates or pads to `width`, then applies the cell's style.
fn styled(cell: &Painted, width: usize) -> String {
    let fitted = fit(&cell.text, width);
    if cell.muted {
        style(fitted).dim().to_string()
    } else {
        fitted
    }
}

fn fit(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{}{}", text, " ".repeat(width - current));
    }
    let mut out = truncate_to_width(text, width.saturating_sub(1));
    out.push('…');
    let used = out.width();
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn truncate_to_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

fn bulk_bar(actions: &BulkActions, add_mode: bool) -> Option<String> {
    if !actions.bar_visible {
        return None;
    }
    let action = |label: &str, enabled: bool| {
        let text = format!("[{}]", label);
        if enabled {
            text
        } else {
            style(text).dim().to_string()
        }
    };
    if actions.save_cancel_shown {
        let what = if add_mode { "adding" } else { "editing" };
        return Some(format!(
            "{}  {} {}",
            what,
            action("save", true),
            action("cancel", true)
        ));
    }
    Some(format!(
        "{} selected  {} {}",
        actions.selected,
        action("edit", actions.edit_enabled),
        action("delete", actions.delete_enabled)
    ))
}

fn footer<B: SessionBackend>(api: &GridApi<B>) -> String {
    let shown = api.get_filtered_data().len();
    let total = api.rows().len();
    let page = api.pagination();
    let mut text = format!(
        "{} of {} rows · page {}/{}",
        shown,
        total,
        page.page_index + 1,
        api.page_count()
    );
    if api.layout().collapse_mode {
        text.push_str(" · compact");
    }
    style(text).dim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_and_truncates_by_display_width() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abc…");
        assert_eq!(fit("日本語", 4), "日… ");
    }

    #[test]
    fn bulk_bar_states() {
        use editgrid_core::edit::EditMode;
        assert!(bulk_bar(&BulkActions::derive(0, EditMode::None), false).is_none());
        let bar = bulk_bar(&BulkActions::derive(2, EditMode::None), false).unwrap();
        assert!(bar.starts_with("2 selected"));
        let bar = bulk_bar(&BulkActions::derive(0, EditMode::Add), true).unwrap();
        assert!(bar.starts_with("adding"));
    }
}
