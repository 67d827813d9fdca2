//! # API Facade
//!
//! [`GridApi`] is the single entry point a host uses to drive one grid instance.
//! It owns every piece of per-instance state; there are no module-level
//! singletons, so any number of grids can live side by side and each can be
//! tested in isolation.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Coordinates** the engine modules (edit, filter, sort, layout, selection)
//!   so that one call leaves them consistent with each other,
//! - **Raises** save and delete requests to the host through [`GridHost`],
//! - **Schedules** view-state persistence whenever sorting, visibility or filters
//!   change.
//!
//! ## What the API Does NOT Do
//!
//! - **Commit data**: the host persists rows and then calls [`GridApi::complete_save`]
//!   and [`GridApi::set_rows`].
//! - **Paint**: it returns [`LayoutPlan`]s and [`CellView`]s, never strings for a screen.
//! - **Run timers**: the host calls [`GridApi::tick`] from its event loop.
//!
//! ## Save Protocol
//!
//! ```text
//! host                         GridApi
//!  │  save(host) ─────────────▶ │ payload = save_changes()
//!  │ ◀──────── on_save(payload) │ (edit state untouched)
//!  │  ...commit...              │
//!  │  complete_save() ────────▶ │ mode = none, selection cleared
//!  │  set_rows(fresh) ────────▶ │
//! ```
//!
//! If the commit fails the host simply does not call `complete_save`: the grid
//! stays in edit mode with the user's input intact, and the user can retry or
//! cancel.
//!
//! ## Generic Over SessionBackend
//!
//! `GridApi<B: SessionBackend>` is generic over view-state storage:
//! - Production: `GridApi<FsBackend>`
//! - Testing: `GridApi<MemBackend>`

use crate::column::{ColumnDef, ColumnId, ColumnSet};
use crate::config::GridConfig;
use crate::edit::{EditMode, EditState, SavePayload};
use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::filter::{FilterMode, FilterState};
use crate::layout::{ExpandedRows, LayoutPlan, RowLayout};
use crate::model::{Row, RowId, Value};
use crate::pagination::Pagination;
use crate::persist::{DebouncedWriter, GridKey, SessionBackend, ViewState, ViewStateStore};
use crate::render::{self, CellView};
use crate::selection::{BulkActions, HeaderCheck, Selection};
use crate::sort::{self, SortSpec};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Instant;

/// Callbacks raised to the host. Both receive plain, owned row data.
///
/// The engine does not wait for, or learn about, the outcome.
pub trait GridHost {
    fn on_save(&mut self, payload: SavePayload);
    fn on_delete(&mut self, rows: Vec<Row>);
}

/// Width used until the host reports one: lays out as a desktop.
const UNKNOWN_VIEWPORT_WIDTH: u32 = u32::MAX;

pub struct GridApi<B: SessionBackend> {
    columns: ColumnSet,
    rows: Vec<Row>,
    edit: EditState,
    filter: FilterState,
    sorting: Vec<SortSpec>,
    visibility: BTreeMap<ColumnId, bool>,
    selection: Selection,
    expanded: ExpandedRows,
    pagination: Pagination,
    viewport_width: u32,
    config: GridConfig,
    writer: DebouncedWriter<B>,
}

impl<B: SessionBackend> GridApi<B> {
    /// Builds a grid and restores its view state from `backend`.
    ///
    /// The stored record is read exactly once, here. Without a record the grid
    /// starts unsorted, with every column visible, in global filter mode with all
    /// filterable columns active.
    pub fn new(
        columns: ColumnSet,
        rows: Vec<Row>,
        backend: B,
        key: GridKey,
        config: GridConfig,
    ) -> Self {
        let store = ViewStateStore::new(backend);
        let restored = match store.try_read(&key) {
            Ok(Some(state)) => Some(state),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to restore view state, using defaults");
                None
            }
        };

        let (sorting, visibility, filter) = match restored {
            Some(state) => (
                state.sorting,
                state.column_visibility,
                match state.filter_state {
                    Some(filter) => restore_filter(&columns, filter),
                    None => FilterState::for_columns(&columns),
                },
            ),
            None => (
                Vec::new(),
                BTreeMap::new(),
                FilterState::for_columns(&columns),
            ),
        };

        tracing::debug!(key = %key, rows = rows.len(), columns = columns.len(), "grid created");

        let writer = DebouncedWriter::new(store, key, config.debounce());
        Self {
            pagination: Pagination::new(config.page_size),
            columns,
            rows,
            edit: EditState::new(),
            filter,
            sorting,
            visibility,
            selection: Selection::new(),
            expanded: ExpandedRows::new(),
            viewport_width: UNKNOWN_VIEWPORT_WIDTH,
            config,
            writer,
        }
    }

    // --- Accessors ---

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn key(&self) -> &GridKey {
        self.writer.key()
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn sorting(&self) -> &[SortSpec] {
        &self.sorting
    }

    pub fn column_visibility(&self) -> &BTreeMap<ColumnId, bool> {
        &self.visibility
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn expanded_rows(&self) -> &ExpandedRows {
        &self.expanded
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    /// The view state as it would be persisted right now.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            sorting: self.sorting.clone(),
            column_visibility: self.visibility.clone(),
            filter_state: Some(self.filter.clone()),
        }
    }

    // --- Edit lifecycle ---

    pub fn edit_mode(&self) -> EditMode {
        self.edit.mode()
    }

    pub fn is_in_edit_mode(&self) -> bool {
        self.edit.is_active()
    }

    pub fn is_add_mode(&self) -> bool {
        self.edit.is_add_mode()
    }

    /// Opens the temp row for a new record.
    pub fn start_add(&mut self) -> bool {
        if !self.edit.start_add(&self.columns) {
            return false;
        }
        self.expanded.expand(RowId::temp());
        true
    }

    /// Snapshots the selected rows and starts editing them.
    pub fn start_edit(&mut self) -> bool {
        let targets = self.selection.materialize(&self.rows);
        if !self.edit.start_edit(&targets) {
            return false;
        }
        for row in targets {
            self.expanded.expand(row.id);
        }
        true
    }

    /// Sets one field of a row being edited. `column_id` is resolved to the
    /// column's field key; an id that matches no column is used as the field name.
    pub fn update_cell(&mut self, row_id: &RowId, column_id: &str, value: Value) -> bool {
        let field = self
            .columns
            .get(column_id)
            .map(ColumnDef::field_key)
            .unwrap_or(column_id)
            .to_string();
        self.edit.update_cell(row_id, &field, value)
    }

    /// The payload a save would send. Pure.
    pub fn save_changes(&self) -> SavePayload {
        self.edit.save_changes()
    }

    /// Hands the pending changes to the host.
    ///
    /// Returns `true` if `on_save` was called. With nothing changed in edit mode
    /// the grid simply leaves edit mode.
    pub fn save(&mut self, host: &mut impl GridHost) -> bool {
        if !self.edit.is_active() {
            tracing::debug!("save ignored: not editing");
            return false;
        }
        let payload = self.edit.save_changes();
        if payload.is_empty() {
            tracing::debug!("save with no changes, leaving edit mode");
            self.complete_save();
            return false;
        }
        tracing::debug!(
            updated = payload.updated_rows.len(),
            new_row = payload.new_row.is_some(),
            "raising save to host"
        );
        host.on_save(payload);
        true
    }

    /// The host committed the last save.
    pub fn complete_save(&mut self) -> bool {
        let done = self.edit.complete_save();
        if done {
            self.finish_editing();
        }
        done
    }

    /// Abandons every edit and the selection.
    pub fn cancel_all(&mut self) -> bool {
        let cancelled = self.edit.cancel();
        self.finish_editing();
        cancelled
    }

    fn finish_editing(&mut self) {
        self.selection.clear();
        self.expanded.collapse(&RowId::temp());
    }

    /// The synthesized row shown while adding.
    pub fn temp_row(&self) -> Option<Row> {
        if !self.edit.is_add_mode() {
            return None;
        }
        let temp = RowId::temp();
        self.edit
            .working_copy(&temp)
            .map(|fields| Row::from_partial(temp, fields.clone()))
    }

    // --- Selection and bulk actions ---

    pub fn select(&mut self, id: &RowId) -> bool {
        if !self.has_row(id) {
            tracing::debug!(row = %id, "select ignored: unknown row");
            return false;
        }
        self.selection.select(id.clone());
        true
    }

    pub fn deselect(&mut self, id: &RowId) {
        self.selection.deselect(id);
    }

    /// Returns whether the row is selected afterwards. Unknown rows are ignored.
    pub fn toggle_selection(&mut self, id: &RowId) -> bool {
        if !self.has_row(id) {
            tracing::debug!(row = %id, "toggle ignored: unknown row");
            return false;
        }
        self.selection.toggle(id)
    }

    fn has_row(&self, id: &RowId) -> bool {
        self.rows.iter().any(|r| &r.id == id)
    }

    /// Header checkbox over the rows currently on screen.
    pub fn toggle_select_all(&mut self) {
        let visible: Vec<RowId> = self.page_rows().iter().map(|r| r.id.clone()).collect();
        self.selection.toggle_all(visible.iter());
    }

    pub fn header_check(&self) -> HeaderCheck {
        let visible: Vec<RowId> = self.page_rows().iter().map(|r| r.id.clone()).collect();
        self.selection.header_state(visible.iter())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected rows as owned copies, in data order.
    pub fn get_selected_rows(&self) -> Vec<Row> {
        self.selection.materialize(&self.rows)
    }

    pub fn bulk_actions(&self) -> BulkActions {
        BulkActions::derive(self.selection.len(), self.edit.mode())
    }

    /// Raises the selected rows to the host for deletion and clears the selection.
    pub fn delete_selected(&mut self, host: &mut impl GridHost) -> bool {
        if self.edit.is_active() {
            tracing::debug!("delete ignored: editing");
            return false;
        }
        let rows = self.get_selected_rows();
        if rows.is_empty() {
            return false;
        }
        self.selection.clear();
        tracing::debug!(count = rows.len(), "raising delete to host");
        host.on_delete(rows);
        true
    }

    // --- Data ---

    /// Replaces the data. Selection and expanded rows keep the ids that still exist.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        let ids: std::collections::HashSet<RowId> =
            self.rows.iter().map(|r| r.id.clone()).collect();
        self.selection.retain(|id| ids.contains(id));
        self.expanded.retain(|id| id.is_temp() || ids.contains(id));
        let total = self.filtered_len();
        self.pagination.clamp(total);
    }

    /// Rows passing the filters, in sort order.
    pub fn get_filtered_data(&self) -> Vec<&Row> {
        let mut rows = self.filter.apply(&self.columns, &self.rows);
        sort::sort_rows(&mut rows, &self.sorting, &self.columns);
        rows
    }

    fn filtered_len(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| self.filter.matches(&self.columns, r))
            .count()
    }

    /// The current page of filtered data.
    pub fn page_rows(&self) -> Vec<&Row> {
        let rows = self.get_filtered_data();
        self.pagination.slice(&rows).to_vec()
    }

    /// What the body shows: the temp row first in add mode, then the current page.
    pub fn display_rows(&self) -> Vec<Cow<'_, Row>> {
        let mut out: Vec<Cow<'_, Row>> = Vec::new();
        if let Some(temp) = self.temp_row() {
            out.push(Cow::Owned(temp));
        }
        out.extend(self.page_rows().into_iter().map(Cow::Borrowed));
        out
    }

    /// Filtered, sorted rows as owned copies.
    pub fn export_data(&self) -> Vec<Row> {
        self.get_filtered_data().into_iter().cloned().collect()
    }

    pub fn export_as(&self, format: ExportFormat) -> Result<String> {
        let rows = self.get_filtered_data();
        export::export(&self.columns, &self.visibility, &rows, format)
    }

    /// A row as the user currently sees it: working copy laid over the host row
    /// while it is being edited. The temp id resolves to the add-mode row.
    pub fn get_row_data(&self, id: &RowId) -> Option<Row> {
        if id.is_temp() {
            return self.temp_row();
        }
        let row = self.rows.iter().find(|r| &r.id == id)?;
        Some(match self.edit.working_copy(id) {
            Some(working) => row.merged(working),
            None => row.clone(),
        })
    }

    fn lookup(&self, id: &RowId) -> Option<Cow<'_, Row>> {
        if id.is_temp() {
            return self.temp_row().map(Cow::Owned);
        }
        self.rows.iter().find(|r| &r.id == id).map(Cow::Borrowed)
    }

    // --- Filters ---

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter.set_mode(mode);
        self.filter_changed();
    }

    pub fn set_global_filter(&mut self, text: &str) {
        self.filter.set_global(text);
        self.filter_changed();
    }

    pub fn set_column_filter(&mut self, column_id: &str, text: &str) {
        self.filter.set_value(column_id, text);
        self.filter_changed();
    }

    pub fn toggle_filter_column(&mut self, column_id: &str) -> bool {
        let changed = self.filter.toggle_column(&self.columns, column_id);
        if changed {
            self.filter_changed();
        }
        changed
    }

    pub fn set_active_filter_columns(&mut self, ids: &[ColumnId]) {
        self.filter.set_active_columns(&self.columns, ids);
        self.filter_changed();
    }

    /// Empties every filter value; mode and active columns stay.
    pub fn clear_filters(&mut self) {
        self.filter.clear_all();
        self.filter_changed();
    }

    fn filter_changed(&mut self) {
        self.pagination.page_index = 0;
        self.writer.schedule_filter(self.filter.clone(), Instant::now());
    }

    // --- Sorting and visibility ---

    pub fn toggle_sort(&mut self, column_id: &str, multi: bool) -> bool {
        if self.columns.get(column_id).is_none() {
            tracing::debug!(column = column_id, "sort ignored: unknown column");
            return false;
        }
        sort::toggle_sort(&mut self.sorting, column_id, multi);
        self.writer.schedule_sorting(self.sorting.clone(), Instant::now());
        true
    }

    pub fn set_sorting(&mut self, sorting: Vec<SortSpec>) {
        self.sorting = sorting;
        self.writer.schedule_sorting(self.sorting.clone(), Instant::now());
    }

    /// Shows or hides a column. System columns cannot be hidden.
    pub fn set_column_visibility(&mut self, column_id: &str, visible: bool) -> bool {
        match self.columns.get(column_id) {
            Some(column) if !column.is_system() => {
                self.visibility.insert(column_id.to_string(), visible);
                self.writer
                    .schedule_visibility(self.visibility.clone(), Instant::now());
                true
            }
            _ => {
                tracing::debug!(column = column_id, "visibility change ignored");
                false
            }
        }
    }

    pub fn is_column_visible(&self, column_id: &str) -> bool {
        self.visibility.get(column_id).copied().unwrap_or(true)
    }

    // --- Layout and cells ---

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    pub fn layout(&self) -> LayoutPlan {
        LayoutPlan::compute(
            &self.columns,
            &self.visibility,
            self.viewport_width,
            self.config.tablet_breakpoint,
        )
    }

    pub fn row_layout(&self, id: &RowId) -> RowLayout {
        self.layout().for_row(id, &self.expanded)
    }

    pub fn toggle_row_expanded(&mut self, id: &RowId) -> bool {
        self.expanded.toggle(id)
    }

    pub fn collapse_all_rows(&mut self) {
        self.expanded.collapse_all();
    }

    /// The renderer for one cell, or `None` for an unknown row or column.
    pub fn cell(&self, row_id: &RowId, column_id: &str) -> Option<CellView> {
        let column = self.columns.get(column_id)?;
        let row = self.lookup(row_id)?;
        let focus = render::autofocus_cell(&self.columns, &self.visibility, &self.edit);
        Some(render::dispatch(column, &row, &self.edit, focus.as_ref()))
    }

    // --- Pagination ---

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.filtered_len())
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.filtered_len();
        self.pagination.next(total)
    }

    pub fn previous_page(&mut self) -> bool {
        self.pagination.previous()
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.pagination.set_page_size(size);
    }

    // --- Persistence ---

    /// Writes view-state slices whose debounce window has passed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        self.writer.poll(now)
    }

    /// Writes every pending view-state slice now.
    pub fn flush_view_state(&mut self) -> bool {
        self.writer.flush()
    }

    /// Forgets this grid's persisted view state. In-memory state is kept.
    pub fn clear_view_state(&mut self) -> Result<()> {
        self.writer.discard();
        self.writer.store().clear(self.writer.key())
    }
}

/// Drops active columns that no longer exist or cannot be filtered.
fn restore_filter(columns: &ColumnSet, mut filter: FilterState) -> FilterState {
    filter
        .active_columns
        .retain(|id| columns.get(id).is_some_and(ColumnDef::is_filterable));
    filter
}
