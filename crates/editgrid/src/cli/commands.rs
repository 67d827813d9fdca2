//! Command handlers. Each one builds a [`GridApi`] for the document, replays
//! the invocation's flags as user interactions and prints the outcome.

use super::document::{self, LoadedDocument};
use super::render;
use super::setup::{split_assignment, FormatArg, ViewArgs};
use anyhow::{anyhow, bail, Context, Result};
use editgrid_core::api::{GridApi, GridHost};
use editgrid_core::column::EditType;
use editgrid_core::config::GridConfig;
use editgrid_core::edit::SavePayload;
use editgrid_core::export::ExportFormat;
use editgrid_core::filter::FilterMode;
use editgrid_core::model::{Row, RowId, Value};
use editgrid_core::persist::fs_backend::FsBackend;
use editgrid_core::persist::ViewStateStore;
use editgrid_core::sort::SortSpec;
use std::path::{Path, PathBuf};

/// Everything a handler needs besides its own arguments.
pub struct AppContext {
    pub session_dir: PathBuf,
    pub config: GridConfig,
}

impl AppContext {
    fn backend(&self) -> FsBackend {
        FsBackend::new(&self.session_dir)
    }

    fn open(&self, doc: &Path) -> Result<GridApi<FsBackend>> {
        let LoadedDocument { key, columns, rows } = document::load(doc)?;
        Ok(GridApi::new(
            columns,
            rows,
            self.backend(),
            key,
            self.config.clone(),
        ))
    }
}

/// Collects what the grid raises; the CLI prints it afterwards.
#[derive(Default)]
struct CollectingHost {
    saves: Vec<SavePayload>,
    deletes: Vec<Vec<Row>>,
}

impl GridHost for CollectingHost {
    fn on_save(&mut self, payload: SavePayload) {
        self.saves.push(payload);
    }

    fn on_delete(&mut self, rows: Vec<Row>) {
        self.deletes.push(rows);
    }
}

pub struct ShowArgs {
    pub view: ViewArgs,
    pub width: Option<u32>,
    pub expand: Vec<String>,
    pub select: Vec<String>,
    pub page: usize,
}

pub fn show(ctx: &AppContext, doc: &Path, args: ShowArgs) -> Result<()> {
    let mut api = ctx.open(doc)?;
    apply_view(&mut api, &args.view)?;

    api.set_viewport_width(args.width.unwrap_or_else(terminal_width));
    for id in &args.select {
        let id = RowId::new(id.as_str());
        if !api.select(&id) {
            bail!("unknown row: {}", id);
        }
    }
    for id in &args.expand {
        api.toggle_row_expanded(&RowId::new(id.as_str()));
    }
    for _ in 1..args.page.max(1) {
        if !api.next_page() {
            break;
        }
    }

    print!("{}", render::grid(&api));
    Ok(())
}

pub fn export(ctx: &AppContext, doc: &Path, view: &ViewArgs, format: FormatArg) -> Result<()> {
    let mut api = ctx.open(doc)?;
    apply_view(&mut api, view)?;
    let format = match format {
        FormatArg::Json => ExportFormat::Json,
        FormatArg::Csv => ExportFormat::Csv,
    };
    let out = api.export_as(format)?;
    print!("{}", out);
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub fn edit(ctx: &AppContext, doc: &Path, row: &str, assignments: &[String]) -> Result<()> {
    let mut api = ctx.open(doc)?;
    let id = RowId::new(row);
    if !api.select(&id) {
        bail!("unknown row: {}", row);
    }
    api.start_edit();
    apply_assignments(&mut api, &id, assignments)?;
    commit(&mut api)
}

pub fn add(ctx: &AppContext, doc: &Path, assignments: &[String]) -> Result<()> {
    let mut api = ctx.open(doc)?;
    api.start_add();
    apply_assignments(&mut api, &RowId::temp(), assignments)?;
    commit(&mut api)
}

/// Saves through a collecting host, prints the payload and confirms the commit.
fn commit(api: &mut GridApi<FsBackend>) -> Result<()> {
    let mut host = CollectingHost::default();
    api.save(&mut host);
    let payload = host.saves.pop().unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&payload)?);
    api.complete_save();
    Ok(())
}

pub fn delete(ctx: &AppContext, doc: &Path, rows: &[String]) -> Result<()> {
    let mut api = ctx.open(doc)?;
    for row in rows {
        if !api.select(&RowId::new(row.as_str())) {
            bail!("unknown row: {}", row);
        }
    }
    let mut host = CollectingHost::default();
    api.delete_selected(&mut host);
    let deleted = host.deletes.pop().unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&deleted)?);
    Ok(())
}

pub fn state_show(ctx: &AppContext, doc: &Path) -> Result<()> {
    let loaded = document::load(doc)?;
    let store = ViewStateStore::new(ctx.backend());
    let state = store.read(&loaded.key);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

pub fn state_clear(ctx: &AppContext, doc: Option<&Path>) -> Result<()> {
    let store = ViewStateStore::new(ctx.backend());
    match doc {
        Some(doc) => {
            let loaded = document::load(doc)?;
            store.clear(&loaded.key)?;
            println!("Cleared view state for {}", loaded.key);
        }
        None => {
            let count = store.clear_session()?;
            println!("Cleared {} grid(s)", count);
        }
    }
    Ok(())
}

fn apply_view(api: &mut GridApi<FsBackend>, view: &ViewArgs) -> Result<()> {
    if view.clear_filters {
        api.clear_filters();
    }
    if let Some(text) = &view.global {
        api.set_filter_mode(FilterMode::Global);
        api.set_global_filter(text);
    }
    if !view.filter.is_empty() {
        api.set_filter_mode(FilterMode::Individual);
        for raw in &view.filter {
            let (column, text) =
                split_assignment(raw).ok_or_else(|| anyhow!("expected COL=TEXT, got '{}'", raw))?;
            api.columns()
                .require(column)
                .with_context(|| format!("cannot filter on '{}'", column))?;
            if !api.filter_state().is_active(column) && !api.toggle_filter_column(column) {
                bail!("column '{}' is not filterable", column);
            }
            api.set_column_filter(column, text);
        }
    }
    if !view.sort.is_empty() {
        let mut sorting = Vec::new();
        for raw in &view.sort {
            let (column, desc) = match raw.split_once(':') {
                Some((column, "desc")) => (column, true),
                Some((column, "asc")) => (column, false),
                Some(_) => bail!("expected COL or COL:desc, got '{}'", raw),
                None => (raw.as_str(), false),
            };
            api.columns().require(column)?;
            sorting.push(if desc {
                SortSpec::desc(column)
            } else {
                SortSpec::asc(column)
            });
        }
        api.set_sorting(sorting);
    }
    for column in &view.hide {
        if !api.set_column_visibility(column, false) {
            bail!("column '{}' cannot be hidden", column);
        }
    }
    for column in &view.unhide {
        api.set_column_visibility(column, true);
    }
    Ok(())
}

fn apply_assignments(api: &mut GridApi<FsBackend>, id: &RowId, assignments: &[String]) -> Result<()> {
    for raw in assignments {
        let (column_id, text) =
            split_assignment(raw).ok_or_else(|| anyhow!("expected COL=VALUE, got '{}'", raw))?;
        let column = api.columns().require(column_id)?;
        if !column.is_editable() {
            bail!("column '{}' is not editable", column_id);
        }
        let value = parse_value(column.edit_type(), text)?;
        api.update_cell(id, column_id, value);
    }
    Ok(())
}

/// Turns command-line text into the value an editor of this type would produce.
fn parse_value(edit_type: &EditType, text: &str) -> Result<Value> {
    match edit_type {
        EditType::Number => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(Value::String(String::new()));
            }
            let number: serde_json::Number = trimmed
                .parse()
                .map_err(|_| anyhow!("'{}' is not a number", text))?;
            Ok(Value::Number(number))
        }
        EditType::Select { options } => options
            .iter()
            .find(|o| o.label == text || editgrid_core::model::display_text(&o.value) == text)
            .map(|o| o.value.clone())
            .ok_or_else(|| anyhow!("'{}' is not one of the options", text)),
        _ => Ok(Value::String(text.to_string())),
    }
}

fn terminal_width() -> u32 {
    let (_, cols) = console::Term::stdout().size();
    u32::from(cols)
}
