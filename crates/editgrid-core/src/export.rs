//! Exporting the rows a user is currently looking at.
//!
//! JSON exports carry the raw row objects; CSV exports carry what the grid
//! shows: one column per visible, non-system column, headed by its display
//! name, with cells rendered as display text.

use crate::column::{ColumnDef, ColumnId, ColumnSet};
use crate::error::Result;
use crate::model::{display_text, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

pub fn export(
    columns: &ColumnSet,
    visibility: &BTreeMap<ColumnId, bool>,
    rows: &[&Row],
    format: ExportFormat,
) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(rows),
        ExportFormat::Csv => to_csv(columns, visibility, rows),
    }
}

pub fn to_json(rows: &[&Row]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn to_csv(
    columns: &ColumnSet,
    visibility: &BTreeMap<ColumnId, bool>,
    rows: &[&Row],
) -> Result<String> {
    let exported: Vec<&ColumnDef> = columns
        .iter()
        .filter(|c| !c.is_system())
        .filter(|c| visibility.get(&c.id).copied().unwrap_or(true))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(exported.iter().map(|c| c.display_name_or_id()))?;
    for row in rows {
        writer.write_record(exported.iter().map(|c| display_text(&c.value(row))))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::GridError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
