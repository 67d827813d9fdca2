//! Grid documents: the columns and rows a host would normally hold in memory.
//!
//! ```json
//! {
//!   "key": "party",
//!   "columns": [
//!     {"id": "select", "meta": {"priority": "system"}},
//!     {"id": "name", "meta": {"displayName": "Name", "priority": "primary",
//!                             "editable": true, "editType": {"kind": "text"}}}
//!   ],
//!   "rows": [{"id": 1, "name": "Aria"}]
//! }
//! ```
//!
//! Without `key` the grid is namespaced by the document's absolute path, the
//! same way a page-hosted grid is namespaced by its URL path.

use anyhow::{Context, Result};
use editgrid_core::column::{ColumnDef, ColumnSet};
use editgrid_core::model::Row;
use editgrid_core::persist::GridKey;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct GridDocument {
    #[serde(default)]
    pub key: Option<String>,
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// A document ready to be handed to the engine.
pub struct LoadedDocument {
    pub key: GridKey,
    pub columns: ColumnSet,
    pub rows: Vec<Row>,
}

pub fn load(path: &Path) -> Result<LoadedDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read grid document {}", path.display()))?;
    let doc: GridDocument = serde_json::from_str(&content)
        .with_context(|| format!("invalid grid document {}", path.display()))?;

    let key = match &doc.key {
        Some(key) => GridKey::explicit(key),
        None => key_for_path(path),
    };
    let columns = ColumnSet::new(doc.columns)?;
    for issue in columns.issues() {
        tracing::warn!(%issue, "column configuration issue");
    }

    Ok(LoadedDocument {
        key,
        columns,
        rows: doc.rows,
    })
}

fn key_for_path(path: &Path) -> GridKey {
    let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    GridKey::from_path(&absolute.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "columns": [
            {"id": "select", "meta": {"priority": "system"}},
            {"id": "name", "accessor": "full_name", "meta": {"priority": "primary", "editable": true}},
            {"id": "class", "meta": {"editable": true, "editType": {"kind": "select"}}}
        ],
        "rows": [{"id": 7, "full_name": "Aria"}]
    }"#;

    #[test]
    fn loads_columns_rows_and_path_key() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("party.json");
        fs::write(&path, DOC).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.columns.len(), 3);
        assert_eq!(loaded.columns.issues().len(), 1);
        assert_eq!(loaded.rows[0].id.as_str(), "7");
        assert_eq!(loaded.columns.get("name").unwrap().field_key(), "full_name");
        assert!(loaded.key.as_str().starts_with("editgrid:"));
        assert!(loaded.key.as_str().ends_with("/party.json"));
    }

    #[test]
    fn explicit_key_wins() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("g.json");
        fs::write(&path, r#"{"key": "party", "columns": []}"#).unwrap();
        assert_eq!(load(&path).unwrap().key.as_str(), "editgrid:party");
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("g.json");
        fs::write(&path, r#"{"columns": [{"id": "a"}, {"id": "a"}]}"#).unwrap();
        assert!(load(&path).is_err());
    }
}
