//! # Domain Model: Rows and Values
//!
//! The engine is generic over the row schema. A [`Row`] is opaque beyond two
//! things:
//!
//! 1. **Identity**: a stable [`RowId`], unique per dataset.
//! 2. **Fields**: named [`Value`]s addressed by column accessors.
//!
//! Rows belong to the host's data source. The engine only ever reads them: edits
//! happen on owned working copies ([`PartialRow`]) held by the edit state machine,
//! never on the host's rows.
//!
//! ## Wire Format
//!
//! Rows serialize flat, the way hosts usually hand them over:
//!
//! ```text
//! { "id": "r1", "name": "Aria", "level": 60 }
//! ```
//!
//! Numeric ids are accepted on input and normalized to their string form.
//!
//! ## Display Text
//!
//! Filtering, sorting and CSV export all need a textual view of a value.
//! [`display_text`] is the single place that decides what that text is.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use serde_json::Value;

/// Working copy of a row's fields, keyed by field name.
pub type PartialRow = serde_json::Map<String, Value>;

/// Stable row identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(String);

/// Sentinel id of the row being created in add mode.
pub const TEMP_ROW_ID: &str = "__new_row__";

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The add-mode sentinel.
    pub fn temp() -> Self {
        Self(TEMP_ROW_ID.to_string())
    }

    pub fn is_temp(&self) -> bool {
        self.0 == TEMP_ROW_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawRowId::deserialize(deserializer)? {
            RawRowId::Text(s) => Ok(RowId(s)),
            RawRowId::Int(n) => Ok(RowId(n.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRowId {
    Text(String),
    Int(i64),
}

/// A host row: an id plus arbitrary named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    #[serde(flatten)]
    pub fields: PartialRow,
}

impl Row {
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            fields: PartialRow::new(),
        }
    }

    /// Builder-style field setter, mostly for fixtures and hosts.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns an owned copy of this row with `edits` laid over its fields.
    pub fn merged(&self, edits: &PartialRow) -> Row {
        let mut row = self.clone();
        for (k, v) in edits {
            row.fields.insert(k.clone(), v.clone());
        }
        row
    }

    /// Builds a row from a working copy (used for the add-mode temp row).
    pub fn from_partial(id: RowId, fields: PartialRow) -> Row {
        Row { id, fields }
    }
}

/// Textual form of a value as used by filtering, sorting and export.
///
/// Null renders as the empty string; containers render as compact JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// True for values the readonly renderer shows as a placeholder.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
