//! # Column Descriptors
//!
//! A column tells the engine three things about a slice of every row:
//!
//! - **Where the value lives**: the [`Accessor`] (a field key, or a computed function).
//! - **How it may be edited**: `editable` plus an [`EditType`].
//! - **How important it is on narrow screens**: the responsive [`Priority`].
//!
//! ## System Columns
//!
//! Checkbox and action columns are *system* columns. They are identified either by
//! `priority = system` or by an id in [`SYSTEM_COLUMN_IDS`]. System columns:
//! - always render inline (never collapse into the detail panel),
//! - are never editable, whatever their metadata says,
//! - cannot be hidden or filtered.
//!
//! ## Validation
//!
//! [`ColumnSet::new`] validates a column list once, at grid construction:
//!
//! | Problem | Outcome |
//! |---------|---------|
//! | Duplicate id | `GridError::DuplicateColumn` |
//! | `select` without options | [`ConfigIssue::SelectWithoutOptions`], grid keeps working |
//! | Editable system column | [`ConfigIssue::EditableSystemColumn`], flag cleared |

use crate::error::{GridError, Result};
use crate::model::{Row, Value};
use crate::selection::HeaderCheck;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub type ColumnId = String;

/// Ids that are always treated as system columns.
pub const SYSTEM_COLUMN_IDS: &[&str] = &["select", "actions"];

static DEFAULT_EDIT_TYPE: EditType = EditType::Text;

/// Responsive priority of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    System,
    Primary,
    #[default]
    Secondary,
}

/// One choice of a `select` editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The edit widget a column uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EditType {
    Text,
    Number,
    Textarea,
    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },
    None,
}

/// Optional fixed-size hints, passed through to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeHints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_type: Option<EditType>,
    pub priority: Priority,
    /// `None` means "filterable unless system".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    #[serde(flatten)]
    pub size: SizeHints,
}

type AccessorFn = Arc<dyn Fn(&Row) -> Value + Send + Sync>;
type RenderFn = Arc<dyn Fn(&Row, &Value) -> String + Send + Sync>;
type HeaderFn = Arc<dyn Fn(HeaderCheck) -> String + Send + Sync>;

/// Where a column reads its value from.
#[derive(Clone, Default)]
pub enum Accessor {
    /// The field named like the column id.
    #[default]
    Id,
    /// A named field.
    Field(String),
    /// A derived value. Computed columns are read-only in practice since there
    /// is no field to write back to; edits are keyed by the column id.
    Computed(AccessorFn),
}

impl Accessor {
    fn is_implicit(&self) -> bool {
        !matches!(self, Accessor::Field(_))
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Id => f.write_str("Id"),
            Accessor::Field(key) => f.debug_tuple("Field").field(key).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl Serialize for Accessor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Accessor::Field(key) => serializer.serialize_str(key),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Accessor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(key) => Accessor::Field(key),
            None => Accessor::Id,
        })
    }
}

/// Custom cell renderer supplied by the host (checkboxes, badges, links...).
#[derive(Clone)]
pub struct CellRenderer(RenderFn);

impl CellRenderer {
    pub fn new(f: impl Fn(&Row, &Value) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn render(&self, row: &Row, value: &Value) -> String {
        (self.0)(row, value)
    }
}

impl fmt::Debug for CellRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CellRenderer(..)")
    }
}

/// Column header: a fixed label, or a function of the header checkbox state
/// (select-all toggles and similar controls).
#[derive(Clone)]
pub enum Header {
    Label(String),
    Render(HeaderFn),
}

impl Header {
    fn is_transient(header: &Option<Header>) -> bool {
        !matches!(header, Some(Header::Label(_)))
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Header::Label(label) => f.debug_tuple("Label").field(label).finish(),
            Header::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Header::Label(label) => serializer.serialize_str(label),
            Header::Render(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Header::Label)
    }
}

/// A column descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: ColumnId,
    #[serde(default, skip_serializing_if = "Header::is_transient")]
    pub header: Option<Header>,
    #[serde(default, skip_serializing_if = "Accessor::is_implicit")]
    pub accessor: Accessor,
    #[serde(default)]
    pub meta: ColumnMeta,
    #[serde(skip)]
    pub render: Option<CellRenderer>,
}

impl ColumnDef {
    pub fn new(id: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            header: None,
            accessor: Accessor::Id,
            meta: ColumnMeta::default(),
            render: None,
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(Header::Label(header.into()));
        self
    }

    pub fn header_with(mut self, f: impl Fn(HeaderCheck) -> String + Send + Sync + 'static) -> Self {
        self.header = Some(Header::Render(Arc::new(f)));
        self
    }

    pub fn field(mut self, key: impl Into<String>) -> Self {
        self.accessor = Accessor::Field(key.into());
        self
    }

    pub fn computed(mut self, f: impl Fn(&Row) -> Value + Send + Sync + 'static) -> Self {
        self.accessor = Accessor::Computed(Arc::new(f));
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.meta.display_name = Some(name.into());
        self
    }

    /// Marks the column editable with the given widget.
    pub fn editable(mut self, edit_type: EditType) -> Self {
        self.meta.editable = true;
        self.meta.edit_type = Some(edit_type);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.meta.priority = priority;
        self
    }

    pub fn primary(self) -> Self {
        self.priority(Priority::Primary)
    }

    pub fn system(self) -> Self {
        self.priority(Priority::System)
    }

    pub fn filterable(mut self, filterable: bool) -> Self {
        self.meta.filterable = Some(filterable);
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.meta.size.width = Some(width);
        self
    }

    pub fn min_width(mut self, width: u16) -> Self {
        self.meta.size.min_width = Some(width);
        self
    }

    pub fn max_width(mut self, width: u16) -> Self {
        self.meta.size.max_width = Some(width);
        self
    }

    pub fn render_with(
        mut self,
        f: impl Fn(&Row, &Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(CellRenderer::new(f));
        self
    }

    pub fn is_system(&self) -> bool {
        self.meta.priority == Priority::System || SYSTEM_COLUMN_IDS.contains(&self.id.as_str())
    }

    /// Whether the column takes part in edit/add mode at all.
    pub fn is_editable(&self) -> bool {
        !self.is_system() && self.meta.editable && self.meta.edit_type != Some(EditType::None)
    }

    pub fn is_filterable(&self) -> bool {
        !self.is_system() && self.meta.filterable.unwrap_or(true)
    }

    /// Edit widget, defaulting to plain text.
    pub fn edit_type(&self) -> &EditType {
        self.meta.edit_type.as_ref().unwrap_or(&DEFAULT_EDIT_TYPE)
    }

    /// Key used for this column's value in rows and working copies.
    pub fn field_key(&self) -> &str {
        match &self.accessor {
            Accessor::Field(key) => key,
            Accessor::Id | Accessor::Computed(_) => &self.id,
        }
    }

    pub fn value(&self, row: &Row) -> Value {
        match &self.accessor {
            Accessor::Computed(f) => f(row),
            _ => row.get(self.field_key()).cloned().unwrap_or(Value::Null),
        }
    }

    pub fn display_name_or_id(&self) -> &str {
        self.meta.display_name.as_deref().unwrap_or(&self.id)
    }

    /// Header label: explicit label, else display name, else id.
    /// Render functions are ignored here; see [`ColumnDef::header_content`].
    pub fn header_text(&self) -> &str {
        match &self.header {
            Some(Header::Label(label)) => label,
            _ => self.display_name_or_id(),
        }
    }

    /// What the header cell shows, given the header checkbox state.
    pub fn header_content(&self, check: HeaderCheck) -> String {
        match &self.header {
            Some(Header::Render(f)) => f(check),
            _ => self.header_text().to_string(),
        }
    }
}

/// Non-fatal configuration problems found while validating columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    SelectWithoutOptions { column: ColumnId },
    EditableSystemColumn { column: ColumnId },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::SelectWithoutOptions { column } => {
                write!(f, "column '{}' is a select without options", column)
            }
            ConfigIssue::EditableSystemColumn { column } => {
                write!(f, "system column '{}' cannot be editable", column)
            }
        }
    }
}

/// An ordered, validated list of columns.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<ColumnDef>,
    issues: Vec<ConfigIssue>,
}

impl ColumnSet {
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut issues = Vec::new();
        let mut validated = Vec::with_capacity(columns.len());

        for mut column in columns {
            if !seen.insert(column.id.clone()) {
                return Err(GridError::DuplicateColumn(column.id));
            }

            if column.is_system() && column.meta.editable {
                tracing::warn!(column = %column.id, "ignoring editable flag on system column");
                column.meta.editable = false;
                issues.push(ConfigIssue::EditableSystemColumn {
                    column: column.id.clone(),
                });
            }

            if let Some(EditType::Select { options }) = &column.meta.edit_type {
                if options.is_empty() {
                    tracing::warn!(column = %column.id, "select column has no options");
                    issues.push(ConfigIssue::SelectWithoutOptions {
                        column: column.id.clone(),
                    });
                }
            }

            validated.push(column);
        }

        Ok(Self {
            columns: validated,
            issues,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    pub fn as_slice(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&ColumnDef> {
        self.get(id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn editable(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_editable())
    }

    pub fn filterable_ids(&self) -> Vec<ColumnId> {
        self.columns
            .iter()
            .filter(|c| c.is_filterable())
            .map(|c| c.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = ColumnSet::new(vec![ColumnDef::new("name"), ColumnDef::new("name")]);
        assert!(matches!(result, Err(GridError::DuplicateColumn(id)) if id == "name"));
    }

    #[test]
    fn select_without_options_is_an_issue_not_an_error() {
        let set = ColumnSet::new(vec![
            ColumnDef::new("class").editable(EditType::Select { options: vec![] })
        ])
        .unwrap();
        assert_eq!(
            set.issues(),
            &[ConfigIssue::SelectWithoutOptions {
                column: "class".into()
            }]
        );
    }

    #[test]
    fn system_columns_are_never_editable() {
        let set = ColumnSet::new(vec![
            ColumnDef::new("select").editable(EditType::Text),
            ColumnDef::new("tools").system().editable(EditType::Text),
        ])
        .unwrap();
        assert!(set.iter().all(|c| !c.is_editable()));
        assert_eq!(set.issues().len(), 2);
    }

    #[test]
    fn well_known_ids_are_system() {
        assert!(ColumnDef::new("select").is_system());
        assert!(ColumnDef::new("actions").is_system());
        assert!(!ColumnDef::new("name").is_system());
    }

    #[test]
    fn edit_type_defaults_to_text() {
        let mut col = ColumnDef::new("name");
        col.meta.editable = true;
        assert_eq!(col.edit_type(), &EditType::Text);
        assert!(col.is_editable());
    }

    #[test]
    fn edit_type_none_is_not_editable() {
        let col = ColumnDef::new("name").editable(EditType::None);
        assert!(!col.is_editable());
    }

    #[test]
    fn value_uses_field_accessor() {
        let row = Row::new("r1").with("char_name", "Aria");
        let col = ColumnDef::new("name").field("char_name");
        assert_eq!(col.value(&row), json!("Aria"));
        assert_eq!(col.field_key(), "char_name");
    }

    #[test]
    fn value_uses_computed_accessor() {
        let row = Row::new("r1").with("level", 10);
        let col = ColumnDef::new("double").computed(|r| {
            json!(r.get("level").and_then(Value::as_i64).unwrap_or(0) * 2)
        });
        assert_eq!(col.value(&row), json!(20));
    }

    #[test]
    fn missing_field_is_null() {
        let col = ColumnDef::new("name");
        assert_eq!(col.value(&Row::new("r1")), Value::Null);
    }

    #[test]
    fn header_falls_back_to_display_name_then_id() {
        assert_eq!(ColumnDef::new("name").header_text(), "name");
        assert_eq!(
            ColumnDef::new("name").display_name("Name").header_text(),
            "Name"
        );
        assert_eq!(
            ColumnDef::new("name")
                .display_name("Name")
                .header("Character")
                .header_text(),
            "Character"
        );
    }

    #[test]
    fn header_render_fn_sees_checkbox_state() {
        let col = ColumnDef::new("select").header_with(|check| match check {
            HeaderCheck::All => "all".to_string(),
            _ => "some".to_string(),
        });
        assert_eq!(col.header_content(HeaderCheck::All), "all");
        assert_eq!(col.header_content(HeaderCheck::None), "some");
        assert_eq!(col.header_text(), "select");
        assert!(serde_json::to_value(&col).unwrap().get("header").is_none());
    }

    #[test]
    fn deserializes_from_json() {
        let col: ColumnDef = serde_json::from_value(json!({
            "id": "class",
            "accessor": "char_class",
            "meta": {
                "displayName": "Class",
                "editable": true,
                "editType": {"kind": "select", "options": [{"label": "Mage", "value": "mage"}]},
                "priority": "primary",
                "minWidth": 80
            }
        }))
        .unwrap();

        assert_eq!(col.field_key(), "char_class");
        assert_eq!(col.meta.priority, Priority::Primary);
        assert_eq!(col.meta.size.min_width, Some(80));
        assert_eq!(
            col.edit_type(),
            &EditType::Select {
                options: vec![SelectOption::new("Mage", "mage")]
            }
        );
    }

    #[test]
    fn filterable_excludes_system_and_opted_out() {
        let set = ColumnSet::new(vec![
            ColumnDef::new("select"),
            ColumnDef::new("name"),
            ColumnDef::new("secret").filterable(false),
        ])
        .unwrap();
        assert_eq!(set.filterable_ids(), vec!["name".to_string()]);
    }
}
