//! Client-side sorting.
//!
//! Sorting is a list of [`SortSpec`]s; the first one decides, later ones break
//! ties. Header clicks cycle a column through ascending → descending → unsorted.

use crate::column::{ColumnId, ColumnSet};
use crate::model::{display_text, Row, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub column_id: ColumnId,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Advances a column's sort state. Without `multi`, other columns are dropped.
pub fn toggle_sort(sorting: &mut Vec<SortSpec>, column_id: &str, multi: bool) {
    let current = sorting
        .iter()
        .position(|s| s.column_id == column_id)
        .map(|i| (i, sorting[i].direction));

    if !multi {
        sorting.retain(|s| s.column_id == column_id);
    }

    match current {
        None => sorting.push(SortSpec::asc(column_id)),
        Some((_, SortDirection::Asc)) => {
            if let Some(spec) = sorting.iter_mut().find(|s| s.column_id == column_id) {
                spec.direction = SortDirection::Desc;
            }
        }
        Some((_, SortDirection::Desc)) => sorting.retain(|s| s.column_id != column_id),
    }
}

/// Sorts rows in place (stable). Unknown columns are skipped.
pub fn sort_rows(rows: &mut [&Row], sorting: &[SortSpec], columns: &ColumnSet) {
    let keys: Vec<_> = sorting
        .iter()
        .filter_map(|s| columns.get(&s.column_id).map(|c| (c, s.direction)))
        .collect();
    if keys.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for (column, direction) in &keys {
            let ord = compare_values(&column.value(a), &column.value(b), *direction);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Numbers numerically, everything else case-insensitively; blanks always last.
fn compare_values(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    let a_blank = crate::model::is_blank(a);
    let b_blank = crate::model::is_blank(b);
    match (a_blank, b_blank) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ord = match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => display_text(a)
            .to_lowercase()
            .cmp(&display_text(b).to_lowercase()),
    };

    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDef;

    fn columns() -> ColumnSet {
        ColumnSet::new(vec![ColumnDef::new("name"), ColumnDef::new("level")]).unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row::new("1").with("name", "borin").with("level", 45),
            Row::new("2").with("name", "Aria").with("level", 60),
            Row::new("3").with("name", "cael"),
            Row::new("4").with("name", "Dax").with("level", 9),
        ]
    }

    fn sorted_ids(sorting: &[SortSpec]) -> Vec<String> {
        let data = rows();
        let mut refs: Vec<&Row> = data.iter().collect();
        sort_rows(&mut refs, sorting, &columns());
        refs.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn toggle_cycles_asc_desc_none() {
        let mut sorting = Vec::new();
        toggle_sort(&mut sorting, "name", false);
        assert_eq!(sorting, vec![SortSpec::asc("name")]);
        toggle_sort(&mut sorting, "name", false);
        assert_eq!(sorting, vec![SortSpec::desc("name")]);
        toggle_sort(&mut sorting, "name", false);
        assert!(sorting.is_empty());
    }

    #[test]
    fn single_sort_replaces_other_columns() {
        let mut sorting = vec![SortSpec::asc("level")];
        toggle_sort(&mut sorting, "name", false);
        assert_eq!(sorting, vec![SortSpec::asc("name")]);
    }

    #[test]
    fn multi_sort_appends() {
        let mut sorting = vec![SortSpec::asc("level")];
        toggle_sort(&mut sorting, "name", true);
        assert_eq!(sorting, vec![SortSpec::asc("level"), SortSpec::asc("name")]);
    }

    #[test]
    fn strings_sort_case_insensitively() {
        assert_eq!(sorted_ids(&[SortSpec::asc("name")]), vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn numbers_sort_numerically_with_blanks_last() {
        assert_eq!(sorted_ids(&[SortSpec::asc("level")]), vec!["4", "1", "2", "3"]);
        assert_eq!(sorted_ids(&[SortSpec::desc("level")]), vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn unknown_columns_leave_order_alone() {
        assert_eq!(sorted_ids(&[SortSpec::asc("ghost")]), vec!["1", "2", "3", "4"]);
    }
}
