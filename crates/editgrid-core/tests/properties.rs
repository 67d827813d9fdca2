// Property-based tests for the edit state machine, filtering and layout.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, BTreeSet};

use editgrid_core::column::{ColumnDef, ColumnSet, EditType, Priority, SelectOption};
use editgrid_core::edit::EditState;
use editgrid_core::filter::{FilterMode, FilterState, GLOBAL_KEY};
use editgrid_core::layout::{classify, LayoutPlan, Slot, DEFAULT_TABLET_BREAKPOINT};
use editgrid_core::model::{Row, RowId, Value};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// (priority, editable, edit kind) for one column.
type ColumnShape = (u8, bool, u8);

fn arb_column_shape() -> impl Strategy<Value = ColumnShape> {
    (0u8..3, prop::bool::ANY, 0u8..5)
}

fn build_columns(shapes: &[ColumnShape]) -> ColumnSet {
    let defs = shapes
        .iter()
        .enumerate()
        .map(|(i, (priority, editable, kind))| {
            let mut def = ColumnDef::new(format!("c{}", i)).priority(match priority {
                0 => Priority::System,
                1 => Priority::Primary,
                _ => Priority::Secondary,
            });
            if *editable && *priority != 0 {
                def = def.editable(match kind {
                    0 => EditType::Text,
                    1 => EditType::Number,
                    2 => EditType::Textarea,
                    3 => EditType::Select {
                        options: vec![SelectOption::new("A", "a"), SelectOption::new("B", "b")],
                    },
                    _ => EditType::None,
                });
            }
            def
        })
        .collect();
    ColumnSet::new(defs).unwrap()
}

fn arb_columns() -> impl Strategy<Value = ColumnSet> {
    proptest::collection::vec(arb_column_shape(), 0..8).prop_map(|shapes| build_columns(&shapes))
}

/// Mostly short text, sometimes numbers or absent.
fn arb_value() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        3 => r"[a-zA-Z ]{0,8}".prop_map(|s| Some(Value::String(s))),
        1 => (0i64..1000).prop_map(|n| Some(Value::from(n))),
        1 => Just(None),
    ]
}

/// Rows `r0..rN` with fields `c0..c5`.
fn arb_rows(max: usize) -> impl Strategy<Value = Vec<Row>> {
    proptest::collection::vec(proptest::collection::vec(arb_value(), 6), 0..max).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, values)| {
                    let mut row = Row::new(format!("r{}", i));
                    for (c, value) in values.into_iter().enumerate() {
                        if let Some(value) = value {
                            row = row.with(format!("c{}", c), value);
                        }
                    }
                    row
                })
                .collect()
        },
    )
}

fn text_columns(n: usize) -> ColumnSet {
    ColumnSet::new((0..n).map(|i| ColumnDef::new(format!("c{}", i))).collect()).unwrap()
}

fn visible_ids(rows: &[&Row]) -> Vec<String> {
    rows.iter().map(|r| r.id.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Edit state machine
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn add_seeds_exactly_the_temp_row(columns in arb_columns()) {
        let mut edit = EditState::new();
        prop_assert!(edit.start_add(&columns));

        let temp = RowId::temp();
        prop_assert_eq!(edit.edit_order(), &[temp.clone()][..]);

        let working = edit.working_copy(&temp).unwrap();
        let expected: BTreeSet<String> = columns.editable().map(|c| c.field_key().to_string()).collect();
        let actual: BTreeSet<String> = working.keys().cloned().collect();
        prop_assert_eq!(actual, expected);
        for value in working.values() {
            prop_assert_eq!(value, &Value::String(String::new()));
        }
        prop_assert_eq!(edit.original(&temp), Some(working));
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn edit_snapshots_are_owned_copies(
        mut rows in arb_rows(12),
        picks in proptest::collection::vec(prop::bool::ANY, 12),
    ) {
        let selected: Vec<Row> = rows
            .iter()
            .zip(picks.iter())
            .filter(|(_, pick)| **pick)
            .map(|(row, _)| row.clone())
            .collect();
        prop_assume!(!selected.is_empty());

        let mut edit = EditState::new();
        prop_assert!(edit.start_edit(&selected));

        let keys: BTreeSet<&RowId> = edit.edit_order().iter().collect();
        let expected: BTreeSet<&RowId> = selected.iter().map(|r| &r.id).collect();
        prop_assert_eq!(keys, expected);

        // Mutating the host rows afterwards must not reach the snapshots.
        for row in rows.iter_mut() {
            row.fields.insert("c0".into(), Value::from("mutated"));
        }
        for row in &selected {
            prop_assert_eq!(edit.working_copy(&row.id), Some(&row.fields));
            prop_assert_eq!(edit.original(&row.id), Some(&row.fields));
        }
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn save_reports_only_changed_rows(
        rows in arb_rows(10),
        actions in proptest::collection::vec(0u8..3, 10),
    ) {
        prop_assume!(!rows.is_empty());

        let mut edit = EditState::new();
        edit.start_edit(&rows);

        let mut expected = Vec::new();
        for (row, action) in rows.iter().zip(actions.iter()) {
            let original = row.get("c0").cloned().unwrap_or(Value::Null);
            match action {
                // untouched
                0 => {}
                // changed
                1 => {
                    edit.update_cell(&row.id, "c0", Value::from("changed!"));
                    expected.push(row.id.clone());
                }
                // changed, then reverted
                _ => {
                    edit.update_cell(&row.id, "c0", Value::from("changed!"));
                    edit.update_cell(&row.id, "c0", original);
                }
            }
        }

        let payload = edit.save_changes();
        let saved: Vec<RowId> = payload.updated_rows.iter().map(|r| r.id.clone()).collect();
        prop_assert_eq!(saved, expected);
        for row in &payload.updated_rows {
            prop_assert_eq!(row.get("c0"), Some(&Value::from("changed!")));
        }
        prop_assert!(payload.new_row.is_none());
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn filtering_is_idempotent(
        rows in arb_rows(20),
        needle in r"[a-zA-Z0-9 ]{0,3}",
        individual in prop::bool::ANY,
        active in proptest::collection::vec(prop::bool::ANY, 6),
    ) {
        let columns = text_columns(6);
        let mut filter = FilterState::for_columns(&columns);
        let ids: Vec<String> = (0..6).filter(|i| active[*i]).map(|i| format!("c{}", i)).collect();
        filter.set_active_columns(&columns, &ids);

        let key = if individual {
            filter.set_mode(FilterMode::Individual);
            "c0".to_string()
        } else {
            GLOBAL_KEY.to_string()
        };

        filter.set_value(key.clone(), needle.clone());
        let once = visible_ids(&filter.apply(&columns, &rows));

        filter.set_value(key, needle);
        let twice = visible_ids(&filter.apply(&columns, &rows));
        prop_assert_eq!(&once, &twice);

        // Filtering the filtered rows again changes nothing either.
        let first: Vec<Row> = filter.apply(&columns, &rows).into_iter().cloned().collect();
        let again = visible_ids(&filter.apply(&columns, &first));
        prop_assert_eq!(once, again);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn global_mode_without_active_columns_matches_all(
        rows in arb_rows(20),
        needle in r"[a-zA-Z0-9 ]{0,6}",
    ) {
        let columns = text_columns(6);
        let mut filter = FilterState::for_columns(&columns);
        filter.set_active_columns(&columns, &[]);
        filter.set_global(needle);

        prop_assert_eq!(filter.apply(&columns, &rows).len(), rows.len());
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn collapse_needs_secondary_columns(
        shapes in proptest::collection::vec(arb_column_shape(), 0..8),
        width in 0u32..2000,
        hidden in proptest::collection::vec(prop::bool::ANY, 8),
    ) {
        let columns = build_columns(&shapes);
        let visibility: BTreeMap<String, bool> = (0..shapes.len())
            .filter(|i| hidden[*i])
            .map(|i| (format!("c{}", i), false))
            .collect();

        let classification = classify(&columns, &visibility);
        let plan = LayoutPlan::compute(&columns, &visibility, width, DEFAULT_TABLET_BREAKPOINT);

        if classification.secondary.is_empty() {
            prop_assert!(!plan.collapse_mode);
        }
        prop_assert_eq!(
            plan.collapse_mode,
            width < DEFAULT_TABLET_BREAKPOINT && !classification.secondary.is_empty()
        );
        prop_assert_eq!(plan.inline.contains(&Slot::ExpandToggle), plan.collapse_mode);
        for id in &classification.system {
            prop_assert!(plan.inline.contains(&Slot::Column(id.clone())));
        }
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn primary_only_grids_never_collapse(
        n in 0usize..6,
        width in 0u32..5000,
    ) {
        let columns = ColumnSet::new(
            (0..n).map(|i| ColumnDef::new(format!("c{}", i)).primary()).collect(),
        )
        .unwrap();
        let plan = LayoutPlan::compute(&columns, &BTreeMap::new(), width, DEFAULT_TABLET_BREAKPOINT);
        prop_assert!(!plan.collapse_mode);
        prop_assert!(plan.panel.is_empty());
    }
}
