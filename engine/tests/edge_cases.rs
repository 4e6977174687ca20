//! Edge case tests for tablesync-engine
//!
//! These tests cover the sync scenarios end to end and unusual inputs.

use serde_json::json;
use tablesync_engine::{
    from_columns, group_by_columns, obsolete_ids, plan_sync, to_columns, CellValue, ColumnId,
    Error, Filter, Record,
};

fn cols(names: &[&str]) -> Vec<ColumnId> {
    names.iter().map(|s| s.to_string()).collect()
}

fn rec(value: serde_json::Value) -> Record {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn new_invoice_is_added() {
    let source = vec![rec(json!({"Invoice_ID": 7, "Date": 100}))];
    let filter = Filter::by("Invoice_ID", [CellValue::from(7)]);
    let plan = plan_sync(vec![], &source, &cols(&["Invoice_ID"]), Some(&filter)).unwrap();

    assert!(plan.updates.is_empty());
    assert_eq!(plan.additions, vec![rec(json!({"Invoice_ID": 7, "Date": 100}))]);
}

#[test]
fn changed_invoice_is_patched() {
    let existing = vec![rec(json!({"id": 3, "Invoice_ID": 7, "Date": 100}))];
    let source = vec![rec(json!({"Invoice_ID": 7, "Date": 200}))];
    let plan = plan_sync(existing, &source, &cols(&["Invoice_ID"]), None).unwrap();

    assert_eq!(plan.updates, vec![rec(json!({"id": 3, "Date": 200}))]);
    assert!(plan.additions.is_empty());
}

#[test]
fn removed_item_is_obsolete() {
    let existing = vec![
        rec(json!({"id": 1, "Description": "A"})),
        rec(json!({"id": 2, "Description": "B"})),
    ];
    let synced = vec![rec(json!({"Description": "A"}))];

    assert_eq!(
        obsolete_ids(&existing, &synced, &cols(&["Description"])).unwrap(),
        vec![2]
    );
}

#[test]
fn filtered_sync_of_items() {
    // Items of invoice 10 only; the row for invoice 11 must not be touched
    let existing = vec![
        rec(json!({"id": 1, "Invoice": 10, "Description": "A", "Price": 1})),
        rec(json!({"id": 2, "Invoice": 10, "Description": "B", "Price": 2})),
    ];
    let source = vec![
        rec(json!({"Invoice": 10, "Description": "A", "Price": 1})),
        rec(json!({"Invoice": 10, "Description": "B", "Price": 5})),
        rec(json!({"Invoice": 10, "Description": "C", "Price": 3})),
        rec(json!({"Invoice": 11, "Description": "A", "Price": 9})),
    ];
    let filter = Filter::by("Invoice", [CellValue::from(10)]);
    let plan = plan_sync(
        existing,
        &source,
        &cols(&["Invoice", "Description"]),
        Some(&filter),
    )
    .unwrap();

    assert_eq!(plan.updates, vec![rec(json!({"id": 2, "Price": 5}))]);
    assert_eq!(
        plan.additions,
        vec![rec(json!({"Invoice": 10, "Description": "C", "Price": 3}))]
    );
    assert_eq!(plan.unchanged, 1);
    assert_eq!(plan.filtered_out, 1);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn filter_must_use_key_columns() {
    let keys = cols(&["A", "B"]);
    assert!(plan_sync(vec![], &[], &keys, Some(&Filter::by("A", [CellValue::from(1)]))).is_ok());
    assert_eq!(
        plan_sync(vec![], &[], &keys, Some(&Filter::by("C", [CellValue::from(1)]))),
        Err(Error::FilterColumnNotKey("C".into()))
    );
}

#[test]
fn filtered_out_rows_need_no_key() {
    // Rows outside the filter are skipped before their key is read
    let source = vec![rec(json!({"A": 2}))];
    let filter = Filter::by("A", [CellValue::from(1)]);
    let plan = plan_sync(vec![], &source, &cols(&["A", "B"]), Some(&filter)).unwrap();
    assert_eq!(plan.filtered_out, 1);
}

#[test]
fn empty_key_pairs_everything() {
    let existing = vec![rec(json!({"id": 1, "A": 1}))];
    let source = vec![rec(json!({"A": 2}))];
    let plan = plan_sync(existing, &source, &[], None).unwrap();
    assert_eq!(plan.updates, vec![rec(json!({"id": 1, "A": 2}))]);
}

// ============================================================================
// Value Edge Cases
// ============================================================================

#[test]
fn unicode_keys() {
    let names = ["日本語テスト", "Привет мир", "🎉🚀", "Hello\nWorld\tTab", ""];
    let existing: Vec<Record> = names
        .iter()
        .enumerate()
        .map(|(i, n)| Record::new().with("id", i as i64 + 1).with("Name", *n))
        .collect();
    let source: Vec<Record> = names.iter().map(|n| Record::new().with("Name", *n)).collect();

    let plan = plan_sync(existing, &source, &cols(&["Name"]), None).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.unchanged, names.len());
}

#[test]
fn integer_and_float_cells_match() {
    let existing = vec![rec(json!({"id": 1, "K": 1, "Price": 10}))];
    let source = vec![rec(json!({"K": 1.0, "Price": 10.0}))];
    let plan = plan_sync(existing, &source, &cols(&["K"]), None).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn null_cells() {
    let existing = vec![rec(json!({"id": 1, "K": null, "V": null}))];
    let source = vec![rec(json!({"K": null, "V": null}))];
    assert!(plan_sync(existing, &source, &cols(&["K"]), None)
        .unwrap()
        .is_empty());
}

#[test]
fn type_change_is_an_update() {
    let existing = vec![rec(json!({"id": 1, "K": 1, "V": "1"}))];
    let source = vec![rec(json!({"K": 1, "V": 1}))];
    let plan = plan_sync(existing, &source, &cols(&["K"]), None).unwrap();
    assert_eq!(plan.updates, vec![rec(json!({"id": 1, "V": 1}))]);
}

#[test]
fn integer_boundaries() {
    let values = [i64::MIN, i64::MAX, 0, -1, 1];
    let existing: Vec<Record> = values
        .iter()
        .enumerate()
        .map(|(i, v)| Record::new().with("id", i as i64 + 1).with("K", *v))
        .collect();
    let source: Vec<Record> = values.iter().map(|v| Record::new().with("K", *v)).collect();
    assert!(plan_sync(existing, &source, &cols(&["K"]), None)
        .unwrap()
        .is_empty());
}

// ============================================================================
// Wire Format
// ============================================================================

#[test]
fn fetched_rows_feed_the_planner() {
    let existing = from_columns(json!({
        "id": [1, 2],
        "Invoice_ID": [7, 8],
        "Date": [100, 100],
    }))
    .unwrap();
    let source = vec![
        rec(json!({"Invoice_ID": 7, "Date": 100})),
        rec(json!({"Invoice_ID": 8, "Date": 300})),
    ];
    let plan = plan_sync(existing, &source, &cols(&["Invoice_ID"]), None).unwrap();

    let groups = group_by_columns(&plan.updates);
    assert_eq!(groups.len(), 1);
    let body = serde_json::Value::Object(to_columns(&groups[&cols(&["Date"])]));
    assert_eq!(body, json!({"Date": [300], "id": [2]}));
}

#[test]
fn large_table() {
    let existing: Vec<Record> = (0..10_000i64)
        .map(|i| Record::new().with("id", i + 1).with("K", i).with("V", i % 7))
        .collect();
    let source: Vec<Record> = (0..10_000i64)
        .map(|i| Record::new().with("K", i).with("V", if i % 100 == 0 { -1 } else { i % 7 }))
        .collect();
    let plan = plan_sync(existing, &source, &cols(&["K"]), None).unwrap();
    assert_eq!(plan.updates.len(), 100);
    assert_eq!(plan.unchanged, 9_900);
}
