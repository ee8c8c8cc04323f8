//! Integration tests for aggregation through the browser
//!
//! Compiled statements run on the in-memory store over tests/test_data/sales_rows.json.

mod common;

use std::sync::Arc;

use common::{amount, counting_browser, load_fixture, sales_browser, FailingStore};
use cubist::{
    path, AggregateOptions, AggregationBrowser, Aggregation, BrowserError, ComputedFields, Cut,
    InMemoryStore, Row, StoreError,
};
use serde_json::{json, Value};

fn options(json: &str) -> AggregateOptions {
    serde_json::from_str(json).unwrap()
}

// ============================================================================
// Summary and drill-down
// ============================================================================

#[tokio::test]
async fn test_summary_without_drill_down() {
    let browser = sales_browser();
    let mut slice = browser.full_cube();

    let result = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap();

    assert_eq!(result.measure, "amount");
    assert_eq!(result.summary.sum(), Some(1263.0));
    assert_eq!(result.summary.record_count, 9);
    assert!(result.rows.is_empty());
    assert!(result.remainder.is_none());
}

#[tokio::test]
async fn test_month_drill_down_within_year() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);

    let opts = options(r#"{"row_dimension": "date", "row_levels": ["month"]}"#);
    let result = browser
        .aggregate(&mut slice, "amount", &opts, &ComputedFields::new())
        .await
        .unwrap();

    let months: Vec<&Value> = result.rows.iter().map(|r| &r["date.month"]).collect();
    assert_eq!(months, vec![&json!(1), &json!(2), &json!(3), &json!(4), &json!(5)]);

    let sums: Vec<f64> = result.rows.iter().map(|r| amount(r, "amount_sum")).collect();
    assert_eq!(sums, vec![30.0, 31.0, 45.0, 50.0, 7.0]);
    let counts: Vec<f64> = result.rows.iter().map(|r| amount(r, "record_count")).collect();
    assert_eq!(counts, vec![2.0, 1.0, 2.0, 1.0, 1.0]);
    assert_eq!(result.rows[0]["date.month_name"], json!("January"));

    // grouping does not change the summary
    assert_eq!(result.summary.sum(), Some(163.0));
    assert_eq!(result.summary.record_count, 7);
    assert_eq!(result.summary.sum(), Some(sums.iter().sum()));
}

#[tokio::test]
async fn test_implicit_drill_down() {
    let browser = sales_browser();
    let mut slice = browser.full_cube();

    let opts = options(r#"{"row_dimension": "date", "drilldown": true}"#);
    let result = browser
        .aggregate(&mut slice, "amount", &opts, &ComputedFields::new())
        .await
        .unwrap();
    let years: Vec<&Value> = result.rows.iter().map(|r| &r["date.year"]).collect();
    assert_eq!(years, vec![&json!(2022), &json!(2023), &json!(2024)]);

    let mut in_2023 = browser.full_cube().cut_by_point("date", path![2023]);
    let result = browser
        .aggregate(&mut in_2023, "amount", &opts, &ComputedFields::new())
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 5);
    assert!(result.rows.iter().all(|r| r["date.year"] == json!(2023)));
}

#[tokio::test]
async fn test_several_aggregations() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);

    let opts = options(r#"{"aggregations": ["sum", "min", "max", "average", "count"]}"#);
    let result = browser
        .aggregate(&mut slice, "amount", &opts, &ComputedFields::new())
        .await
        .unwrap();

    assert_eq!(result.summary.get(Aggregation::Min), Some(5.0));
    assert_eq!(result.summary.get(Aggregation::Max), Some(50.0));
    assert_eq!(result.summary.get(Aggregation::Count), Some(7.0));
    let avg = result.summary.get(Aggregation::Average).unwrap();
    assert!((avg - 163.0 / 7.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_range_cut() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_range("date", 20230101, 20230228);
    let result = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap();
    assert_eq!(result.summary.sum(), Some(61.0));
    assert_eq!(result.summary.record_count, 3);
}

#[tokio::test]
async fn test_empty_slice() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![1999]);
    let result = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap();
    assert_eq!(result.summary.sum(), None);
    assert_eq!(result.summary.record_count, 0);
}

// ============================================================================
// Limits and remainder
// ============================================================================

#[tokio::test]
async fn test_rank_limit_over_years() {
    let browser = sales_browser();
    let mut slice = browser.full_cube();

    let opts = options(
        r#"{"row_dimension": "date", "row_levels": ["year"], "limit": "rank",
            "limit_value": 3, "limit_sort": "descending"}"#,
    );
    let result = browser
        .aggregate(&mut slice, "amount", &opts, &ComputedFields::new())
        .await
        .unwrap();

    assert!(result.rows.len() <= 3);
    let sums: Vec<f64> = result.rows.iter().map(|r| amount(r, "amount_sum")).collect();
    assert_eq!(sums, vec![1000.0, 163.0, 100.0]);

    let remainder = result.remainder.unwrap();
    let returned: f64 = sums.iter().sum();
    assert_eq!(remainder.sum, Some(result.summary.sum().unwrap() - returned));
    assert_eq!(remainder.sum, Some(0.0));
    assert_eq!(remainder.record_count, 0);
}

#[tokio::test]
async fn test_rank_limit_leaves_remainder() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);

    let opts = options(
        r#"{"row_dimension": "date", "row_levels": ["month"], "limit": "rank",
            "limit_value": 3, "limit_sort": "top"}"#,
    );
    let result = browser
        .aggregate(&mut slice, "amount", &opts, &ComputedFields::new())
        .await
        .unwrap();

    let months: Vec<&Value> = result.rows.iter().map(|r| &r["date.month"]).collect();
    assert_eq!(months, vec![&json!(4), &json!(3), &json!(2)]);

    let remainder = result.remainder.unwrap();
    assert_eq!(remainder.sum, Some(163.0 - 126.0));
    assert_eq!(remainder.record_count, 3);
}

#[tokio::test]
async fn test_bottom_rank_and_top_10() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);

    let bottom = options(
        r#"{"row_dimension": "date", "row_levels": ["month"], "limit": "rank",
            "limit_value": 2, "limit_sort": "bottom"}"#,
    );
    let result = browser
        .aggregate(&mut slice, "amount", &bottom, &ComputedFields::new())
        .await
        .unwrap();
    let sums: Vec<f64> = result.rows.iter().map(|r| amount(r, "amount_sum")).collect();
    assert_eq!(sums, vec![7.0, 30.0]);

    let top = options(r#"{"row_dimension": "date", "row_levels": ["month"], "limit": "top_10"}"#);
    let result = browser
        .aggregate(&mut slice, "amount", &top, &ComputedFields::new())
        .await
        .unwrap();
    assert_eq!(result.rows.len(), 5);
    assert_eq!(amount(&result.rows[0], "amount_sum"), 50.0);
    assert_eq!(result.remainder.unwrap().sum, Some(0.0));
}

// ============================================================================
// Summary cache and copy-on-write slices
// ============================================================================

#[tokio::test]
async fn test_summary_is_cached_per_slice() {
    let (browser, store) = counting_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);
    let opts = AggregateOptions::default();

    browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(store.calls(), 1);
    browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(store.calls(), 1);
    assert_eq!(slice.cached_summaries(), 1);

    // a different aggregation set is a different summary
    let minmax = options(r#"{"aggregations": ["min", "max"]}"#);
    browser.aggregate(&mut slice, "amount", &minmax, &ComputedFields::new()).await.unwrap();
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn test_adding_cut_invalidates_summary() {
    let (browser, store) = counting_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);
    let opts = AggregateOptions::default();

    let before = browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(before.summary.sum(), Some(163.0));

    slice.add_cut(Cut::point("store", path![2]));
    assert_eq!(slice.cached_summaries(), 0);

    let after = browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(store.calls(), 2);
    assert_eq!(after.summary.sum(), Some(67.0));

    slice.remove_cuts_by_dimension("store");
    let restored = browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(store.calls(), 3);
    assert_eq!(restored.summary.sum(), Some(163.0));
}

#[tokio::test]
async fn test_adding_cut_invalidates_every_measure() {
    let (browser, store) = counting_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);
    let opts = AggregateOptions::default();

    let amount_2023 = browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    let quantity_2023 = browser.aggregate(&mut slice, "quantity", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(amount_2023.summary.sum(), Some(163.0));
    assert_eq!(quantity_2023.summary.sum(), Some(14.0));
    assert_eq!(slice.cached_summaries(), 2);
    assert_eq!(store.calls(), 2);

    slice.add_cut(Cut::point("store", path![2]));
    assert_eq!(slice.cached_summaries(), 0);

    let amount_airport = browser.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    let quantity_airport = browser.aggregate(&mut slice, "quantity", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(store.calls(), 4);
    assert_eq!(amount_airport.summary.sum(), Some(67.0));
    assert_eq!(quantity_airport.summary.sum(), Some(4.0));
}

#[tokio::test]
async fn test_summary_cache_follows_view() {
    let archive: Row = json!({"id": 100, "sale_year": 2023, "amount": 100, "quantity": 1})
        .as_object()
        .unwrap()
        .clone();
    let store = InMemoryStore::new()
        .with_table("sales_view", common::sales_rows())
        .with_table("archive", vec![archive]);
    let live = AggregationBrowser::new(Arc::new(load_fixture("sales.yaml")), "sales", Arc::new(store)).unwrap();
    let archived = live.clone().with_view("archive");
    let mut slice = live.full_cube();
    let opts = AggregateOptions::default();

    let from_live = live.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    let from_archive = archived.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(from_live.summary.sum(), Some(1263.0));
    assert_eq!(from_archive.summary.sum(), Some(100.0));
    assert_eq!(slice.cached_summaries(), 2);

    let again = live.aggregate(&mut slice, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(again.summary.sum(), Some(1263.0));
}

#[tokio::test]
async fn test_cut_by_does_not_mutate_receiver() {
    let browser = sales_browser();
    let mut full = browser.full_cube();
    let mut narrowed = full.cut_by_point("date", path![2022]);
    assert_eq!(full.cuts().len(), 0);
    assert_eq!(narrowed.cuts().len(), 1);

    let opts = AggregateOptions::default();
    let all = browser.aggregate(&mut full, "amount", &opts, &ComputedFields::new()).await.unwrap();
    let some = browser.aggregate(&mut narrowed, "amount", &opts, &ComputedFields::new()).await.unwrap();
    assert_eq!(all.summary.sum(), Some(1263.0));
    assert_eq!(some.summary.sum(), Some(100.0));
}

// ============================================================================
// Computed fields
// ============================================================================

fn share_of_2023(row: &Row) -> Value {
    let sum = row.get("amount_sum").and_then(Value::as_f64).unwrap_or(0.0);
    json!(sum / 163.0)
}

fn is_big(row: &Row) -> Value {
    json!(row.get("amount_sum").and_then(Value::as_f64).unwrap_or(0.0) >= 45.0)
}

#[tokio::test]
async fn test_computed_fields_applied_to_rows() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);
    let opts = options(r#"{"row_dimension": "date", "row_levels": ["month"]}"#);
    let computed = ComputedFields::new().with("share", share_of_2023).with("big", is_big);

    let result = browser.aggregate(&mut slice, "amount", &opts, &computed).await.unwrap();
    let big: Vec<&Value> = result.rows.iter().map(|r| &r["big"]).collect();
    assert_eq!(big, vec![&json!(false), &json!(false), &json!(true), &json!(true), &json!(false)]);
    let shares: f64 = result.rows.iter().map(|r| amount(r, "share")).sum();
    assert!((shares - 1.0).abs() < 1e-9);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_slice_of_other_cube_is_rejected() {
    let browser = sales_browser();
    let mut foreign = cubist::Slice::new("returns");
    let err = browser
        .aggregate(&mut foreign, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BrowserError::SliceMismatch { .. }));
}

#[tokio::test]
async fn test_store_failure_carries_statement() {
    let model = Arc::new(load_fixture("sales.yaml"));
    let browser = AggregationBrowser::new(model, "sales", Arc::new(FailingStore)).unwrap();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023]);

    let err = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap_err();
    match err {
        BrowserError::Execution(exec) => {
            assert_eq!(exec.source, StoreError::Backend("connection refused".into()));
            assert!(exec.statement.contains("FROM \"sales_view\" AS \"v\""), "{}", exec.statement);
            assert!(exec.statement.contains("\"v\".\"sale_year\" = 2023"), "{}", exec.statement);
        }
        other => panic!("expected execution error, got {:?}", other),
    }
    assert_eq!(slice.cached_summaries(), 0);
}

#[tokio::test]
async fn test_view_override_is_used() {
    let browser = sales_browser().with_view("missing_view");
    let mut slice = browser.full_cube();
    let err = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap_err();
    match err {
        BrowserError::Execution(exec) => assert!(exec.statement.contains("\"missing_view\"")),
        other => panic!("expected execution error, got {:?}", other),
    }
}
