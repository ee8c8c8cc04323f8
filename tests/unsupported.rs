//! Integration tests for recognized but unimplemented operations and
//! per-request query errors

mod common;

use common::{counting_browser, sales_browser};
use cubist::{
    path, AggregateOptions, BrowserError, CompileError, ComputedFields, QueryError, Unsupported,
};

fn options(json: &str) -> AggregateOptions {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn test_set_cut_is_unsupported() {
    let (browser, store) = counting_browser();
    let mut slice = browser
        .full_cube()
        .cut_by_set("date", vec![path![2022], path![2023]]);

    let err = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(err, BrowserError::Compile(CompileError::Unsupported(Unsupported::SetCut)));
    // nothing reaches the store
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_percent_and_value_limits_are_unsupported() {
    let browser = sales_browser();
    let mut slice = browser.full_cube();

    for (kind, expected) in [("percent", Unsupported::PercentLimit), ("value", Unsupported::ValueLimit)] {
        let opts = options(&format!(
            r#"{{"row_dimension": "date", "row_levels": ["year"], "limit": "{}", "limit_value": 50}}"#,
            kind
        ));
        let err = browser
            .aggregate(&mut slice, "amount", &opts, &ComputedFields::new())
            .await
            .unwrap_err();
        assert_eq!(err, BrowserError::Compile(CompileError::Unsupported(expected)));
    }
}

#[tokio::test]
async fn test_query_errors_are_not_unsupported() {
    let browser = sales_browser();
    let mut slice = browser.full_cube();

    let cases = [
        (r#"{"aggregations": ["median"]}"#, QueryError::UnknownAggregation("median".into())),
        (
            r#"{"row_dimension": "date", "row_levels": ["year"], "order_direction": "up"}"#,
            QueryError::UnknownOrderDirection("up".into()),
        ),
        (
            r#"{"row_dimension": "date", "row_levels": ["year"], "limit": "rank", "limit_value": 3, "limit_aggregation": "max"}"#,
            QueryError::LimitAggregationNotSelected("max".into()),
        ),
        (r#"{"limit": "rank", "limit_value": 3}"#, QueryError::LimitWithoutDrillDown),
        (r#"{"limit": "sideways"}"#, QueryError::UnknownLimit("sideways".into())),
    ];

    for (json, expected) in cases {
        let err = browser
            .aggregate(&mut slice, "amount", &options(json), &ComputedFields::new())
            .await
            .unwrap_err();
        assert!(!err.is_unsupported());
        assert_eq!(err, BrowserError::Compile(CompileError::Query(expected)));
    }
}

#[tokio::test]
async fn test_path_longer_than_hierarchy() {
    let browser = sales_browser();
    let mut slice = browser.full_cube().cut_by_point("date", path![2023, 1, 15]);
    let err = browser
        .aggregate(&mut slice, "amount", &AggregateOptions::default(), &ComputedFields::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BrowserError::Compile(CompileError::Query(QueryError::PathTooLong { path_len: 3, levels: 2, .. }))
    ));
}
