//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cubist::{parser, AggregationBrowser, DataStore, InMemoryStore, Model, Query, Row, StoreError};

/// Load a model fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Model {
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// Fact rows of the `sales_view` table
pub fn sales_rows() -> Vec<Row> {
    let contents = std::fs::read_to_string("tests/test_data/sales_rows.json")
        .unwrap_or_else(|e| panic!("Failed to read sales rows: {}", e));
    serde_json::from_str(&contents).unwrap_or_else(|e| panic!("Invalid sales rows: {}", e))
}

pub fn sales_store() -> InMemoryStore {
    InMemoryStore::new().with_table("sales_view", sales_rows())
}

/// Browser over the `sales` cube backed by the in-memory fact rows
pub fn sales_browser() -> AggregationBrowser {
    let model = Arc::new(load_fixture("sales.yaml"));
    AggregationBrowser::new(model, "sales", Arc::new(sales_store())).unwrap()
}

/// A store that counts executed statements
pub struct CountingStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataStore for CountingStore {
    async fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(query).await
    }

    fn backend_type(&self) -> &'static str {
        "counting"
    }
}

pub fn counting_browser() -> (AggregationBrowser, Arc<CountingStore>) {
    let model = Arc::new(load_fixture("sales.yaml"));
    let store = Arc::new(CountingStore::new(sales_store()));
    let browser = AggregationBrowser::new(model, "sales", store.clone()).unwrap();
    (browser, store)
}

/// A store whose backend always fails
pub struct FailingStore;

#[async_trait]
impl DataStore for FailingStore {
    async fn execute(&self, _query: &Query) -> Result<Vec<Row>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    fn backend_type(&self) -> &'static str {
        "failing"
    }
}

pub fn amount(row: &Row, field: &str) -> f64 {
    row.get(field)
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("row has no numeric '{}': {:?}", field, row))
}
