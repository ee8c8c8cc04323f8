//! Data-store adapter boundary
//!
//! A [`DataStore`] executes compiled [`Query`] statements and returns rows.
//! The browser runs it under an [`ExecutionContext`] carrying an optional
//! timeout and cancellation signal.

mod context;
mod memory;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::plan::Query;

pub use context::{cancellation, execute_within, CancelHandle, Cancellation, ExecutionContext};
pub use memory::InMemoryStore;

/// A result row: output field -> value
pub type Row = serde_json::Map<String, Value>;

/// Errors reported by a data store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backend rejected or failed the statement
    Backend(String),
    /// The statement did not finish within the context's timeout
    Timeout(Duration),
    /// The caller cancelled the statement
    Cancelled,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "Backend error: {}", msg),
            StoreError::Timeout(limit) => write!(f, "Statement timed out after {:?}", limit),
            StoreError::Cancelled => write!(f, "Statement cancelled"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A store failure annotated with the statement that failed
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionError {
    /// Rendered SQL of the failing statement
    pub statement: String,
    pub source: StoreError,
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Execution failed: {}\nStatement:\n{}", self.source, self.statement)
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Backend that executes compiled statements
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Execute one statement and return its rows
    async fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Backend type for logging
    fn backend_type(&self) -> &'static str;
}
