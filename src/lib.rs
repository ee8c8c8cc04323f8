//! cubist - Dimensional modeling and OLAP query compilation
//!
//! This library provides:
//! - Model definition types (Model, Cube, Dimension, Hierarchy, Level)
//! - Model parsing from YAML or JSON
//! - Cut algebra (point, range and set cuts)
//! - Query compilation into structured statements
//! - SQL emission, with inline-escaped or parameter-bound literals
//! - An aggregation browser that executes statements through a data store
//!   and assembles summaries, drill-down rows and remainders
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `model/` - dimensional model (Model, Cube, Dimension, Hierarchy, Level)
//! - `cut/` - slice predicates (Cut, PathValue)
//! - `query/` - request options (AggregateOptions, PageOptions)
//! - `plan/` - structured statements (Query, Source, Projection, Expr)
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML/JSON → Model
//! - `resolver/` - cuts + option strings → model-bound references
//! - `compiler/` - Cube + cuts + options → Query
//! - `emitter/` - Query → SQL
//! - `browser/` - Slice + measure → AggregationResult, via a `store/` adapter
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cubist::{parser, path, AggregateOptions, AggregationBrowser, ComputedFields, InMemoryStore};
//!
//! let model = Arc::new(parser::parse_file("model.yaml")?);
//! let store = Arc::new(InMemoryStore::new().with_table("sales", rows));
//! let browser = AggregationBrowser::new(model, "sales", store)?;
//!
//! let mut slice = browser.full_cube().cut_by_point("date", path![2023]);
//! let options = AggregateOptions {
//!     row_dimension: Some("date".into()),
//!     row_levels: Some(vec!["month".into()]),
//!     ..Default::default()
//! };
//! let result = browser.aggregate(&mut slice, "amount", &options, &ComputedFields::new()).await?;
//! ```

pub mod model;
pub mod cut;
pub mod query;
pub mod plan;
pub mod parser;
pub mod resolver;
pub mod compiler;
pub mod emitter;
pub mod store;
pub mod browser;
pub mod error;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use model::{
    aggregated_field_name, Aggregation, Cube, CubeId, Dimension, DimensionId, Hierarchy, Level, Model,
    ModelDescription, ModelError, ModelId,
};
pub use cut::{Cut, PathValue, PointCut, RangeCut, SetCut};
pub use query::{AggregateOptions, PageOptions};
pub use plan::{Query, Source};
pub use compiler::{CompileError, CompiledAggregation, QueryCompiler};
pub use emitter::{render_parameterized, render_sql, BoundStatement, EmitError, Placeholder};
pub use store::{
    cancellation, DataStore, ExecutionContext, ExecutionError, InMemoryStore, Row, StoreError,
};
pub use browser::{
    AggregationBrowser, AggregationResult, BrowserError, ComputedField, ComputedFields, Remainder,
    Slice, Summary,
};
pub use error::{ParseError, QueryError, Unsupported};
