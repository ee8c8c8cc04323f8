//! Query compiler (verb module)
//!
//! Turns a cube, its slice cuts and request options into [`Query`](crate::plan::Query)
//! statements: summary and drill aggregations, fact listings and dimension
//! value enumeration.

mod build;
mod error;

pub use build::{CompiledAggregation, QueryCompiler, RECORD_COUNT_FIELD};
pub use error::CompileError;
