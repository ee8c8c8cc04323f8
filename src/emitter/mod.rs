//! SQL emitter (verb module)
//!
//! Transforms a compiled [`Query`](crate::plan::Query) into SQL text.

mod error;
mod sql;

pub use error::EmitError;
pub use sql::{quote_identifier, render_parameterized, render_sql, BoundStatement, Placeholder};
