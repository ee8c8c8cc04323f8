//! Structured query types (noun module)
//!
//! Compiled statements as data: projections, predicates, grouping, ordering
//! and row window. Rendering to text is a separate step.

mod node;
mod expr;

pub use node::{Query, Source, Projection, SortKey, SortDirection, SOURCE_ALIAS, DERIVED_ALIAS};
pub use expr::{Expr, AggregateExpr, Column, Literal, BinaryOperator};
