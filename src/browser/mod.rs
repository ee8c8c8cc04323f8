//! Aggregation browser (verb module)
//!
//! Binds a cube to slices of cuts, drives compilation and execution, and
//! assembles summaries, drill rows and remainders.

mod browse;
mod error;
mod result;
mod slice;

pub use browse::AggregationBrowser;
pub use error::BrowserError;
pub use result::{AggregationResult, ComputedField, ComputedFields, Remainder, Summary};
pub use slice::Slice;
