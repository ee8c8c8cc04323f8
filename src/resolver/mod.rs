//! Request resolver (verb module)
//!
//! Binds string references in cuts and request options to the model: cut
//! dimensions and hierarchies, drill levels, aggregation operators, order
//! direction, paging and limits.

mod resolve;
mod types;

pub use resolve::{
    resolve_aggregations, resolve_cut, resolve_cuts, resolve_direction, resolve_drill,
    resolve_limit, resolve_window,
};
pub use types::{ResolvedCut, ResolvedDrill, ResolvedLimit, Window};
