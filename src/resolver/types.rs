//! Types for resolved request components

use std::sync::Arc;

use serde_json::Value;

use crate::model::{Aggregation, Dimension, Hierarchy, Level};
use crate::plan::SortDirection;

/// A cut bound to the cube being queried
#[derive(Debug, Clone)]
pub enum ResolvedCut<'a> {
    /// Concrete path positions paired with their levels; wildcards are dropped
    Point {
        dimension: &'a Dimension,
        hierarchy: &'a Hierarchy,
        steps: Vec<(&'a Arc<Level>, &'a Value)>,
    },
    /// Inclusive range over the dimension's key field
    Range {
        dimension: &'a Dimension,
        key_field: &'a str,
        from: &'a Value,
        to: &'a Value,
    },
}

/// Levels a drill statement groups by
#[derive(Debug, Clone)]
pub struct ResolvedDrill<'a> {
    pub dimension: &'a Dimension,
    pub levels: Vec<&'a Arc<Level>>,
}

/// A rank limit over drill rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLimit {
    /// Aggregation whose field the rows are ranked by
    pub aggregation: Aggregation,
    /// Row cap
    pub value: u64,
    pub direction: SortDirection,
}

/// Row window of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
