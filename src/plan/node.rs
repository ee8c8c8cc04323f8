//! Query statement types

use super::expr::{AggregateExpr, Column, Expr};

/// Alias of the fact source in compiled statements
pub const SOURCE_ALIAS: &str = "v";
/// Alias of the derived drill statement under a rank limit
pub const DERIVED_ALIAS: &str = "s";

/// A single SELECT statement
///
/// Everything a data store needs: the source, projections, predicate,
/// grouping, ordering and row window. Render it with
/// [`emitter`](crate::emitter) or interpret it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub source: Source,
    /// Projected columns and aggregates; empty selects every column
    pub projections: Vec<Projection>,
    /// WHERE predicate
    pub filter: Option<Expr>,
    /// GROUP BY columns
    pub group_by: Vec<Column>,
    pub order_by: Vec<SortKey>,
    /// Maximum number of rows
    pub limit: Option<u64>,
    /// Rows to skip
    pub offset: Option<u64>,
}

impl Query {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            projections: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn with_projections(mut self, projections: Vec<Projection>) -> Self {
        self.projections = projections;
        self
    }

    pub fn with_filter(mut self, filter: Option<Expr>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_group_by(mut self, group_by: Vec<Column>) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_order_by(mut self, order_by: Vec<SortKey>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn with_window(mut self, limit: Option<u64>, offset: Option<u64>) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Does any projection aggregate?
    pub fn is_aggregate(&self) -> bool {
        !self.group_by.is_empty()
            || self.projections.iter().any(|p| matches!(p, Projection::Aggregate(_)))
    }

    /// Output column names, in projection order
    pub fn output_names(&self) -> Vec<&str> {
        self.projections.iter().map(Projection::output_name).collect()
    }
}

/// Where rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Table or view, possibly schema-qualified (`schema.table`)
    Table { name: String, alias: String },
    /// Trusted SELECT statement from the model configuration
    Statement { sql: String, alias: String },
    /// Another compiled query
    Derived { query: Box<Query>, alias: String },
}

impl Source {
    /// A table for identifier paths, otherwise a configured statement
    pub fn from_fact(fact: &str, alias: impl Into<String>) -> Self {
        let is_identifier_path = !fact.is_empty()
            && fact.split('.').all(|part| {
                !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_')
            });
        if is_identifier_path {
            Source::Table { name: fact.to_string(), alias: alias.into() }
        } else {
            Source::Statement { sql: fact.to_string(), alias: alias.into() }
        }
    }
}

/// A projected output column
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Column { column: Column, alias: Option<String> },
    Aggregate(AggregateExpr),
}

impl Projection {
    pub fn column(column: Column, alias: impl Into<String>) -> Self {
        Projection::Column { column, alias: Some(alias.into()) }
    }

    /// Name of the column in result rows
    pub fn output_name(&self) -> &str {
        match self {
            Projection::Column { column, alias } => alias.as_deref().unwrap_or(&column.name),
            Projection::Aggregate(agg) => &agg.alias,
        }
    }
}

/// A sort key with direction
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub column: Column,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}
