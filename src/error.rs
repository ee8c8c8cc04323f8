//! Error types shared across modules

use std::fmt;
use crate::model::ModelError;

/// Errors that can occur while loading a model description
#[derive(Debug)]
pub enum ParseError {
    /// IO error reading file
    Io {
        path: String,
        source: std::io::Error,
    },
    /// YAML deserialization error
    Yaml {
        source: serde_yaml::Error,
    },
    /// JSON deserialization error
    Json {
        source: serde_json::Error,
    },
    /// The description was well-formed but does not describe a valid model
    Model {
        source: ModelError,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io { path, source } => {
                write!(f, "Failed to read '{}': {}", path, source)
            }
            ParseError::Yaml { source } => {
                write!(f, "Invalid YAML: {}", source)
            }
            ParseError::Json { source } => {
                write!(f, "Invalid JSON: {}", source)
            }
            ParseError::Model { source } => {
                write!(f, "Invalid model: {}", source)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io { source, .. } => Some(source),
            ParseError::Yaml { source } => Some(source),
            ParseError::Json { source } => Some(source),
            ParseError::Model { source } => Some(source),
        }
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        ParseError::Yaml { source: err }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json { source: err }
    }
}

impl From<ModelError> for ParseError {
    fn from(err: ModelError) -> Self {
        ParseError::Model { source: err }
    }
}

/// Errors in a single query request. Fatal for that request only.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Cut or lookup path is deeper than the hierarchy
    PathTooLong {
        hierarchy: String,
        path_len: usize,
        levels: usize,
    },
    /// Path already addresses the deepest level, nothing follows it
    NoNextLevel {
        hierarchy: String,
        path_len: usize,
    },
    UnknownAggregation(String),
    UnknownOrderDirection(String),
    /// Ordering by a field the statement does not output
    UnknownOrderField(String),
    UnknownLimit(String),
    /// Rank limit references an aggregation that is not projected
    LimitAggregationNotSelected(String),
    MissingLimitValue,
    InvalidLimitValue(f64),
    /// Limits need the drill statement to rank rows
    LimitWithoutDrillDown,
    /// `page` was given without `page_size`
    MissingPageSize,
    /// Drill-down requested without naming the row dimension
    MissingRowDimension,
    /// Value cannot be used as a predicate literal (arrays, objects)
    UnsupportedValue(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::PathTooLong { hierarchy, path_len, levels } => write!(
                f,
                "Path of length {} is longer than hierarchy '{}' with {} levels",
                path_len, hierarchy, levels
            ),
            QueryError::NoNextLevel { hierarchy, path_len } => write!(
                f,
                "Path of length {} is a base path of hierarchy '{}', there is no next level",
                path_len, hierarchy
            ),
            QueryError::UnknownAggregation(name) => write!(
                f,
                "Unknown aggregation operator '{}'. Valid options: sum, count, average, min, max",
                name
            ),
            QueryError::UnknownOrderDirection(dir) => write!(
                f,
                "Unknown order direction '{}'. Valid options: asc, ascending, desc, descending",
                dir
            ),
            QueryError::UnknownOrderField(field) => {
                write!(f, "Cannot order by '{}', it is not an output field", field)
            }
            QueryError::UnknownLimit(kind) => write!(
                f,
                "Unknown limit '{}'. Valid options: rank, top_10, percent, value",
                kind
            ),
            QueryError::LimitAggregationNotSelected(agg) => {
                write!(f, "Invalid aggregation '{}' to limit, it is not among the selected aggregations", agg)
            }
            QueryError::MissingLimitValue => {
                write!(f, "Limit value for aggregation rank limit not provided")
            }
            QueryError::InvalidLimitValue(v) => {
                write!(f, "Rank limit value must be a positive whole number, got {}", v)
            }
            QueryError::LimitWithoutDrillDown => {
                write!(f, "Limits require a drill-down (row_levels or drilldown)")
            }
            QueryError::MissingPageSize => write!(f, "Page requested without page_size"),
            QueryError::MissingRowDimension => {
                write!(f, "Drill-down requested without row_dimension")
            }
            QueryError::UnsupportedValue(v) => {
                write!(f, "Value {} cannot be used in a predicate", v)
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// Operations that are recognized but deliberately not implemented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsupported {
    SetCut,
    PercentLimit,
    ValueLimit,
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unsupported::SetCut => write!(f, "Set cuts are not supported"),
            Unsupported::PercentLimit => write!(f, "Percent limits are not supported"),
            Unsupported::ValueLimit => write!(f, "Value limits are not supported"),
        }
    }
}

impl std::error::Error for Unsupported {}
