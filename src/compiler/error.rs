//! Compiler errors

use std::fmt;

use crate::error::{QueryError, Unsupported};
use crate::model::ModelError;

/// Errors that can occur while compiling a request
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The request references model elements that do not exist or do not fit
    Config(ModelError),
    /// The request itself is malformed
    Query(QueryError),
    /// The request asks for an operation that is recognized but not implemented
    Unsupported(Unsupported),
}

impl CompileError {
    /// True for recognized-but-unimplemented operations
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CompileError::Unsupported(_))
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Config(err) => write!(f, "Configuration error: {}", err),
            CompileError::Query(err) => write!(f, "Query error: {}", err),
            CompileError::Unsupported(err) => write!(f, "Unsupported operation: {}", err),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Config(err) => Some(err),
            CompileError::Query(err) => Some(err),
            CompileError::Unsupported(err) => Some(err),
        }
    }
}

impl From<ModelError> for CompileError {
    fn from(err: ModelError) -> Self {
        CompileError::Config(err)
    }
}

impl From<QueryError> for CompileError {
    fn from(err: QueryError) -> Self {
        CompileError::Query(err)
    }
}

impl From<Unsupported> for CompileError {
    fn from(err: Unsupported) -> Self {
        CompileError::Unsupported(err)
    }
}
