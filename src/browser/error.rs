//! Browser errors

use std::fmt;

use crate::compiler::CompileError;
use crate::emitter::EmitError;
use crate::model::ModelError;
use crate::store::ExecutionError;

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserError {
    Model(ModelError),
    Compile(CompileError),
    Emit(EmitError),
    /// The data store failed; carries the failing statement
    Execution(ExecutionError),
    /// The slice belongs to another cube
    SliceMismatch { slice: String, browser: String },
}

impl BrowserError {
    /// True for recognized-but-unimplemented operations
    pub fn is_unsupported(&self) -> bool {
        matches!(self, BrowserError::Compile(err) if err.is_unsupported())
    }
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::Model(err) => write!(f, "{}", err),
            BrowserError::Compile(err) => write!(f, "{}", err),
            BrowserError::Emit(err) => write!(f, "{}", err),
            BrowserError::Execution(err) => write!(f, "{}", err),
            BrowserError::SliceMismatch { slice, browser } => {
                write!(f, "Slice of cube '{}' passed to browser of cube '{}'", slice, browser)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::Model(err) => Some(err),
            BrowserError::Compile(err) => Some(err),
            BrowserError::Emit(err) => Some(err),
            BrowserError::Execution(err) => Some(err),
            BrowserError::SliceMismatch { .. } => None,
        }
    }
}

impl From<ModelError> for BrowserError {
    fn from(err: ModelError) -> Self {
        BrowserError::Model(err)
    }
}

impl From<CompileError> for BrowserError {
    fn from(err: CompileError) -> Self {
        BrowserError::Compile(err)
    }
}

impl From<EmitError> for BrowserError {
    fn from(err: EmitError) -> Self {
        BrowserError::Emit(err)
    }
}

impl From<ExecutionError> for BrowserError {
    fn from(err: ExecutionError) -> Self {
        BrowserError::Execution(err)
    }
}
