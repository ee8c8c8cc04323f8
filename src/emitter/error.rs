//! Emitter errors

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EmitError {
    /// Literal that has no safe SQL form
    InvalidLiteral(String),
    /// Invalid query structure
    InvalidPlan(String),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::InvalidLiteral(msg) => {
                write!(f, "Invalid literal: {}", msg)
            }
            EmitError::InvalidPlan(msg) => {
                write!(f, "Invalid plan: {}", msg)
            }
        }
    }
}

impl std::error::Error for EmitError {}
