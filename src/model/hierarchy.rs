//! Hierarchy type and path arithmetic

use std::sync::Arc;

use super::level::Level;
use super::types::DimensionId;
use crate::error::QueryError;

/// An ordered sequence of levels defining the drill-down order of a dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    pub name: String,
    pub label: Option<String>,
    levels: Vec<Arc<Level>>,
    /// Owning dimension
    pub dimension: DimensionId,
}

impl Hierarchy {
    /// Levels must already be resolved against the owning dimension.
    pub(crate) fn new(
        name: impl Into<String>,
        label: Option<String>,
        dimension: DimensionId,
        levels: Vec<Arc<Level>>,
    ) -> Self {
        Self {
            name: name.into(),
            label,
            levels,
            dimension,
        }
    }

    pub fn levels(&self) -> &[Arc<Level>] {
        &self.levels
    }

    pub fn level_names(&self) -> Vec<&str> {
        self.levels.iter().map(|l| l.name.as_str()).collect()
    }

    /// Levels addressed by `path`: the first `path.len()` levels, or one more
    /// when drilling down (capped at the hierarchy depth).
    ///
    /// Paths deeper than the hierarchy are an error, never truncated.
    pub fn levels_for_path<T>(&self, path: &[T], drill_down: bool) -> Result<&[Arc<Level>], QueryError> {
        if path.len() > self.levels.len() {
            return Err(QueryError::PathTooLong {
                hierarchy: self.name.clone(),
                path_len: path.len(),
                levels: self.levels.len(),
            });
        }

        let count = if drill_down {
            (path.len() + 1).min(self.levels.len())
        } else {
            path.len()
        };
        Ok(&self.levels[..count])
    }

    /// A base path addresses the deepest level; no further drill-down is possible.
    pub fn path_is_base<T>(&self, path: &[T]) -> bool {
        path.len() == self.levels.len()
    }

    /// Level immediately after the one addressed by `path`
    pub fn next_level<T>(&self, path: &[T]) -> Result<&Arc<Level>, QueryError> {
        if path.len() > self.levels.len() {
            return Err(QueryError::PathTooLong {
                hierarchy: self.name.clone(),
                path_len: path.len(),
                levels: self.levels.len(),
            });
        }
        self.levels.get(path.len()).ok_or_else(|| QueryError::NoNextLevel {
            hierarchy: self.name.clone(),
            path_len: path.len(),
        })
    }
}
