//! Model configuration errors

use std::fmt;

/// Errors in the model configuration: unknown references, invalid structure,
/// unresolvable default hierarchy. Raised while building the model or while
/// binding a request to it.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    CubeNotFound(String),
    DimensionNotFound(String),
    LevelNotFound { dimension: String, level: String },
    HierarchyNotFound { dimension: String, hierarchy: String },
    MeasureNotFound { cube: String, measure: String },
    /// Dimension exists on the model but is not attached to the cube
    DimensionNotInCube { cube: String, dimension: String },
    DuplicateDimension(String),
    DuplicateCube(String),
    DuplicateLevel { dimension: String, level: String },
    /// Dimension is still attached to a cube and cannot be removed
    DimensionInUse { dimension: String, cube: String },
    /// Level declares neither attributes nor a key
    LevelWithoutAttributes { dimension: String, level: String },
    /// Several hierarchies and none named as default
    AmbiguousDefaultHierarchy { dimension: String, count: usize },
    /// No hierarchies and more than one level to choose from
    NoHierarchy { dimension: String, levels: usize },
    /// Range cuts need the dimension's key field
    MissingKeyField(String),
    UnknownAggregation(String),
    /// Cube was created by another model
    ForeignCube { cube: String, model: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::CubeNotFound(name) => write!(f, "Cube '{}' not found", name),
            ModelError::DimensionNotFound(name) => write!(f, "Dimension '{}' not found", name),
            ModelError::LevelNotFound { dimension, level } => {
                write!(f, "No level '{}' in dimension '{}'", level, dimension)
            }
            ModelError::HierarchyNotFound { dimension, hierarchy } => {
                write!(f, "No hierarchy '{}' in dimension '{}'", hierarchy, dimension)
            }
            ModelError::MeasureNotFound { cube, measure } => {
                write!(f, "Measure '{}' not found in cube '{}'", measure, cube)
            }
            ModelError::DimensionNotInCube { cube, dimension } => {
                write!(f, "Invalid dimension reference '{}' for cube '{}'", dimension, cube)
            }
            ModelError::DuplicateDimension(name) => {
                write!(f, "Dimension '{}' is already registered", name)
            }
            ModelError::DuplicateCube(name) => write!(f, "Cube '{}' already exists", name),
            ModelError::DuplicateLevel { dimension, level } => {
                write!(f, "Level '{}' is declared twice in dimension '{}'", level, dimension)
            }
            ModelError::DimensionInUse { dimension, cube } => {
                write!(f, "Dimension '{}' is used by cube '{}'", dimension, cube)
            }
            ModelError::LevelWithoutAttributes { dimension, level } => {
                write!(f, "Level '{}' in dimension '{}' has no attributes", level, dimension)
            }
            ModelError::AmbiguousDefaultHierarchy { dimension, count } => write!(
                f,
                "No default hierarchy specified in dimension '{}' and there is more ({}) than one hierarchy defined",
                dimension, count
            ),
            ModelError::NoHierarchy { dimension, levels } => {
                if *levels == 0 {
                    write!(f, "There are no hierarchies in dimension '{}' and there are no levels to make hierarchy from", dimension)
                } else {
                    write!(f, "There are no hierarchies in dimension '{}' and there is more than one level", dimension)
                }
            }
            ModelError::MissingKeyField(dimension) => write!(
                f,
                "Dimension '{}' has no key field (required for range cuts)",
                dimension
            ),
            ModelError::UnknownAggregation(name) => write!(
                f,
                "Unknown aggregation operator '{}'. Valid options: sum, count, average, min, max",
                name
            ),
            ModelError::ForeignCube { cube, model } => {
                write!(f, "Cube '{}' does not belong to model '{}'", cube, model)
            }
        }
    }
}

impl std::error::Error for ModelError {}
