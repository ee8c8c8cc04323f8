//! Dimensional model types (nouns)
//!
//! Model, Cube, Dimension, Hierarchy and Level. The model owns dimensions and
//! cubes by stable id; cubes, hierarchies and levels refer back by id.

mod cube;
mod description;
mod dimension;
mod error;
mod hierarchy;
mod level;
mod schema;
mod types;

pub use cube::{Cube, DEFAULT_FACT_KEY};
pub use description::{
    CubeDescription, DimensionDescription, HierarchyDescription, JoinDescription, LevelDescription,
    ModelDescription, OrderedMap,
};
pub use dimension::Dimension;
pub use error::ModelError;
pub use hierarchy::Hierarchy;
pub use level::Level;
pub use schema::Model;
pub use types::{aggregated_field_name, Aggregation, CubeId, DimensionId, ModelId, ParseAggregationError};
pub(crate) use types::field_name_for;
