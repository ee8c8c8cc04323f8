//! Cube type

use std::collections::BTreeMap;

use super::description::{CubeDescription, JoinDescription};
use super::error::ModelError;
use super::types::{CubeId, DimensionId, ModelId};

/// Default fact row identifier column
pub const DEFAULT_FACT_KEY: &str = "id";

/// A named, analyzable fact set with measures and associated dimensions
///
/// Dimensions are referenced by id; the owning [`Model`](super::Model) holds them.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    pub id: CubeId,
    /// Owning model
    pub model: ModelId,
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    pub measures: Vec<String>,
    pub attributes: Vec<String>,
    /// Logical field name -> physical column
    pub mappings: BTreeMap<String, String>,
    /// Fact table, view or SELECT statement
    pub fact: Option<String>,
    /// Declared joins; queries read the denormalized fact view
    pub joins: Vec<JoinDescription>,
    key: Option<String>,
    pub(crate) dimensions: Vec<DimensionId>,
}

impl Cube {
    pub(crate) fn from_description(model: ModelId, id: CubeId, name: &str, desc: &CubeDescription) -> Self {
        Self {
            id,
            model,
            name: name.to_string(),
            label: desc.label.clone(),
            description: desc.description.clone(),
            measures: desc.measures.clone(),
            attributes: desc.attributes.clone(),
            mappings: desc.mappings.clone(),
            fact: desc.fact.clone(),
            joins: desc.joins.clone(),
            key: desc.key.clone(),
            dimensions: Vec::new(),
        }
    }

    /// Ids of the attached dimensions, in attachment order
    pub fn dimension_ids(&self) -> &[DimensionId] {
        &self.dimensions
    }

    pub fn has_dimension(&self, id: DimensionId) -> bool {
        self.dimensions.contains(&id)
    }

    pub fn measure(&self, name: &str) -> Result<&str, ModelError> {
        self.measures
            .iter()
            .find(|m| m.as_str() == name)
            .map(String::as_str)
            .ok_or_else(|| ModelError::MeasureNotFound {
                cube: self.name.clone(),
                measure: name.to_string(),
            })
    }

    /// Physical column for a logical field; the logical name itself when unmapped
    pub fn physical_column<'a>(&'a self, logical: &'a str) -> &'a str {
        self.mappings.get(logical).map(String::as_str).unwrap_or(logical)
    }

    /// Fact row identifier column
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(DEFAULT_FACT_KEY)
    }

    /// Statement source: the fact table/view, or the cube name
    pub fn fact_source(&self) -> &str {
        self.fact.as_deref().unwrap_or(&self.name)
    }
}
