//! Level type

use super::description::LevelDescription;
use super::error::ModelError;
use super::types::DimensionId;

/// One rung of a hierarchy: a key attribute plus descriptive attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: String,
    pub label: Option<String>,
    key: Option<String>,
    /// Attributes in declaration order, never empty
    pub attributes: Vec<String>,
    pub label_attribute: Option<String>,
    /// Owning dimension
    pub dimension: DimensionId,
}

impl Level {
    pub(crate) fn from_description(
        dimension_name: &str,
        dimension: DimensionId,
        name: &str,
        desc: &LevelDescription,
    ) -> Result<Self, ModelError> {
        let mut attributes = desc.attributes.clone();
        if attributes.is_empty() {
            match &desc.key {
                Some(key) => attributes.push(key.clone()),
                None => {
                    return Err(ModelError::LevelWithoutAttributes {
                        dimension: dimension_name.to_string(),
                        level: name.to_string(),
                    })
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            label: desc.label.clone(),
            key: desc.key.clone(),
            attributes,
            label_attribute: desc.label_attribute.clone(),
            dimension,
        })
    }

    /// Key attribute: the declared key, or the first attribute
    pub fn key(&self) -> &str {
        match &self.key {
            Some(key) => key,
            None => &self.attributes[0],
        }
    }

    /// Attribute used for display; falls back to the key
    pub fn label_attribute(&self) -> &str {
        self.label_attribute.as_deref().unwrap_or_else(|| self.key())
    }
}
