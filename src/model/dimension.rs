//! Dimension type and default hierarchy resolution

use std::sync::Arc;

use super::description::DimensionDescription;
use super::error::ModelError;
use super::hierarchy::Hierarchy;
use super::level::Level;
use super::types::DimensionId;

/// A named axis for slicing and grouping facts
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub id: DimensionId,
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Field used by range cuts
    pub key_field: Option<String>,
    pub default_hierarchy_name: Option<String>,
    levels: Vec<Arc<Level>>,
    hierarchies: Vec<Hierarchy>,
    /// Single-level hierarchy synthesized when none is declared
    flat_hierarchy: Option<Hierarchy>,
}

impl Dimension {
    /// Build a dimension, resolving every hierarchy's level names.
    ///
    /// Fails if a level name repeats or a hierarchy names an unknown level.
    pub fn from_description(
        id: DimensionId,
        name: &str,
        desc: &DimensionDescription,
    ) -> Result<Self, ModelError> {
        let mut levels: Vec<Arc<Level>> = Vec::with_capacity(desc.levels.len());
        for (level_name, level_desc) in desc.levels.iter() {
            if levels.iter().any(|l| l.name == level_name) {
                return Err(ModelError::DuplicateLevel {
                    dimension: name.to_string(),
                    level: level_name.to_string(),
                });
            }
            levels.push(Arc::new(Level::from_description(name, id, level_name, level_desc)?));
        }

        let mut hierarchies = Vec::with_capacity(desc.hierarchies.len());
        for (hier_name, hier_desc) in desc.hierarchies.iter() {
            let resolved = hier_desc
                .levels
                .iter()
                .map(|level_name| {
                    levels
                        .iter()
                        .find(|l| &l.name == level_name)
                        .cloned()
                        .ok_or_else(|| ModelError::LevelNotFound {
                            dimension: name.to_string(),
                            level: level_name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            hierarchies.push(Hierarchy::new(hier_name, hier_desc.label.clone(), id, resolved));
        }

        let flat_hierarchy = if hierarchies.is_empty() && levels.len() == 1 {
            let level = levels[0].clone();
            Some(Hierarchy::new(level.name.clone(), level.label.clone(), id, vec![level]))
        } else {
            None
        };

        Ok(Self {
            id,
            name: name.to_string(),
            label: desc.label.clone(),
            description: desc.description.clone(),
            key_field: desc.key_field.clone(),
            default_hierarchy_name: desc.default_hierarchy.clone(),
            levels,
            hierarchies,
            flat_hierarchy,
        })
    }

    /// Levels in declaration order
    pub fn levels(&self) -> &[Arc<Level>] {
        &self.levels
    }

    pub fn level_names(&self) -> Vec<&str> {
        self.levels.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn level(&self, name: &str) -> Result<&Arc<Level>, ModelError> {
        self.levels
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| ModelError::LevelNotFound {
                dimension: self.name.clone(),
                level: name.to_string(),
            })
    }

    /// Declared hierarchies
    pub fn hierarchies(&self) -> &[Hierarchy] {
        &self.hierarchies
    }

    pub fn hierarchy(&self, name: &str) -> Result<&Hierarchy, ModelError> {
        self.hierarchies
            .iter()
            .find(|h| h.name == name)
            .ok_or_else(|| ModelError::HierarchyNotFound {
                dimension: self.name.clone(),
                hierarchy: name.to_string(),
            })
    }

    /// Resolve the default hierarchy, in order:
    /// 1. the hierarchy named by `default_hierarchy_name`, if it exists
    /// 2. the only hierarchy, if exactly one is declared
    /// 3. a synthesized single-level hierarchy, if none is declared and the
    ///    dimension has exactly one level
    pub fn default_hierarchy(&self) -> Result<&Hierarchy, ModelError> {
        if let Some(name) = &self.default_hierarchy_name {
            if let Some(hierarchy) = self.hierarchies.iter().find(|h| &h.name == name) {
                return Ok(hierarchy);
            }
        }

        match self.hierarchies.len() {
            1 => Ok(&self.hierarchies[0]),
            0 => self.flat_hierarchy.as_ref().ok_or_else(|| ModelError::NoHierarchy {
                dimension: self.name.clone(),
                levels: self.levels.len(),
            }),
            count => Err(ModelError::AmbiguousDefaultHierarchy {
                dimension: self.name.clone(),
                count,
            }),
        }
    }

    /// Named hierarchy, or the default one
    pub fn hierarchy_or_default(&self, name: Option<&str>) -> Result<&Hierarchy, ModelError> {
        match name {
            Some(name) => self.hierarchy(name),
            None => self.default_hierarchy(),
        }
    }

    /// True if the dimension has only one level
    pub fn is_flat(&self) -> bool {
        self.levels.len() == 1
    }

    /// Attributes of every level of a hierarchy (default when `None`), in level order
    pub fn all_attributes(&self, hierarchy: Option<&str>) -> Result<Vec<&str>, ModelError> {
        let hierarchy = self.hierarchy_or_default(hierarchy)?;
        Ok(hierarchy
            .levels()
            .iter()
            .flat_map(|l| l.attributes.iter().map(String::as_str))
            .collect())
    }

    /// Logical field reference `dimension.attribute`
    pub fn field_reference(&self, attribute: &str) -> String {
        format!("{}.{}", self.name, attribute)
    }
}
