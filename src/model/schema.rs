//! Root model: owns dimensions and cubes by stable id

use std::collections::BTreeMap;

use super::cube::Cube;
use super::description::{CubeDescription, DimensionDescription, ModelDescription};
use super::dimension::Dimension;
use super::error::ModelError;
use super::types::{CubeId, DimensionId, ModelId};

/// A dimensional model
///
/// Built once from a description and shared read-only afterwards (e.g. behind
/// an `Arc`). The administrative mutators are meant for setup time.
///
/// Cubes carry the id of the model that created them; a cube is only
/// queried against that model.
#[derive(Debug, Clone)]
pub struct Model {
    id: ModelId,
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    dimensions: BTreeMap<DimensionId, Dimension>,
    cubes: BTreeMap<CubeId, Cube>,
    next_dimension: usize,
    next_cube: usize,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ModelId::next(),
            name: name.into(),
            label: None,
            description: None,
            dimensions: BTreeMap::new(),
            cubes: BTreeMap::new(),
            next_dimension: 0,
            next_cube: 0,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Build and validate a model from its description
    pub fn from_description(desc: &ModelDescription) -> Result<Self, ModelError> {
        let mut model = Model::new(desc.name.clone());
        model.label = desc.label.clone();
        model.description = desc.description.clone();

        for (name, dim_desc) in desc.dimensions.iter() {
            model.add_dimension(name, dim_desc)?;
        }
        for (name, cube_desc) in desc.cubes.iter() {
            model.create_cube(name, cube_desc)?;
        }
        Ok(model)
    }

    // ------------------------------------------------------------------------
    // Dimensions
    // ------------------------------------------------------------------------

    /// Register a dimension. Names are unique within the model.
    pub fn add_dimension(&mut self, name: &str, desc: &DimensionDescription) -> Result<DimensionId, ModelError> {
        if self.dimensions.values().any(|d| d.name == name) {
            return Err(ModelError::DuplicateDimension(name.to_string()));
        }
        let id = DimensionId(self.next_dimension);
        let dimension = Dimension::from_description(id, name, desc)?;
        self.next_dimension += 1;
        self.dimensions.insert(id, dimension);
        Ok(id)
    }

    /// Remove a dimension no cube uses
    pub fn remove_dimension(&mut self, name: &str) -> Result<Dimension, ModelError> {
        let id = self.dimension(name)?.id;
        if let Some(cube) = self.cubes.values().find(|c| c.has_dimension(id)) {
            return Err(ModelError::DimensionInUse {
                dimension: name.to_string(),
                cube: cube.name.clone(),
            });
        }
        self.dimensions
            .remove(&id)
            .ok_or_else(|| ModelError::DimensionNotFound(name.to_string()))
    }

    pub fn dimension(&self, name: &str) -> Result<&Dimension, ModelError> {
        self.dimensions
            .values()
            .find(|d| d.name == name)
            .ok_or_else(|| ModelError::DimensionNotFound(name.to_string()))
    }

    pub fn dimension_by_id(&self, id: DimensionId) -> Result<&Dimension, ModelError> {
        self.dimensions
            .get(&id)
            .ok_or_else(|| ModelError::DimensionNotFound(format!("#{}", id.0)))
    }

    /// Dimensions in registration order
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.values()
    }

    // ------------------------------------------------------------------------
    // Cubes
    // ------------------------------------------------------------------------

    /// Create a cube and attach the dimensions it names.
    ///
    /// Every named dimension must already be registered on the model.
    pub fn create_cube(&mut self, name: &str, desc: &CubeDescription) -> Result<CubeId, ModelError> {
        if self.cubes.values().any(|c| c.name == name) {
            return Err(ModelError::DuplicateCube(name.to_string()));
        }

        let id = CubeId(self.next_cube);
        let mut cube = Cube::from_description(self.id, id, name, desc);
        for dim_name in &desc.dimensions {
            let dim_id = self.dimension(dim_name)?.id;
            if !cube.dimensions.contains(&dim_id) {
                cube.dimensions.push(dim_id);
            }
        }

        self.next_cube += 1;
        self.cubes.insert(id, cube);
        Ok(id)
    }

    pub fn cube(&self, name: &str) -> Result<&Cube, ModelError> {
        self.cubes
            .values()
            .find(|c| c.name == name)
            .ok_or_else(|| ModelError::CubeNotFound(name.to_string()))
    }

    pub fn cube_by_id(&self, id: CubeId) -> Result<&Cube, ModelError> {
        self.cubes
            .get(&id)
            .ok_or_else(|| ModelError::CubeNotFound(format!("#{}", id.0)))
    }

    pub fn cubes(&self) -> impl Iterator<Item = &Cube> {
        self.cubes.values()
    }

    fn cube_mut(&mut self, name: &str) -> Result<&mut Cube, ModelError> {
        self.cubes
            .values_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ModelError::CubeNotFound(name.to_string()))
    }

    /// Attach a registered dimension to a cube
    pub fn add_cube_dimension(&mut self, cube: &str, dimension: &str) -> Result<(), ModelError> {
        let dim_id = self.dimension(dimension)?.id;
        let cube = self.cube_mut(cube)?;
        if !cube.dimensions.contains(&dim_id) {
            cube.dimensions.push(dim_id);
        }
        Ok(())
    }

    pub fn remove_cube_dimension(&mut self, cube: &str, dimension: &str) -> Result<(), ModelError> {
        let dim_id = self.dimension(dimension)?.id;
        let cube = self.cube_mut(cube)?;
        let before = cube.dimensions.len();
        cube.dimensions.retain(|id| *id != dim_id);
        if cube.dimensions.len() == before {
            return Err(ModelError::DimensionNotInCube {
                cube: cube.name.clone(),
                dimension: dimension.to_string(),
            });
        }
        Ok(())
    }

    /// Dimension attached to `cube`.
    ///
    /// Distinguishes unknown dimensions from known ones the cube does not use.
    pub fn cube_dimension(&self, cube: &Cube, name: &str) -> Result<&Dimension, ModelError> {
        self.check_owner(cube)?;
        let dimension = self.dimension(name)?;
        if !cube.has_dimension(dimension.id) {
            return Err(ModelError::DimensionNotInCube {
                cube: cube.name.clone(),
                dimension: name.to_string(),
            });
        }
        Ok(dimension)
    }

    /// Dimensions attached to `cube`, in attachment order; none for a cube of
    /// another model
    pub fn cube_dimensions<'a>(&'a self, cube: &'a Cube) -> impl Iterator<Item = &'a Dimension> + 'a {
        let ids = if cube.model == self.id { cube.dimension_ids() } else { &[] };
        ids.iter().filter_map(|id| self.dimensions.get(id))
    }

    fn check_owner(&self, cube: &Cube) -> Result<(), ModelError> {
        if cube.model != self.id {
            return Err(ModelError::ForeignCube {
                cube: cube.name.clone(),
                model: self.name.clone(),
            });
        }
        Ok(())
    }
}
