//! Model description document types
//!
//! The shape of the YAML/JSON document a model is built from. These are plain
//! deserialized values; [`Model::from_description`](super::Model::from_description)
//! validates them into the model graph.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Root of a model description
#[derive(Debug, Default, Deserialize)]
pub struct ModelDescription {
    #[serde(default)]
    pub name: String,
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub dimensions: OrderedMap<DimensionDescription>,
    #[serde(default)]
    pub cubes: OrderedMap<CubeDescription>,
}

/// A dimension: levels (in declaration order) and named hierarchies
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DimensionDescription {
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub levels: OrderedMap<LevelDescription>,
    #[serde(default)]
    pub hierarchies: OrderedMap<HierarchyDescription>,
    pub default_hierarchy: Option<String>,
    pub key_field: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LevelDescription {
    pub label: Option<String>,
    /// Key attribute; the first attribute when omitted
    pub key: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    pub label_attribute: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct HierarchyDescription {
    pub label: Option<String>,
    /// Level names, coarsest first
    #[serde(default)]
    pub levels: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CubeDescription {
    pub label: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Logical field name -> physical column
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
    /// Fact table, view or SELECT statement
    pub fact: Option<String>,
    #[serde(default)]
    pub joins: Vec<JoinDescription>,
    /// Fact row identifier column
    pub key: Option<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// Join between the fact and a detail table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinDescription {
    pub master: String,
    pub detail: String,
    pub alias: Option<String>,
}

/// Name -> value mapping that keeps declaration order
///
/// Level order is significant, and neither `serde_json` (without
/// `preserve_order`) nor plain maps keep it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T>(pub Vec<(String, T)>);

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        OrderedMap(Vec::new())
    }
}

impl<T> OrderedMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: T) -> Self {
        self.0.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
            type Value = OrderedMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a mapping of names to definitions")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, T>()? {
                    entries.push((name, value));
                }
                Ok(OrderedMap(entries))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(OrderedMap::default())
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
