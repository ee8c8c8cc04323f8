//! Cut algebra (noun module)
//!
//! A cut narrows one dimension of a cube to a point, a key range, or a set of
//! points. Cuts name their dimension (and optionally hierarchy) by string;
//! the resolver binds them to the cube being queried at compile time.

use serde::Serialize;
use serde_json::Value;

/// One position of a point path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathValue {
    /// Concrete key value of the level at this position
    Value(Value),
    /// Unconstrained at this level
    All,
}

impl PathValue {
    pub fn is_all(&self) -> bool {
        matches!(self, PathValue::All)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            PathValue::Value(v) => Some(v),
            PathValue::All => None,
        }
    }
}

impl From<Value> for PathValue {
    fn from(v: Value) -> Self {
        PathValue::Value(v)
    }
}

impl From<i64> for PathValue {
    fn from(v: i64) -> Self {
        PathValue::Value(Value::from(v))
    }
}

impl From<i32> for PathValue {
    fn from(v: i32) -> Self {
        PathValue::Value(Value::from(v))
    }
}

impl From<&str> for PathValue {
    fn from(v: &str) -> Self {
        PathValue::Value(Value::from(v))
    }
}

impl From<String> for PathValue {
    fn from(v: String) -> Self {
        PathValue::Value(Value::from(v))
    }
}

/// Cut by a point (or point prefix) of a hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointCut {
    pub dimension: String,
    /// Hierarchy override; the dimension's default when `None`
    pub hierarchy: Option<String>,
    pub path: Vec<PathValue>,
}

/// Cut by an inclusive range of the dimension's key field.
///
/// Ranges are not hierarchy-aware: they constrain the single key field only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeCut {
    pub dimension: String,
    pub from_key: Value,
    pub to_key: Value,
}

/// Cut by a set of points. Recognized, but compiling it is unsupported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetCut {
    pub dimension: String,
    pub paths: Vec<Vec<PathValue>>,
}

/// A selection predicate over one dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cut {
    Point(PointCut),
    Range(RangeCut),
    Set(SetCut),
}

impl Cut {
    /// Point cut on the dimension's default hierarchy
    pub fn point(dimension: impl Into<String>, path: Vec<PathValue>) -> Self {
        Cut::Point(PointCut {
            dimension: dimension.into(),
            hierarchy: None,
            path,
        })
    }

    /// Point cut on a named hierarchy
    pub fn point_in(dimension: impl Into<String>, hierarchy: impl Into<String>, path: Vec<PathValue>) -> Self {
        Cut::Point(PointCut {
            dimension: dimension.into(),
            hierarchy: Some(hierarchy.into()),
            path,
        })
    }

    pub fn range(dimension: impl Into<String>, from_key: impl Into<Value>, to_key: impl Into<Value>) -> Self {
        Cut::Range(RangeCut {
            dimension: dimension.into(),
            from_key: from_key.into(),
            to_key: to_key.into(),
        })
    }

    pub fn set(dimension: impl Into<String>, paths: Vec<Vec<PathValue>>) -> Self {
        Cut::Set(SetCut {
            dimension: dimension.into(),
            paths,
        })
    }

    /// Name of the dimension this cut narrows
    pub fn dimension_name(&self) -> &str {
        match self {
            Cut::Point(c) => &c.dimension,
            Cut::Range(c) => &c.dimension,
            Cut::Set(c) => &c.dimension,
        }
    }
}

/// Build a point path: `path![2023, all]`
#[macro_export]
macro_rules! path {
    (@item all) => { $crate::cut::PathValue::All };
    (@item $v:expr) => { $crate::cut::PathValue::from($v) };
    ($($v:tt),* $(,)?) => { vec![$($crate::path!(@item $v)),*] };
}
