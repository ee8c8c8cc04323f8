//! Aggregation operators and identifiers for model objects

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::ModelError;

/// Identifier of a [`Model`](super::Model), unique within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ModelId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stable identifier of a dimension registered on a [`Model`](super::Model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(pub(crate) usize);

/// Stable identifier of a cube created on a [`Model`](super::Model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeId(pub(crate) usize);

// ============================================================================
// Aggregation
// ============================================================================

/// Aggregation operators applicable to a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aggregation {
    /// Sum of values
    Sum,
    /// Count of non-null values
    Count,
    /// Average of values
    Average,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Sum,
        Aggregation::Count,
        Aggregation::Average,
        Aggregation::Min,
        Aggregation::Max,
    ];

    /// SQL function name
    pub fn sql_function(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Count => "COUNT",
            Aggregation::Average => "AVG",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sum => write!(f, "sum"),
            Aggregation::Count => write!(f, "count"),
            Aggregation::Average => write!(f, "average"),
            Aggregation::Min => write!(f, "min"),
            Aggregation::Max => write!(f, "max"),
        }
    }
}

/// Error when parsing an aggregation string
#[derive(Debug, Clone, PartialEq)]
pub struct ParseAggregationError {
    pub input: String,
}

impl fmt::Display for ParseAggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown aggregation '{}'. Valid options: sum, count, average, min, max", self.input)
    }
}

impl std::error::Error for ParseAggregationError {}

impl FromStr for Aggregation {
    type Err = ParseAggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Aggregation::Sum),
            "count" => Ok(Aggregation::Count),
            "average" => Ok(Aggregation::Average),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            _ => Err(ParseAggregationError { input: s.to_string() }),
        }
    }
}

impl<'de> Deserialize<'de> for Aggregation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Aggregation::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Aggregation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Name of the column holding `field` aggregated with `operator`,
/// e.g. `amount_sum`.
pub fn aggregated_field_name(field: &str, operator: &str) -> Result<String, ModelError> {
    let aggregation = Aggregation::from_str(operator)
        .map_err(|e| ModelError::UnknownAggregation(e.input))?;
    Ok(field_name_for(field, aggregation))
}

pub(crate) fn field_name_for(field: &str, aggregation: Aggregation) -> String {
    format!("{}_{}", field, aggregation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregation() {
        assert_eq!("sum".parse::<Aggregation>().unwrap(), Aggregation::Sum);
        assert_eq!("count".parse::<Aggregation>().unwrap(), Aggregation::Count);
        assert_eq!("average".parse::<Aggregation>().unwrap(), Aggregation::Average);
        assert_eq!("min".parse::<Aggregation>().unwrap(), Aggregation::Min);
        assert_eq!("max".parse::<Aggregation>().unwrap(), Aggregation::Max);
    }

    #[test]
    fn test_parse_aggregation_unknown() {
        assert!("median".parse::<Aggregation>().is_err());
        assert!("avg".parse::<Aggregation>().is_err());
        assert!("SUM".parse::<Aggregation>().is_err());
    }

    #[test]
    fn test_aggregated_field_name() {
        for (op, expected) in [
            ("sum", "amount_sum"),
            ("count", "amount_count"),
            ("average", "amount_average"),
            ("min", "amount_min"),
            ("max", "amount_max"),
        ] {
            assert_eq!(aggregated_field_name("amount", op).unwrap(), expected);
        }
    }

    #[test]
    fn test_aggregated_field_name_unknown_operator() {
        let err = aggregated_field_name("amount", "median").unwrap_err();
        assert_eq!(err, ModelError::UnknownAggregation("median".into()));
    }

    #[test]
    fn test_sql_function() {
        assert_eq!(Aggregation::Average.sql_function(), "AVG");
        assert_eq!(Aggregation::Sum.sql_function(), "SUM");
    }

    #[test]
    fn test_aggregation_serde() {
        let parsed: Vec<Aggregation> = serde_json::from_str(r#"["sum", "max"]"#).unwrap();
        assert_eq!(parsed, vec![Aggregation::Sum, Aggregation::Max]);
        assert_eq!(serde_json::to_string(&Aggregation::Average).unwrap(), "\"average\"");
    }
}
