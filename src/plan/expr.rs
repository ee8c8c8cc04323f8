//! Expression types for the structured query

use serde_json::Value;

use crate::error::QueryError;
use crate::model::Aggregation;

/// A column reference
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Source alias, empty when unqualified
    pub table: String,
    /// Column name
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Create an unqualified column reference (no table prefix)
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            table: String::new(),
            name: name.into(),
        }
    }
}

/// Scalar and predicate expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(Column),
    /// Literal value, rendered escaped or bound as a parameter
    Literal(Literal),
    /// Binary comparison (e.g., a = b)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// Inclusive range: expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// AND of multiple expressions
    And(Vec<Expr>),
    /// IS NOT NULL check
    IsNotNull(Box<Expr>),
}

impl Expr {
    /// `column = value`
    pub fn eq(column: Column, value: Literal) -> Self {
        Expr::BinaryOp {
            left: Box::new(Expr::Column(column)),
            op: BinaryOperator::Eq,
            right: Box::new(Expr::Literal(value)),
        }
    }

    /// `column BETWEEN low AND high`
    pub fn between(column: Column, low: Literal, high: Literal) -> Self {
        Expr::Between {
            expr: Box::new(Expr::Column(column)),
            low: Box::new(Expr::Literal(low)),
            high: Box::new(Expr::Literal(high)),
        }
    }

    pub fn is_not_null(column: Column) -> Self {
        Expr::IsNotNull(Box::new(Expr::Column(column)))
    }

    /// Conjoin predicates; `None` when there are none
    pub fn conjunction(mut exprs: Vec<Expr>) -> Option<Expr> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::And(exprs)),
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Convert a request value. Arrays and objects have no literal form.
    pub fn from_value(value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Null => Ok(Literal::Null),
            Value::Bool(b) => Ok(Literal::Bool(*b)),
            // above i64::MAX there is no exact literal
            Value::Number(n) if n.is_u64() && n.as_i64().is_none() => {
                Err(QueryError::UnsupportedValue(n.to_string()))
            }
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(Literal::Int(i)),
                (None, Some(f)) => Ok(Literal::Float(f)),
                (None, None) => Err(QueryError::UnsupportedValue(n.to_string())),
            },
            Value::String(s) => Ok(Literal::String(s.clone())),
            other => Err(QueryError::UnsupportedValue(other.to_string())),
        }
    }

    /// Back to a row value, as a data store would report it
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::from(*i),
            Literal::Float(f) => Value::from(*f),
            Literal::String(s) => Value::from(s.as_str()),
        }
    }
}

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Eq,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
        }
    }
}

/// An aggregate expression: func(expr) AS alias
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub func: Aggregation,
    pub expr: Expr,
    pub alias: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_from_value() {
        assert_eq!(Literal::from_value(&json!(2023)).unwrap(), Literal::Int(2023));
        assert_eq!(Literal::from_value(&json!(1.5)).unwrap(), Literal::Float(1.5));
        assert_eq!(Literal::from_value(&json!("x")).unwrap(), Literal::String("x".into()));
        assert_eq!(Literal::from_value(&json!(null)).unwrap(), Literal::Null);
        assert!(matches!(
            Literal::from_value(&json!([1, 2])),
            Err(QueryError::UnsupportedValue(_))
        ));
    }

    #[test]
    fn test_integers_beyond_i64_are_rejected() {
        assert_eq!(
            Literal::from_value(&json!(i64::MAX as u64)).unwrap(),
            Literal::Int(i64::MAX)
        );
        assert_eq!(
            Literal::from_value(&json!(u64::MAX)).unwrap_err(),
            QueryError::UnsupportedValue(u64::MAX.to_string())
        );
    }

    #[test]
    fn test_conjunction() {
        assert!(Expr::conjunction(vec![]).is_none());
        let single = Expr::is_not_null(Column::unqualified("a"));
        assert_eq!(Expr::conjunction(vec![single.clone()]), Some(single.clone()));
        assert!(matches!(
            Expr::conjunction(vec![single.clone(), single]),
            Some(Expr::And(v)) if v.len() == 2
        ));
    }
}
