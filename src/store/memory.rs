//! In-memory reference store
//!
//! Interprets compiled statements over named tables of rows. Statement
//! sources (raw SQL) cannot be interpreted and fail with a backend error.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::Aggregation;
use crate::plan::{AggregateExpr, BinaryOperator, Expr, Projection, Query, SortDirection, Source};
use super::{DataStore, Row, StoreError};

/// Tables of rows keyed by table name
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: HashMap<String, Vec<Row>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    fn evaluate(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let rows = match &query.source {
            Source::Table { name, .. } => self
                .tables
                .get(name)
                .cloned()
                .ok_or_else(|| StoreError::Backend(format!("no such table '{}'", name)))?,
            Source::Statement { .. } => {
                return Err(StoreError::Backend(
                    "SQL statement sources cannot be interpreted in memory".to_string(),
                ))
            }
            Source::Derived { query, .. } => self.evaluate(query)?,
        };

        let mut selected = Vec::with_capacity(rows.len());
        for row in rows {
            let keep = match &query.filter {
                Some(filter) => test(filter, &row)?,
                None => true,
            };
            if keep {
                selected.push(row);
            }
        }

        let mut output = if query.is_aggregate() {
            aggregate(query, &selected)?
        } else if query.projections.is_empty() {
            selected
        } else {
            selected.iter().map(|row| project(&query.projections, row)).collect()
        };

        if !query.order_by.is_empty() {
            output.sort_by(|a, b| {
                for key in &query.order_by {
                    let ord = compare_sort(field(a, &key.column.name), field(b, &key.column.name));
                    let ord = match key.direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let offset = usize::try_from(query.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(output.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn execute(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.evaluate(query)
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// Predicates
// ============================================================================

fn field<'r>(row: &'r Row, name: &str) -> &'r Value {
    row.get(name).unwrap_or(&Value::Null)
}

fn eval(expr: &Expr, row: &Row) -> Result<Value, StoreError> {
    match expr {
        Expr::Column(col) => Ok(field(row, &col.name).clone()),
        Expr::Literal(lit) => Ok(lit.to_value()),
        other => Ok(Value::Bool(test(other, row)?)),
    }
}

/// Evaluate a predicate; comparisons with NULL are false
fn test(expr: &Expr, row: &Row) -> Result<bool, StoreError> {
    match expr {
        Expr::BinaryOp { left, op, right } => {
            let ord = compare(&eval(left, row)?, &eval(right, row)?);
            Ok(match (op, ord) {
                (_, None) => false,
                (BinaryOperator::Eq, Some(o)) => o == Ordering::Equal,
            })
        }
        Expr::Between { expr, low, high } => {
            let value = eval(expr, row)?;
            let above = compare(&value, &eval(low, row)?);
            let below = compare(&value, &eval(high, row)?);
            Ok(matches!(above, Some(Ordering::Greater | Ordering::Equal))
                && matches!(below, Some(Ordering::Less | Ordering::Equal)))
        }
        Expr::And(exprs) => {
            for e in exprs {
                if !test(e, row)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::IsNotNull(inner) => Ok(!eval(inner, row)?.is_null()),
        Expr::Column(_) | Expr::Literal(_) => match eval(expr, row)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(StoreError::Backend(format!("{} is not a predicate", other))),
        },
    }
}

/// SQL comparison: `None` when either side is NULL or the types differ
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order for sorting: NULLs first, then by type, then by value
fn compare_sort(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    compare(a, b).unwrap_or_else(|| rank(a).cmp(&rank(b)))
}

// ============================================================================
// Projection and aggregation
// ============================================================================

fn project(projections: &[Projection], row: &Row) -> Row {
    projections
        .iter()
        .filter_map(|p| match p {
            Projection::Column { column, .. } => {
                Some((p.output_name().to_string(), field(row, &column.name).clone()))
            }
            Projection::Aggregate(_) => None,
        })
        .collect()
}

fn aggregate(query: &Query, rows: &[Row]) -> Result<Vec<Row>, StoreError> {
    // groups in first-seen order
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Row>> = Vec::new();
    for row in rows {
        let key = query
            .group_by
            .iter()
            .map(|c| field(row, &c.name).to_string())
            .collect::<Vec<_>>()
            .join("\u{1f}");
        match index.get(&key) {
            Some(&i) => groups[i].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }
    // an ungrouped aggregate yields one row even over no input
    if groups.is_empty() && query.group_by.is_empty() {
        groups.push(Vec::new());
    }

    groups
        .iter()
        .map(|group| -> Result<Row, StoreError> {
            let mut out = Row::new();
            for projection in &query.projections {
                let value = match projection {
                    Projection::Column { column, .. } => group
                        .first()
                        .map(|r| field(r, &column.name).clone())
                        .unwrap_or(Value::Null),
                    Projection::Aggregate(agg) => aggregate_value(agg, group)?,
                };
                out.insert(projection.output_name().to_string(), value);
            }
            Ok(out)
        })
        .collect()
}

fn aggregate_value(agg: &AggregateExpr, group: &[&Row]) -> Result<Value, StoreError> {
    let mut values = Vec::with_capacity(group.len());
    for row in group {
        let value = eval(&agg.expr, row)?;
        if !value.is_null() {
            values.push(value);
        }
    }

    if agg.func == Aggregation::Count {
        return Ok(Value::from(values.len() as u64));
    }
    if values.is_empty() {
        return Ok(Value::Null);
    }

    match agg.func {
        Aggregation::Min | Aggregation::Max => {
            let mut best = values[0].clone();
            for v in &values[1..] {
                let ord = compare(v, &best).ok_or_else(|| {
                    StoreError::Backend(format!("cannot compare {} with {}", v, best))
                })?;
                let better = match agg.func {
                    Aggregation::Min => ord == Ordering::Less,
                    _ => ord == Ordering::Greater,
                };
                if better {
                    best = v.clone();
                }
            }
            Ok(best)
        }
        Aggregation::Sum | Aggregation::Average => {
            let numbers = values
                .iter()
                .map(|v| {
                    v.as_f64()
                        .ok_or_else(|| StoreError::Backend(format!("cannot aggregate non-numeric value {}", v)))
                })
                .collect::<Result<Vec<f64>, _>>()?;
            let total: f64 = numbers.iter().sum();
            if agg.func == Aggregation::Average {
                return Ok(Value::from(total / numbers.len() as f64));
            }
            // integer inputs keep an integer sum
            let ints: Option<i64> = values
                .iter()
                .try_fold(0i64, |acc, v| v.as_i64().and_then(|i| acc.checked_add(i)));
            Ok(match ints {
                Some(i) => Value::from(i),
                None => Value::from(total),
            })
        }
        Aggregation::Count => Ok(Value::from(values.len() as u64)),
    }
}
