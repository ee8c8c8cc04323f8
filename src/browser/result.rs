//! Aggregation results and computed fields

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::compiler::{CompiledAggregation, RECORD_COUNT_FIELD};
use crate::model::Aggregation;
use crate::query::AggregateOptions;
use crate::store::Row;

/// Grand totals of a measure over a slice
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Value per selected aggregation; `None` when the store reported NULL
    pub values: BTreeMap<Aggregation, Option<f64>>,
    pub record_count: u64,
}

impl Summary {
    /// Read the summary row of a compiled aggregation.
    ///
    /// Numeric strings (as some drivers report aggregates) are parsed.
    pub(crate) fn from_row(row: Option<&Row>, compiled: &CompiledAggregation) -> Self {
        let values = compiled
            .aggregations
            .iter()
            .map(|agg| {
                let value = row.and_then(|r| r.get(&compiled.field_name(*agg))).and_then(number);
                (*agg, value)
            })
            .collect();
        let record_count = row
            .and_then(|r| r.get(RECORD_COUNT_FIELD))
            .and_then(number)
            .map(|n| n.max(0.0) as u64)
            .unwrap_or(0);
        Self { values, record_count }
    }

    pub fn get(&self, aggregation: Aggregation) -> Option<f64> {
        self.values.get(&aggregation).copied().flatten()
    }

    pub fn sum(&self) -> Option<f64> {
        self.get(Aggregation::Sum)
    }
}

/// What a rank limit left out of the drill rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Remainder {
    /// Summary sum minus the returned rows' sum; `None` when `sum` is not selected
    pub sum: Option<f64>,
    pub record_count: u64,
}

impl Remainder {
    pub(crate) fn compute(summary: &Summary, rows: &[Row], compiled: &CompiledAggregation) -> Self {
        let sum = compiled.aggregations.contains(&Aggregation::Sum).then(|| {
            let field = compiled.field_name(Aggregation::Sum);
            let returned: f64 = rows.iter().filter_map(|r| r.get(&field).and_then(number)).sum();
            summary.sum().unwrap_or(0.0) - returned
        });
        let returned_count: u64 = rows
            .iter()
            .filter_map(|r| r.get(RECORD_COUNT_FIELD).and_then(number))
            .map(|n| n.max(0.0) as u64)
            .sum();
        Self {
            sum,
            record_count: summary.record_count.saturating_sub(returned_count),
        }
    }
}

/// Result of one aggregation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub measure: String,
    pub summary: Summary,
    /// Drill rows; empty unless drill-down was requested
    pub rows: Vec<Row>,
    /// Present whenever a limit was applied
    pub remainder: Option<Remainder>,
    /// Options the request was compiled from
    pub options: AggregateOptions,
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A derived drill-row field: a pure function of the row
pub type ComputedField = fn(&Row) -> Value;

/// Named computed fields, applied to drill rows in registration order
#[derive(Clone, Default)]
pub struct ComputedFields {
    fields: Vec<(String, ComputedField)>,
}

impl ComputedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field; a later field sees the ones registered before it
    pub fn with(mut self, name: impl Into<String>, field: ComputedField) -> Self {
        self.fields.push((name.into(), field));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn apply(&self, row: &mut Row) {
        for (name, field) in &self.fields {
            let value = field(row);
            row.insert(name.clone(), value);
        }
    }
}

impl fmt::Debug for ComputedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|(name, _)| name))
            .finish()
    }
}
