//! Build structured statements for a cube

use std::iter;

use serde_json::Value;

use crate::cut::{Cut, PathValue};
use crate::error::QueryError;
use crate::model::{field_name_for, Aggregation, Cube, Dimension, Level, Model};
use crate::plan::{
    AggregateExpr, Column, Expr, Literal, Projection, Query, SortKey, Source, DERIVED_ALIAS,
    SOURCE_ALIAS,
};
use crate::query::{AggregateOptions, PageOptions};
use crate::resolver::{
    resolve_aggregations, resolve_cuts, resolve_direction, resolve_drill, resolve_limit,
    resolve_window, ResolvedCut, ResolvedDrill, ResolvedLimit,
};
use super::error::CompileError;

/// Output field holding the number of aggregated fact rows
pub const RECORD_COUNT_FIELD: &str = "record_count";

/// Statements of one aggregation request
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledAggregation {
    pub measure: String,
    pub aggregations: Vec<Aggregation>,
    /// Ungrouped grand totals over the slice
    pub summary: Query,
    /// Grouped rows; present only when drill-down was requested
    pub drill: Option<Query>,
    pub limit: Option<ResolvedLimit>,
}

impl CompiledAggregation {
    /// Output field of one aggregation of the measure
    pub fn field_name(&self, aggregation: Aggregation) -> String {
        field_name_for(&self.measure, aggregation)
    }

    /// Output fields of every selected aggregation, in selection order
    pub fn field_names(&self) -> Vec<String> {
        self.aggregations.iter().map(|agg| self.field_name(*agg)).collect()
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }
}

/// Compiles browsing requests on one cube into [`Query`] statements
///
/// Compilation is pure: the same cuts and options always produce the same
/// statements.
#[derive(Debug, Clone)]
pub struct QueryCompiler<'a> {
    model: &'a Model,
    cube: &'a Cube,
    source: Source,
}

impl<'a> QueryCompiler<'a> {
    /// Compiler reading the cube's fact source
    pub fn new(model: &'a Model, cube: &'a Cube) -> Self {
        Self {
            model,
            cube,
            source: Source::from_fact(cube.fact_source(), SOURCE_ALIAS),
        }
    }

    /// Read from another table, view or statement instead of the fact source
    pub fn with_view(mut self, view: &str) -> Self {
        self.source = Source::from_fact(view, SOURCE_ALIAS);
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    /// The conjoined predicate of every cut; `None` for an uncut cube
    pub fn conditions(&self, cuts: &[Cut]) -> Result<Option<Expr>, CompileError> {
        Ok(Expr::conjunction(self.predicates(cuts)?))
    }

    fn predicates(&self, cuts: &[Cut]) -> Result<Vec<Expr>, CompileError> {
        let mut exprs = Vec::new();
        for cut in resolve_cuts(self.model, self.cube, cuts)? {
            match cut {
                ResolvedCut::Point { dimension, steps, .. } => {
                    for (level, value) in steps {
                        exprs.push(self.key_equals(dimension, level, value)?);
                    }
                }
                ResolvedCut::Range { dimension, key_field, from, to } => {
                    exprs.push(Expr::between(
                        self.column(&dimension.field_reference(key_field)),
                        Literal::from_value(from)?,
                        Literal::from_value(to)?,
                    ));
                }
            }
        }
        Ok(exprs)
    }

    /// Equality predicates for the concrete positions of a path
    fn path_predicates(
        &self,
        dimension: &Dimension,
        levels: &[std::sync::Arc<Level>],
        path: &[PathValue],
    ) -> Result<Vec<Expr>, CompileError> {
        let mut exprs = Vec::new();
        for (level, value) in levels.iter().zip(path) {
            if let Some(value) = value.as_value() {
                exprs.push(self.key_equals(dimension, level, value)?);
            }
        }
        Ok(exprs)
    }

    fn key_equals(&self, dimension: &Dimension, level: &Level, value: &Value) -> Result<Expr, QueryError> {
        let key = dimension.field_reference(level.key());
        Ok(Expr::eq(self.column(&key), Literal::from_value(value)?))
    }

    /// Physical column of a logical field, qualified by the source alias
    fn column(&self, logical: &str) -> Column {
        Column::new(SOURCE_ALIAS, self.cube.physical_column(logical))
    }

    /// Project every attribute of `levels` under its logical name, once
    fn level_projections(&self, dimension: &Dimension, levels: &[&std::sync::Arc<Level>]) -> LevelColumns {
        let mut out = LevelColumns::default();
        for level in levels {
            for attribute in &level.attributes {
                let logical = dimension.field_reference(attribute);
                if out.fields.contains(&logical) {
                    continue;
                }
                let column = self.column(&logical);
                out.projections.push(Projection::column(column.clone(), logical.clone()));
                out.group_by.push(column);
                out.fields.push(logical);
            }
        }
        out
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Compile the summary statement and, when drill-down is requested, the
    /// drill statement of an aggregation of `measure`.
    pub fn aggregation(
        &self,
        cuts: &[Cut],
        measure: &str,
        options: &AggregateOptions,
    ) -> Result<CompiledAggregation, CompileError> {
        let measure = self.cube.measure(measure)?;
        let aggregations = resolve_aggregations(options.aggregations.as_deref())?;
        let limit = resolve_limit(options, &aggregations)?;
        let drill = resolve_drill(self.model, self.cube, options, cuts)?;
        if limit.is_some() && drill.is_none() {
            return Err(QueryError::LimitWithoutDrillDown.into());
        }

        let filter = self.conditions(cuts)?;
        let measure_column = self.column(measure);
        let measures: Vec<Projection> = aggregations
            .iter()
            .map(|agg| {
                Projection::Aggregate(AggregateExpr {
                    func: *agg,
                    expr: Expr::Column(measure_column.clone()),
                    alias: field_name_for(measure, *agg),
                })
            })
            .chain(iter::once(Projection::Aggregate(AggregateExpr {
                func: Aggregation::Count,
                expr: Expr::Literal(Literal::Int(1)),
                alias: RECORD_COUNT_FIELD.to_string(),
            })))
            .collect();

        let summary = Query::new(self.source.clone())
            .with_projections(measures.clone())
            .with_filter(filter.clone());

        let drill = match drill {
            Some(drill) => Some(self.drill_query(&drill, measures, filter, options, measure, limit)?),
            None => None,
        };

        Ok(CompiledAggregation {
            measure: measure.to_string(),
            aggregations,
            summary,
            drill,
            limit,
        })
    }

    fn drill_query(
        &self,
        drill: &ResolvedDrill<'_>,
        measures: Vec<Projection>,
        filter: Option<Expr>,
        options: &AggregateOptions,
        measure: &str,
        limit: Option<ResolvedLimit>,
    ) -> Result<Query, CompileError> {
        let levels = self.level_projections(drill.dimension, &drill.levels);
        let mut projections = measures;
        projections.extend(levels.projections);

        let order_by = order_keys(&options.paging, &projections, &levels.fields)?;
        let window = resolve_window(&options.paging)?;

        let query = Query::new(self.source.clone())
            .with_projections(projections)
            .with_filter(filter)
            .with_group_by(levels.group_by)
            .with_order_by(order_by)
            .with_window(window.limit, window.offset);

        Ok(match limit {
            Some(limit) => {
                let ranked = Column::new(DERIVED_ALIAS, field_name_for(measure, limit.aggregation));
                Query::new(Source::Derived {
                    query: Box::new(query),
                    alias: DERIVED_ALIAS.to_string(),
                })
                .with_order_by(vec![SortKey::new(ranked, limit.direction)])
                .with_window(Some(limit.value), None)
            }
            None => query,
        })
    }

    // ========================================================================
    // Facts
    // ========================================================================

    /// Every fact row of the slice, optionally ordered and paginated
    pub fn facts(&self, cuts: &[Cut], paging: &PageOptions) -> Result<Query, CompileError> {
        let direction = resolve_direction(paging.order_direction.as_deref())?;
        let order_by = paging
            .order_by
            .as_deref()
            .map(|field| vec![SortKey::new(self.column(field), direction)])
            .unwrap_or_default();
        let window = resolve_window(paging)?;

        Ok(Query::new(self.source.clone())
            .with_filter(self.conditions(cuts)?)
            .with_order_by(order_by)
            .with_window(window.limit, window.offset))
    }

    /// A single fact row by its identifier
    pub fn fact(&self, id: &Value) -> Result<Query, CompileError> {
        let filter = Expr::eq(self.column(self.cube.key()), Literal::from_value(id)?);
        Ok(Query::new(self.source.clone())
            .with_filter(Some(filter))
            .with_window(Some(1), None))
    }

    // ========================================================================
    // Dimension values
    // ========================================================================

    /// Distinct members of the level following `path`, within the slice.
    ///
    /// Attributes of every level from the first open path position through
    /// the next level are selected and grouped; rows with no next-level key
    /// are excluded.
    pub fn dimension_values(
        &self,
        cuts: &[Cut],
        dimension: &str,
        hierarchy: Option<&str>,
        path: &[PathValue],
        paging: &PageOptions,
    ) -> Result<Query, CompileError> {
        let dimension = self.model.cube_dimension(self.cube, dimension)?;
        let hierarchy = dimension.hierarchy_or_default(hierarchy)?;
        let path_levels = hierarchy.levels_for_path(path, false)?;
        let next = hierarchy.next_level(path)?;

        let mut exprs = self.predicates(cuts)?;
        exprs.extend(self.path_predicates(dimension, path_levels, path)?);
        let next_key = dimension.field_reference(next.key());
        exprs.push(Expr::is_not_null(self.column(&next_key)));

        let open = path.iter().position(PathValue::is_all).unwrap_or(path.len());
        let selected: Vec<_> = hierarchy
            .levels()
            .get(open..=path.len())
            .unwrap_or_default()
            .iter()
            .collect();
        let levels = self.level_projections(dimension, &selected);

        let order_by = match paging.order_by {
            Some(_) => order_keys(paging, &levels.projections, &levels.fields)?,
            None => vec![SortKey::new(
                Column::unqualified(next_key),
                resolve_direction(paging.order_direction.as_deref())?,
            )],
        };
        let window = resolve_window(paging)?;

        Ok(Query::new(self.source.clone())
            .with_projections(levels.projections)
            .with_filter(Expr::conjunction(exprs))
            .with_group_by(levels.group_by)
            .with_order_by(order_by)
            .with_window(window.limit, window.offset))
    }

    /// Every attribute of every hierarchy level for the first fact row at `path`
    pub fn dimension_detail(
        &self,
        dimension: &str,
        hierarchy: Option<&str>,
        path: &[PathValue],
    ) -> Result<Query, CompileError> {
        let dimension = self.model.cube_dimension(self.cube, dimension)?;
        let hierarchy = dimension.hierarchy_or_default(hierarchy)?;
        let path_levels = hierarchy.levels_for_path(path, false)?;

        let all_levels: Vec<_> = hierarchy.levels().iter().collect();
        let levels = self.level_projections(dimension, &all_levels);

        Ok(Query::new(self.source.clone())
            .with_projections(levels.projections)
            .with_filter(Expr::conjunction(self.path_predicates(dimension, path_levels, path)?))
            .with_window(Some(1), None))
    }
}

/// Level attribute projections with their grouping columns and logical names
#[derive(Default)]
struct LevelColumns {
    projections: Vec<Projection>,
    group_by: Vec<Column>,
    fields: Vec<String>,
}

/// ORDER BY of a grouped statement.
///
/// An explicit field must be one of the statement's outputs; without one the
/// rows are ordered by `default_fields`.
fn order_keys(
    paging: &PageOptions,
    projections: &[Projection],
    default_fields: &[String],
) -> Result<Vec<SortKey>, QueryError> {
    let direction = resolve_direction(paging.order_direction.as_deref())?;
    match paging.order_by.as_deref() {
        Some(field) => {
            if !projections.iter().any(|p| p.output_name() == field) {
                return Err(QueryError::UnknownOrderField(field.to_string()));
            }
            Ok(vec![SortKey::new(Column::unqualified(field), direction)])
        }
        None => Ok(default_fields
            .iter()
            .map(|f| SortKey::new(Column::unqualified(f.as_str()), direction))
            .collect()),
    }
}
