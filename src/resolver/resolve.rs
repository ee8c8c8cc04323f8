use crate::compiler::CompileError;
use crate::cut::{Cut, PathValue};
use crate::error::{QueryError, Unsupported};
use crate::model::{Aggregation, Cube, Model, ModelError};
use crate::plan::SortDirection;
use crate::query::{AggregateOptions, PageOptions};
use super::types::{ResolvedCut, ResolvedDrill, ResolvedLimit, Window};

/// Row cap of the `top_10` limit shortcut
const TOP_N_DEFAULT: u64 = 10;

// ============================================================================
// Cuts
// ============================================================================

/// Bind a cut to `cube`.
///
/// The dimension must be attached to the cube; a point cut's hierarchy is the
/// named one or the dimension's default, and its path may not be deeper than
/// that hierarchy.
pub fn resolve_cut<'a>(model: &'a Model, cube: &'a Cube, cut: &'a Cut) -> Result<ResolvedCut<'a>, CompileError> {
    let dimension = model.cube_dimension(cube, cut.dimension_name())?;

    match cut {
        Cut::Point(point) => {
            let hierarchy = dimension.hierarchy_or_default(point.hierarchy.as_deref())?;
            let levels = hierarchy.levels_for_path(&point.path, false)?;
            let steps = levels
                .iter()
                .zip(point.path.iter())
                .filter_map(|(level, value)| value.as_value().map(|v| (level, v)))
                .collect();
            Ok(ResolvedCut::Point { dimension, hierarchy, steps })
        }
        Cut::Range(range) => {
            let key_field = dimension
                .key_field
                .as_deref()
                .ok_or_else(|| ModelError::MissingKeyField(dimension.name.clone()))?;
            Ok(ResolvedCut::Range {
                dimension,
                key_field,
                from: &range.from_key,
                to: &range.to_key,
            })
        }
        Cut::Set(_) => Err(Unsupported::SetCut.into()),
    }
}

/// Bind every cut, failing on the first one that does not resolve
pub fn resolve_cuts<'a>(model: &'a Model, cube: &'a Cube, cuts: &'a [Cut]) -> Result<Vec<ResolvedCut<'a>>, CompileError> {
    cuts.iter().map(|cut| resolve_cut(model, cube, cut)).collect()
}

// ============================================================================
// Options
// ============================================================================

/// Parse aggregation operators; `[sum]` when none are given.
///
/// Duplicates collapse, keeping the first occurrence.
pub fn resolve_aggregations(names: Option<&[String]>) -> Result<Vec<Aggregation>, QueryError> {
    let Some(names) = names.filter(|n| !n.is_empty()) else {
        return Ok(vec![Aggregation::Sum]);
    };

    let mut aggregations = Vec::with_capacity(names.len());
    for name in names {
        let agg: Aggregation = name
            .parse()
            .map_err(|_| QueryError::UnknownAggregation(name.clone()))?;
        if !aggregations.contains(&agg) {
            aggregations.push(agg);
        }
    }
    Ok(aggregations)
}

/// Parse an order direction; ascending when omitted
pub fn resolve_direction(direction: Option<&str>) -> Result<SortDirection, QueryError> {
    match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") | Some("ascending") => Ok(SortDirection::Ascending),
        Some("desc") | Some("descending") => Ok(SortDirection::Descending),
        Some(_) => Err(QueryError::UnknownOrderDirection(direction.unwrap_or_default().to_string())),
    }
}

/// Page `p` of size `s` skips `p * s` rows and takes `s`.
///
/// Without a page the listing is unrestricted.
pub fn resolve_window(paging: &PageOptions) -> Result<Window, QueryError> {
    match (paging.page, paging.page_size) {
        (None, _) => Ok(Window::default()),
        (Some(_), None) => Err(QueryError::MissingPageSize),
        (Some(page), Some(size)) => Ok(Window {
            limit: Some(size),
            offset: Some(page.saturating_mul(size)),
        }),
    }
}

/// Resolve the drill-down levels of an aggregation request.
///
/// Explicit `row_levels` win. With only `drilldown`, the rows are grouped one
/// level below the slice's point cut on the row dimension (the first level
/// when the slice does not cut that dimension).
pub fn resolve_drill<'a>(
    model: &'a Model,
    cube: &'a Cube,
    options: &AggregateOptions,
    cuts: &'a [Cut],
) -> Result<Option<ResolvedDrill<'a>>, CompileError> {
    if !options.is_drill_down() {
        return Ok(None);
    }

    let name = options
        .row_dimension
        .as_deref()
        .ok_or(QueryError::MissingRowDimension)?;
    let dimension = model.cube_dimension(cube, name)?;

    let levels = match &options.row_levels {
        Some(level_names) => level_names
            .iter()
            .map(|level| dimension.level(level))
            .collect::<Result<Vec<_>, _>>()?,
        None => {
            let point = cuts.iter().rev().find_map(|cut| match cut {
                Cut::Point(p) if p.dimension == dimension.name => Some(p),
                _ => None,
            });
            let (hierarchy, path) = match point {
                Some(p) => (dimension.hierarchy_or_default(p.hierarchy.as_deref())?, p.path.as_slice()),
                None => (dimension.default_hierarchy()?, &[] as &[PathValue]),
            };
            hierarchy.levels_for_path(path, true)?.iter().collect()
        }
    };

    Ok(Some(ResolvedDrill { dimension, levels }))
}

/// Resolve the limit options against the selected aggregations
pub fn resolve_limit(
    options: &AggregateOptions,
    aggregations: &[Aggregation],
) -> Result<Option<ResolvedLimit>, CompileError> {
    let Some(kind) = options.limit.as_deref() else {
        return Ok(None);
    };

    let (value, direction) = match kind {
        "rank" => {
            let value = options.limit_value.ok_or(QueryError::MissingLimitValue)?;
            (rank_value(value)?, resolve_limit_sort(options.limit_sort.as_deref())?)
        }
        "top_10" => (TOP_N_DEFAULT, SortDirection::Descending),
        "percent" => return Err(Unsupported::PercentLimit.into()),
        "value" => return Err(Unsupported::ValueLimit.into()),
        other => return Err(QueryError::UnknownLimit(other.to_string()).into()),
    };

    let aggregation = match options.limit_aggregation.as_deref() {
        None => Aggregation::Sum,
        Some(name) => name
            .parse()
            .map_err(|_| QueryError::UnknownAggregation(name.to_string()))?,
    };
    if !aggregations.contains(&aggregation) {
        return Err(QueryError::LimitAggregationNotSelected(aggregation.to_string()).into());
    }

    Ok(Some(ResolvedLimit { aggregation, value, direction }))
}

fn resolve_limit_sort(sort: Option<&str>) -> Result<SortDirection, QueryError> {
    match sort.map(str::to_ascii_lowercase).as_deref() {
        None | Some("ascending") | Some("asc") | Some("bottom") => Ok(SortDirection::Ascending),
        Some("descending") | Some("desc") | Some("top") => Ok(SortDirection::Descending),
        Some(_) => Err(QueryError::UnknownOrderDirection(sort.unwrap_or_default().to_string())),
    }
}

fn rank_value(value: f64) -> Result<u64, QueryError> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(QueryError::InvalidLimitValue(value))
    }
}
