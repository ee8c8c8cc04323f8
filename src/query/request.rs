use serde::{Deserialize, Serialize};

/// Ordering and pagination of a listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PageOptions {
    /// Field to order by: a logical field (`dimension.attribute`) or a
    /// generated field (`amount_sum`, `record_count`)
    pub order_by: Option<String>,
    /// `asc`/`ascending` or `desc`/`descending`; ascending when omitted
    pub order_direction: Option<String>,
    /// Zero-based page number
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Options of an aggregation request
///
/// Strings are validated when the request is compiled, so this can be
/// deserialized straight from a request body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AggregateOptions {
    /// Aggregation operators applied to the measure; `["sum"]` when omitted
    pub aggregations: Option<Vec<String>>,
    /// Dimension whose levels the drill rows are grouped by
    pub row_dimension: Option<String>,
    /// Levels of `row_dimension` to group by; enables drill-down
    pub row_levels: Option<Vec<String>>,
    /// Group by one level below the slice's point on `row_dimension`
    #[serde(default)]
    pub drilldown: bool,
    /// `rank`, `top_10`, `percent` or `value`
    pub limit: Option<String>,
    /// Aggregation the limit ranks by; `sum` when omitted
    pub limit_aggregation: Option<String>,
    pub limit_value: Option<f64>,
    /// `ascending`/`asc`/`bottom` or `descending`/`desc`/`top`
    pub limit_sort: Option<String>,
    #[serde(flatten)]
    pub paging: PageOptions,
}

impl AggregateOptions {
    /// Drill-down is requested either by explicit levels or by `drilldown`
    pub fn is_drill_down(&self) -> bool {
        self.row_levels.is_some() || self.drilldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_flat_request() {
        let options: AggregateOptions = serde_json::from_str(
            r#"{
                "row_dimension": "date",
                "row_levels": ["year"],
                "limit": "rank",
                "limit_value": 3,
                "limit_sort": "descending",
                "order_by": "date.year",
                "page": 1,
                "page_size": 20
            }"#,
        )
        .unwrap();

        assert_eq!(options.row_dimension.as_deref(), Some("date"));
        assert_eq!(options.limit_value, Some(3.0));
        assert_eq!(options.paging.order_by.as_deref(), Some("date.year"));
        assert_eq!(options.paging.page, Some(1));
        assert!(options.is_drill_down());
        assert!(!options.drilldown);
    }

    #[test]
    fn test_default_is_summary_only() {
        let options: AggregateOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, AggregateOptions::default());
        assert!(!options.is_drill_down());
    }
}
