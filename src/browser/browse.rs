//! Aggregation browser: compile, execute and assemble

use std::sync::Arc;

use serde_json::Value;

use crate::compiler::QueryCompiler;
use crate::cut::PathValue;
use crate::emitter::render_sql;
use crate::model::{Cube, Model};
use crate::plan::Query;
use crate::query::{AggregateOptions, PageOptions};
use crate::store::{execute_within, DataStore, ExecutionContext, ExecutionError, Row};
use super::error::BrowserError;
use super::result::{AggregationResult, ComputedFields, Remainder, Summary};
use super::slice::{Slice, SummaryKey};

/// Browses one cube of a model through a data store
///
/// Cheap to clone; the model and the store are shared.
#[derive(Clone)]
pub struct AggregationBrowser {
    model: Arc<Model>,
    cube: Cube,
    view: Option<String>,
    store: Arc<dyn DataStore>,
    context: ExecutionContext,
}

impl AggregationBrowser {
    pub fn new(model: Arc<Model>, cube: &str, store: Arc<dyn DataStore>) -> Result<Self, BrowserError> {
        let cube = model.cube(cube)?.clone();
        Ok(Self {
            model,
            cube,
            view: None,
            store,
            context: ExecutionContext::default(),
        })
    }

    /// Read from this table, view or statement instead of the cube's fact source
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Timeout and cancellation applied to every statement
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The whole cube, uncut
    pub fn full_cube(&self) -> Slice {
        Slice::new(self.cube.name.clone())
    }

    fn compiler(&self) -> QueryCompiler<'_> {
        let compiler = QueryCompiler::new(&self.model, &self.cube);
        match &self.view {
            Some(view) => compiler.with_view(view),
            None => compiler,
        }
    }

    /// Table, view or statement the browser reads from
    fn source_name(&self) -> &str {
        self.view.as_deref().unwrap_or_else(|| self.cube.fact_source())
    }

    fn check_slice(&self, slice: &Slice) -> Result<(), BrowserError> {
        if slice.cube_name() != self.cube.name {
            return Err(BrowserError::SliceMismatch {
                slice: slice.cube_name().to_string(),
                browser: self.cube.name.clone(),
            });
        }
        Ok(())
    }

    /// Render, log and execute one statement
    async fn run(&self, query: &Query) -> Result<Vec<Row>, BrowserError> {
        let statement = render_sql(query)?;
        log::debug!("executing on {} store:\n{}", self.store.backend_type(), statement);

        match execute_within(self.store.as_ref(), query, &self.context).await {
            Ok(rows) => {
                log::debug!("statement returned {} rows", rows.len());
                Ok(rows)
            }
            Err(source) => {
                log::warn!("statement on cube '{}' failed: {}", self.cube.name, source);
                Err(ExecutionError { statement, source }.into())
            }
        }
    }

    // ========================================================================
    // Aggregation
    // ========================================================================

    /// Aggregate `measure` over the slice.
    ///
    /// The summary is cached in the slice per measure and aggregation set. Drill
    /// rows are fetched only when drill-down is requested; computed fields are
    /// applied to them after the remainder is taken.
    pub async fn aggregate(
        &self,
        slice: &mut Slice,
        measure: &str,
        options: &AggregateOptions,
        computed: &ComputedFields,
    ) -> Result<AggregationResult, BrowserError> {
        self.check_slice(slice)?;
        let compiled = self.compiler().aggregation(slice.cuts(), measure, options)?;

        let key = SummaryKey::new(
            self.source_name(),
            slice.fingerprint(),
            &compiled.measure,
            &compiled.aggregations,
        );
        let summary = match slice.cached_summary(&key) {
            Some(summary) => {
                log::debug!("summary cache hit for '{}'", compiled.measure);
                summary.clone()
            }
            None => {
                log::debug!("summary cache miss for '{}'", compiled.measure);
                let rows = self.run(&compiled.summary).await?;
                let summary = Summary::from_row(rows.first(), &compiled);
                slice.cache_summary(key, summary.clone());
                summary
            }
        };

        let mut rows = match &compiled.drill {
            Some(drill) => self.run(drill).await?,
            None => Vec::new(),
        };

        let remainder = compiled
            .has_limit()
            .then(|| Remainder::compute(&summary, &rows, &compiled));

        if !computed.is_empty() {
            rows.iter_mut().for_each(|row| computed.apply(row));
        }

        Ok(AggregationResult {
            measure: compiled.measure,
            summary,
            rows,
            remainder,
            options: options.clone(),
        })
    }

    // ========================================================================
    // Facts
    // ========================================================================

    /// Fact rows of the slice
    pub async fn facts(&self, slice: &Slice, paging: &PageOptions) -> Result<Vec<Row>, BrowserError> {
        self.check_slice(slice)?;
        let query = self.compiler().facts(slice.cuts(), paging)?;
        self.run(&query).await
    }

    /// A single fact row by the cube's key
    pub async fn fact(&self, id: &Value) -> Result<Option<Row>, BrowserError> {
        let query = self.compiler().fact(id)?;
        Ok(self.run(&query).await?.into_iter().next())
    }

    // ========================================================================
    // Dimensions
    // ========================================================================

    /// Members of the level following `path` that occur in the slice
    pub async fn dimension_values(
        &self,
        slice: &Slice,
        dimension: &str,
        hierarchy: Option<&str>,
        path: &[PathValue],
        paging: &PageOptions,
    ) -> Result<Vec<Row>, BrowserError> {
        self.check_slice(slice)?;
        let query = self
            .compiler()
            .dimension_values(slice.cuts(), dimension, hierarchy, path, paging)?;
        self.run(&query).await
    }

    /// Attributes of every hierarchy level at `path`, from the first matching fact
    pub async fn dimension_detail(
        &self,
        dimension: &str,
        hierarchy: Option<&str>,
        path: &[PathValue],
    ) -> Result<Option<Row>, BrowserError> {
        let query = self.compiler().dimension_detail(dimension, hierarchy, path)?;
        Ok(self.run(&query).await?.into_iter().next())
    }
}

impl std::fmt::Debug for AggregationBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationBrowser")
            .field("cube", &self.cube.name)
            .field("view", &self.view)
            .field("store", &self.store.backend_type())
            .finish()
    }
}
