//! Slice: a cube narrowed by an ordered set of cuts

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::cut::{Cut, PathValue};
use crate::model::Aggregation;
use super::result::Summary;

/// Identifies a cached summary
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SummaryKey {
    /// Table, view or statement the summary was read from
    source: String,
    fingerprint: u64,
    measure: String,
    aggregations: Vec<Aggregation>,
}

impl SummaryKey {
    pub(crate) fn new(source: &str, fingerprint: u64, measure: &str, aggregations: &[Aggregation]) -> Self {
        Self {
            source: source.to_string(),
            fingerprint,
            measure: measure.to_string(),
            aggregations: aggregations.to_vec(),
        }
    }
}

/// A cube bound to an accumulated list of cuts
///
/// The `cut_by*` methods derive a new slice and leave the receiver untouched.
/// `add_cut` and `remove_cuts_by_dimension` change the slice in place. Any
/// change to the cuts drops every cached summary.
#[derive(Debug, Clone)]
pub struct Slice {
    cube: String,
    cuts: Vec<Cut>,
    summaries: HashMap<SummaryKey, Summary>,
}

impl Slice {
    /// An uncut slice of `cube`
    pub fn new(cube: impl Into<String>) -> Self {
        Self {
            cube: cube.into(),
            cuts: Vec::new(),
            summaries: HashMap::new(),
        }
    }

    pub fn cube_name(&self) -> &str {
        &self.cube
    }

    pub fn cuts(&self) -> &[Cut] {
        &self.cuts
    }

    // ------------------------------------------------------------------------
    // Copy-on-write derivation
    // ------------------------------------------------------------------------

    /// A new slice with `cut` appended
    pub fn cut_by(&self, cut: Cut) -> Slice {
        let mut cuts = self.cuts.clone();
        cuts.push(cut);
        Slice {
            cube: self.cube.clone(),
            cuts,
            summaries: HashMap::new(),
        }
    }

    pub fn cut_by_point(&self, dimension: &str, path: Vec<PathValue>) -> Slice {
        self.cut_by(Cut::point(dimension, path))
    }

    pub fn cut_by_range(&self, dimension: &str, from_key: impl Into<Value>, to_key: impl Into<Value>) -> Slice {
        self.cut_by(Cut::range(dimension, from_key, to_key))
    }

    pub fn cut_by_set(&self, dimension: &str, paths: Vec<Vec<PathValue>>) -> Slice {
        self.cut_by(Cut::set(dimension, paths))
    }

    // ------------------------------------------------------------------------
    // In-place administration
    // ------------------------------------------------------------------------

    pub fn add_cut(&mut self, cut: Cut) {
        self.cuts.push(cut);
        self.invalidate();
    }

    /// Remove every cut on `dimension`; returns how many were removed
    pub fn remove_cuts_by_dimension(&mut self, dimension: &str) -> usize {
        let before = self.cuts.len();
        self.cuts.retain(|cut| cut.dimension_name() != dimension);
        let removed = before - self.cuts.len();
        if removed > 0 {
            self.invalidate();
        }
        removed
    }

    pub fn cuts_for_dimension(&self, dimension: &str) -> Vec<&Cut> {
        self.cuts
            .iter()
            .filter(|cut| cut.dimension_name() == dimension)
            .collect()
    }

    /// Stable hash of the cut list, in order
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.cube.hash(&mut hasher);
        serde_json::to_string(&self.cuts)
            .unwrap_or_default()
            .hash(&mut hasher);
        hasher.finish()
    }

    // ------------------------------------------------------------------------
    // Summary cache
    // ------------------------------------------------------------------------

    /// Number of cached summaries
    pub fn cached_summaries(&self) -> usize {
        self.summaries.len()
    }

    pub(crate) fn cached_summary(&self, key: &SummaryKey) -> Option<&Summary> {
        self.summaries.get(key)
    }

    pub(crate) fn cache_summary(&mut self, key: SummaryKey, summary: Summary) {
        self.summaries.insert(key, summary);
    }

    fn invalidate(&mut self) {
        if !self.summaries.is_empty() {
            log::debug!("cuts of '{}' slice changed, dropping {} cached summaries", self.cube, self.summaries.len());
        }
        self.summaries.clear();
    }
}
