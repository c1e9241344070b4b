//! Group distance scoring.
//!
//! A [`DistributionScorer`] compares the target restricted to each group with
//! the reference a [`ComparisonMode`] prescribes, producing a
//! [`DistanceTable`] that the [`ScoreAggregator`] reduces to a single
//! [`FairnessScore`]. [`FairnessScorer`] wraps the whole pipeline around a
//! dataset and a list of sensitive attributes.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use term_fairness::dataset::Dataset;
//! use term_fairness::groups::{ComparisonMode, GroupSpec};
//! use term_fairness::scorer::distribution_score;
//!
//! let sex: Vec<&str> = (0..20).map(|i| if i < 10 { "F" } else { "M" }).collect();
//! let hired: Vec<i64> = (0..20).map(|i| if i < 3 || i >= 12 { 1 } else { 0 }).collect();
//! let dataset = Dataset::from_columns(vec![
//!     ("sex", Arc::new(StringArray::from(sex)) as ArrayRef),
//!     ("hired", Arc::new(Int64Array::from(hired)) as ArrayRef),
//! ])
//! .unwrap();
//!
//! let result = distribution_score(
//!     &dataset,
//!     "hired",
//!     &[GroupSpec::values("sex", ["F"]), GroupSpec::values("sex", ["M"])],
//!     ComparisonMode::Rest,
//!     None,
//! )
//! .unwrap();
//!
//! // Hiring rates 0.3 vs 0.8
//! assert!((result.score.value - 0.5).abs() < 1e-12);
//! ```

pub mod aggregate;
pub mod detector;
pub mod fairness;
pub mod report;
pub mod table;

use arrow::array::ArrayRef;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::analyzers::{Distribution, DistributionType, HeuristicClassifier, TypeClassifier};
use crate::dataset::Dataset;
use crate::error::{FairnessError, Result};
use crate::groups::{ComparisonMode, GroupMask, GroupSpec, PlannedComparison, PredicatePartitioner};
use crate::logging::LogConfig;
use crate::metrics::{DistanceEngine, DistanceMetric};

pub use aggregate::{calculate_score, FairnessScore, ScoreAggregator};
pub use detector::SensitiveAttributeDetector;
pub use fairness::FairnessScorer;
pub use report::FairnessReport;
pub use table::{DistanceOutcome, DistanceRecord, DistanceTable};

/// A distance table together with its aggregated score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionScore {
    /// Per-group (or per-pair) distances
    pub table: DistanceTable,
    /// Count-weighted mean of the table's distances
    pub score: FairnessScore,
}

/// Measures how far the target under each group drifts from its reference.
#[derive(Debug, Clone)]
pub struct DistributionScorer<'a> {
    dataset: &'a Dataset,
    target: String,
    column: &'a ArrayRef,
    target_type: DistributionType,
    engine: DistanceEngine,
    log_config: LogConfig,
}

impl<'a> DistributionScorer<'a> {
    /// Creates a scorer for `target`, classifying it with `classifier`.
    pub fn new(dataset: &'a Dataset, target: &str, classifier: &dyn TypeClassifier) -> Result<Self> {
        let column = dataset.column(target)?;
        let target_type = classifier.classify(column.as_ref())?;
        Ok(Self {
            dataset,
            target: target.to_string(),
            column,
            target_type,
            engine: DistanceEngine::default(),
            log_config: LogConfig::default(),
        })
    }

    /// Uses a configured distance engine.
    pub fn with_engine(mut self, engine: DistanceEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Sets logging verbosity.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Semantic type of the target.
    pub fn target_type(&self) -> DistributionType {
        self.target_type
    }

    /// Resolves the metric every comparison will use.
    ///
    /// Binary-ness is judged on the whole target column, so all records of a
    /// table share one metric.
    pub fn metric_for(&self, name: Option<&str>) -> Result<DistanceMetric> {
        let requested = DistanceEngine::resolve_metric(name, self.target_type)?;
        let full = Distribution::from_array(self.column.as_ref(), self.target_type)?;
        if full.is_empty() {
            return Err(FairnessError::empty_distribution(format!(
                "target '{}' has no usable values",
                self.target
            )));
        }
        self.engine
            .select_metric(&full, &full, requested, self.target_type)
    }

    /// Builds the distance table of `groups` under `mode`.
    #[instrument(skip(self, groups), fields(target = %self.target, groups = groups.len(), mode = %mode))]
    pub fn distance_table(
        &self,
        groups: &[GroupSpec],
        mode: ComparisonMode,
        metric: Option<&str>,
    ) -> Result<DistanceTable> {
        if groups.is_empty() {
            return Err(FairnessError::NoGroups);
        }
        let metric = self.metric_for(metric)?;
        let masks = PredicatePartitioner::new(self.dataset).partition(groups)?;
        self.masked_table(&masks, mode, metric)
    }

    /// Builds a distance table from already resolved group masks.
    pub fn masked_table(
        &self,
        masks: &[GroupMask],
        mode: ComparisonMode,
        metric: DistanceMetric,
    ) -> Result<DistanceTable> {
        let plans = PredicatePartitioner::new(self.dataset).plan(masks, mode)?;
        crate::perf_debug!(self.log_config, comparisons = plans.len(), mode = %mode, metric = %metric, "Planned comparisons");

        let mut records = Vec::with_capacity(plans.len());
        for plan in plans {
            let record = match plan {
                PlannedComparison::EmptyGroup { label } => DistanceRecord::empty(label),
                PlannedComparison::Compare {
                    label,
                    group,
                    reference,
                } => {
                    let a = Distribution::from_masked(self.column, &group, self.target_type)?;
                    let b = Distribution::from_masked(self.column, &reference, self.target_type)?;
                    if a.is_empty() || b.is_empty() {
                        return Err(FairnessError::empty_distribution(format!(
                            "'{label}' leaves no usable '{}' values on one side",
                            self.target
                        )));
                    }

                    let distance = self.engine.distance(&a, &b, Some(metric), self.target_type)?;
                    let count = match mode {
                        ComparisonMode::Pairwise => a.len().min(b.len()),
                        ComparisonMode::All | ComparisonMode::Rest => a.len(),
                    } as u64;

                    crate::log_distance!(
                        self.log_config,
                        record = %self.log_config.label(&label.to_string()),
                        metric = %metric,
                        distance,
                        count,
                        "Measured distance"
                    );
                    DistanceRecord::measured(label, distance, count)
                }
            };
            records.push(record);
        }

        let empty = records.iter().filter(|r| r.distance().is_none()).count();
        if empty > 0 {
            warn!(empty, "Distance table contains empty-group records");
        }

        Ok(DistanceTable {
            target: self.target.clone(),
            target_type: self.target_type,
            mode,
            metric,
            records,
        })
    }

    /// Builds the distance table and aggregates it.
    pub fn score(
        &self,
        groups: &[GroupSpec],
        mode: ComparisonMode,
        metric: Option<&str>,
    ) -> Result<DistributionScore> {
        let table = self.distance_table(groups, mode, metric)?;
        let score = ScoreAggregator::aggregate(&table.records)?;
        crate::log_score!(
            self.log_config,
            target = %self.target,
            mode = %mode,
            metric = %table.metric,
            score = score.value,
            "Computed fairness score"
        );
        Ok(DistributionScore { table, score })
    }
}

/// Scores `groups` against `target` with the default classifier and engine.
///
/// `metric` is a metric name (`"ks_distance"`, `"emd"`, ...); `None` picks the
/// default for the target's type.
pub fn distribution_score(
    dataset: &Dataset,
    target: &str,
    groups: &[GroupSpec],
    mode: ComparisonMode,
    metric: Option<&str>,
) -> Result<DistributionScore> {
    DistributionScorer::new(dataset, target, &HeuristicClassifier::new())?.score(groups, mode, metric)
}
