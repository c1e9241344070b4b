//! End-to-end fairness audits over a dataset and its sensitive attributes.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::analyzers::{
    analyze_groups, DistributionType, GroupAnalysis, HeuristicClassifier, MomentEngine,
    TypeClassifier,
};
use crate::cluster::{Dendrogram, GroupClusterer, PairwiseMatrix};
use crate::config::ScorerConfig;
use crate::dataset::Dataset;
use crate::error::{FairnessError, Result};
use crate::groups::{attribute_groups, ComparisonMode, GroupMask, GroupSpec, PredicatePartitioner};
use crate::logging::LogConfig;
use crate::metrics::DistanceEngine;
use crate::scorer::{
    DistributionScore, DistributionScorer, FairnessReport, SensitiveAttributeDetector,
};

/// Audits a target column across the groups induced by sensitive attributes.
///
/// Every distinct value of a categorical sensitive attribute forms a group;
/// continuous and datetime attributes are split into equal-frequency bands.
/// With several attributes the audited groups are their intersections, so no
/// group ever contains another.
///
/// In `rest` mode a group covering every row has no complement: a single
/// sensitive attribute with one observed value and no missing entries makes
/// the call fail with [`FairnessError::DegenerateComparison`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array, StringArray};
/// use term_fairness::dataset::Dataset;
/// use term_fairness::groups::ComparisonMode;
/// use term_fairness::scorer::FairnessScorer;
///
/// let race: Vec<&str> = (0..30).map(|i| ["A", "B", "C"][i % 3]).collect();
/// let approved: Vec<i64> = (0..30).map(|i| (i % 3 == 0 || i % 5 == 0) as i64).collect();
/// let dataset = Dataset::from_columns(vec![
///     ("race", Arc::new(StringArray::from(race)) as ArrayRef),
///     ("approved", Arc::new(Int64Array::from(approved)) as ArrayRef),
/// ])
/// .unwrap();
///
/// let scorer = FairnessScorer::new(dataset, "approved", ["race"]).unwrap();
/// assert_eq!(scorer.groups().unwrap().len(), 3);
///
/// let result = scorer.distribution_score(Some(ComparisonMode::Pairwise), None).unwrap();
/// assert_eq!(result.table.len(), 3);
/// assert!(result.score.value > 0.0);
/// ```
#[derive(Clone)]
pub struct FairnessScorer {
    dataset: Dataset,
    target: String,
    sensitive_attributes: Vec<String>,
    config: ScorerConfig,
    classifier: Option<Arc<dyn TypeClassifier>>,
    log_config: LogConfig,
}

impl fmt::Debug for FairnessScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FairnessScorer")
            .field("target", &self.target)
            .field("sensitive_attributes", &self.sensitive_attributes)
            .field("rows", &self.dataset.num_rows())
            .field("config", &self.config)
            .field("custom_classifier", &self.classifier.is_some())
            .finish()
    }
}

impl FairnessScorer {
    /// Creates a scorer.
    ///
    /// The target and every sensitive attribute must be columns of `dataset`,
    /// and the target cannot be one of its own sensitive attributes. Repeated
    /// attribute names are dropped.
    pub fn new<I, S>(
        dataset: impl Into<Dataset>,
        target: impl Into<String>,
        sensitive_attributes: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dataset = dataset.into();
        let target = target.into();
        if !dataset.has_column(&target) {
            return Err(FairnessError::column_not_found(target));
        }

        let mut attributes: Vec<String> = Vec::new();
        for attribute in sensitive_attributes {
            let attribute = attribute.into();
            if !attributes.contains(&attribute) {
                attributes.push(attribute);
            }
        }
        validate_attributes(&dataset, &target, &attributes)?;

        Ok(Self {
            dataset,
            target,
            sensitive_attributes: attributes,
            config: ScorerConfig::default(),
            classifier: None,
            log_config: LogConfig::default(),
        })
    }

    /// Replaces the configuration after validating it.
    pub fn with_config(mut self, config: ScorerConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Uses a custom type classifier for the target and sensitive attributes.
    pub fn with_classifier(mut self, classifier: impl TypeClassifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Sets logging verbosity.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Adds the attributes a detector reports.
    ///
    /// The combined list is sorted and de-duplicated; the target is never
    /// treated as sensitive.
    pub fn detect_with(mut self, detector: &dyn SensitiveAttributeDetector) -> Result<Self> {
        let detected = detector.detect(&self.dataset)?;
        let mut attributes: Vec<String> = self
            .sensitive_attributes
            .drain(..)
            .chain(detected.into_iter().filter(|name| *name != self.target))
            .collect();
        attributes.sort();
        attributes.dedup();
        validate_attributes(&self.dataset, &self.target, &attributes)?;

        info!(attributes = ?attributes, "Sensitive attributes after detection");
        self.sensitive_attributes = attributes;
        Ok(self)
    }

    /// The dataset under audit.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The target column.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The sensitive attributes groups are derived from.
    pub fn sensitive_attributes(&self) -> &[String] {
        &self.sensitive_attributes
    }

    /// The active configuration.
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    fn classifier(&self) -> Arc<dyn TypeClassifier> {
        match &self.classifier {
            Some(classifier) => Arc::clone(classifier),
            None => Arc::new(HeuristicClassifier::with_config(self.config.inference.clone())),
        }
    }

    fn distribution_scorer<'a>(&'a self, classifier: &dyn TypeClassifier) -> Result<DistributionScorer<'a>> {
        Ok(DistributionScorer::new(&self.dataset, &self.target, classifier)?
            .with_engine(DistanceEngine::new(self.config.histogram_bins))
            .with_log_config(self.log_config.clone()))
    }

    /// Semantic type of the target.
    pub fn target_type(&self) -> Result<DistributionType> {
        self.classifier().classify(self.dataset.column(&self.target)?.as_ref())
    }

    /// Enumerates the intersectional groups of the sensitive attributes.
    ///
    /// Each group combines one group of every attribute (in attribute order)
    /// and is labelled by joining theirs, e.g. `"race=B, sex=F"`. Combinations
    /// that select no rows are dropped, so the groups are pairwise disjoint
    /// and non-empty.
    pub fn groups(&self) -> Result<Vec<GroupSpec>> {
        let classifier = self.classifier();
        let partitioner = PredicatePartitioner::new(&self.dataset);

        let mut combined: Option<Vec<GroupMask>> = None;
        for attribute in &self.sensitive_attributes {
            let masks = partitioner.partition(&attribute_groups(
                &self.dataset,
                attribute,
                classifier.as_ref(),
                self.config.sensitive_bins,
            )?)?;
            combined = Some(match combined {
                None => masks,
                Some(previous) => {
                    let mut next = Vec::with_capacity(previous.len() * masks.len());
                    for left in &previous {
                        for right in &masks {
                            next.push(left.intersection(right)?);
                        }
                    }
                    next
                }
            });
        }

        let groups: Vec<GroupSpec> = combined
            .unwrap_or_default()
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| {
                crate::log_group!(
                    self.log_config,
                    group = %self.log_config.label(&group.label),
                    rows = group.row_count(),
                    "Derived sensitive group"
                );
                GroupSpec::selector(group.label, group.mask)
            })
            .collect();

        if groups.is_empty() {
            return Err(FairnessError::NoGroups);
        }
        Ok(groups)
    }

    /// Mean and variance of the target within each group.
    pub fn group_analysis(&self) -> Result<GroupAnalysis> {
        let groups = self.groups()?;
        let classifier = self.classifier();
        analyze_groups(
            &self.dataset,
            &self.target,
            &groups,
            classifier.as_ref(),
            MomentEngine::new(self.config.categorical_mode),
        )
    }

    /// Distance table and fairness score.
    ///
    /// `mode` and `metric` fall back to the configured values.
    #[instrument(skip(self), fields(target = %self.target))]
    pub fn distribution_score(
        &self,
        mode: Option<ComparisonMode>,
        metric: Option<&str>,
    ) -> Result<DistributionScore> {
        let groups = self.groups()?;
        let classifier = self.classifier();
        let mode = mode.unwrap_or(self.config.mode);
        let metric = metric.or(self.config.metric.as_deref());
        self.distribution_scorer(classifier.as_ref())?
            .score(&groups, mode, metric)
    }

    /// Pairwise distances between all non-empty groups.
    pub fn pairwise_matrix(&self, metric: Option<&str>) -> Result<PairwiseMatrix> {
        let groups = self.groups()?;
        let classifier = self.classifier();
        let scorer = self.distribution_scorer(classifier.as_ref())?;
        let metric = scorer.metric_for(metric.or(self.config.metric.as_deref()))?;

        let mut masks = PredicatePartitioner::new(&self.dataset).partition(&groups)?;
        masks.retain(|group| {
            if group.is_empty() {
                warn!(group = %group.label, "Skipping empty group in clustering");
            }
            !group.is_empty()
        });
        if masks.len() < 2 {
            return Err(FairnessError::degenerate(format!(
                "clustering needs at least two non-empty groups, got {}",
                masks.len()
            )));
        }

        let table = scorer.masked_table(&masks, ComparisonMode::Pairwise, metric)?;
        PairwiseMatrix::from_table(&table)
    }

    /// Agglomerative merge tree of the groups.
    pub fn dendrogram(&self, metric: Option<&str>) -> Result<Dendrogram> {
        let matrix = self.pairwise_matrix(metric)?;
        GroupClusterer::new(self.config.linkage).cluster(&matrix)
    }

    /// Group analysis, distance table and score in one report.
    pub fn report(&self, mode: Option<ComparisonMode>, metric: Option<&str>) -> Result<FairnessReport> {
        let analysis = self.group_analysis()?;
        let distances = self.distribution_score(mode, metric)?;
        Ok(FairnessReport {
            target: self.target.clone(),
            target_type: analysis.target_type,
            sensitive_attributes: self.sensitive_attributes.clone(),
            analysis,
            distances,
            generated_at: Utc::now(),
        })
    }
}

fn validate_attributes(dataset: &Dataset, target: &str, attributes: &[String]) -> Result<()> {
    for attribute in attributes {
        if attribute == target {
            return Err(FairnessError::invalid_config(format!(
                "target '{target}' cannot also be a sensitive attribute"
            )));
        }
        if !dataset.has_column(attribute) {
            return Err(FairnessError::column_not_found(attribute.as_str()));
        }
    }
    Ok(())
}
