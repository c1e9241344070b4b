//! First and second moments of a distribution, adapted to its semantic type.
//!
//! | Type        | Mean                                  | Variance                                  |
//! |-------------|---------------------------------------|-------------------------------------------|
//! | Continuous  | first raw moment                      | second central moment (population)        |
//! | Datetime    | `min + mean(offset from min)`         | sample std-dev of the nanosecond timeline |
//! | Categorical | category -> relative frequency        | category -> `n * p * (1 - p)`             |
//!
//! Datetime means are anchored on the minimum so that no sum of absolute epoch
//! values is ever formed. Categorical keys are the observed categories only.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analyzers::{
    Distribution, DistributionType, HeuristicClassifier, MomentValue, TypeClassifier,
};
use crate::dataset::Dataset;
use crate::error::{FairnessError, Result};
use crate::groups::{GroupSpec, PredicatePartitioner};

/// Estimator used for categorical (and binary) distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoricalMode {
    /// Treat category labels as realizations of a multinomial distribution.
    #[default]
    Multinomial,
}

impl CategoricalMode {
    /// Returns the estimator name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoricalMode::Multinomial => "multinomial",
        }
    }
}

impl fmt::Display for CategoricalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoricalMode {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "multinomial" => Ok(CategoricalMode::Multinomial),
            _ => Err(FairnessError::UnsupportedEstimator(s.to_string())),
        }
    }
}

/// Computes type-adapted means and variances.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentEngine {
    categorical_mode: CategoricalMode,
}

impl MomentEngine {
    /// Creates an engine using the given categorical estimator.
    pub fn new(categorical_mode: CategoricalMode) -> Self {
        Self { categorical_mode }
    }

    /// Returns the categorical estimator in use.
    pub fn categorical_mode(&self) -> CategoricalMode {
        self.categorical_mode
    }

    /// Computes the mean (or per-category means) of a distribution.
    pub fn mean(&self, distribution: &Distribution) -> Result<MomentValue> {
        if distribution.is_empty() {
            return Err(FairnessError::empty_distribution("mean of empty distribution"));
        }

        match distribution {
            Distribution::Continuous(values) => Ok(MomentValue::Scalar(real_mean(values))),
            Distribution::Datetime(values) => {
                let min = values.iter().copied().min().unwrap_or_default();
                let offsets: i128 = values.iter().map(|&v| v as i128 - min as i128).sum();
                let mean = min as i128 + offsets / values.len() as i128;
                let mean = i64::try_from(mean).map_err(|_| {
                    FairnessError::internal("datetime mean outside the nanosecond range")
                })?;
                Ok(MomentValue::Timestamp(DateTime::from_timestamp_nanos(mean)))
            }
            Distribution::Categorical(_) => match self.categorical_mode {
                CategoricalMode::Multinomial => {
                    Ok(MomentValue::Categorical(multinomial_means(distribution)))
                }
            },
        }
    }

    /// Computes the variance (or per-category variances) of a distribution.
    ///
    /// For datetime data the returned duration is the sample standard deviation
    /// of the timeline; a single observation has zero spread.
    pub fn variance(&self, distribution: &Distribution) -> Result<MomentValue> {
        if distribution.is_empty() {
            return Err(FairnessError::empty_distribution(
                "variance of empty distribution",
            ));
        }

        match distribution {
            Distribution::Continuous(values) => {
                let mean = real_mean(values);
                let second = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                    / values.len() as f64;
                Ok(MomentValue::Scalar(second))
            }
            Distribution::Datetime(values) => {
                if values.len() < 2 {
                    return Ok(MomentValue::Duration(0));
                }
                let min = values.iter().copied().min().unwrap_or_default();
                let offsets: Vec<f64> = values
                    .iter()
                    .map(|&v| (v as i128 - min as i128) as f64)
                    .collect();
                let mean = real_mean(&offsets);
                let sum_sq = offsets.iter().map(|o| (o - mean).powi(2)).sum::<f64>();
                let std_dev = (sum_sq / (offsets.len() - 1) as f64).sqrt();
                Ok(MomentValue::Duration(std_dev.round() as i64))
            }
            Distribution::Categorical(_) => match self.categorical_mode {
                CategoricalMode::Multinomial => {
                    let n = distribution.len() as f64;
                    let variances = multinomial_means(distribution)
                        .into_iter()
                        .map(|(category, p)| (category, n * p * (1.0 - p)))
                        .collect();
                    Ok(MomentValue::Categorical(variances))
                }
            },
        }
    }
}

fn real_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn multinomial_means(distribution: &Distribution) -> BTreeMap<String, f64> {
    let n = distribution.len() as f64;
    distribution
        .category_counts()
        .into_iter()
        .map(|(category, count)| (category.to_string(), count as f64 / n))
        .collect()
}

/// Moments of the target restricted to one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMoments {
    /// Group label
    pub label: String,
    /// Number of usable target values in the group
    pub count: usize,
    /// Mean (typed per target type)
    pub mean: MomentValue,
    /// Variance (typed per target type)
    pub variance: MomentValue,
}

/// Table of `{label, mean, variance}` rows, one per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAnalysis {
    /// Target column the moments describe
    pub target: String,
    /// Semantic type the target was analyzed as
    pub target_type: DistributionType,
    /// One row per group, in input order
    pub rows: Vec<GroupMoments>,
}

impl GroupAnalysis {
    /// Looks up a row by group label.
    pub fn get(&self, label: &str) -> Option<&GroupMoments> {
        self.rows.iter().find(|row| row.label == label)
    }

    /// Number of groups analyzed.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no groups were analyzed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summarizes the first two moments of the target within each group.
///
/// Uses the default [`HeuristicClassifier`] and the multinomial estimator.
pub fn sensitive_group_analysis(
    dataset: &Dataset,
    target: &str,
    groups: &[GroupSpec],
) -> Result<GroupAnalysis> {
    analyze_groups(
        dataset,
        target,
        groups,
        &HeuristicClassifier::new(),
        MomentEngine::default(),
    )
}

/// Group analysis with an explicit classifier and moment engine.
#[instrument(skip(dataset, groups, classifier, engine), fields(target = %target, groups = groups.len()))]
pub fn analyze_groups(
    dataset: &Dataset,
    target: &str,
    groups: &[GroupSpec],
    classifier: &dyn TypeClassifier,
    engine: MomentEngine,
) -> Result<GroupAnalysis> {
    if groups.is_empty() {
        return Err(FairnessError::NoGroups);
    }

    let column = dataset.column(target)?;
    let target_type = classifier.classify(column.as_ref())?;
    let masks = PredicatePartitioner::new(dataset).partition(groups)?;

    let mut rows = Vec::with_capacity(masks.len());
    for group in &masks {
        let distribution = Distribution::from_masked(column, &group.mask, target_type)?;
        if distribution.is_empty() {
            return Err(FairnessError::empty_distribution(format!(
                "group '{}' has no usable '{target}' values",
                group.label
            )));
        }

        let mean = engine.mean(&distribution)?;
        let variance = engine.variance(&distribution)?;
        debug!(group = %group.label, count = distribution.len(), mean = %mean, "Analyzed group");

        rows.push(GroupMoments {
            label: group.label.clone(),
            count: distribution.len(),
            mean,
            variance,
        });
    }

    Ok(GroupAnalysis {
        target: target.to_string(),
        target_type,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_continuous_moments() {
        let engine = MomentEngine::default();
        let distribution = Distribution::Continuous(vec![1.0, 2.0, 3.0, 4.0]);

        assert_eq!(engine.mean(&distribution).unwrap(), MomentValue::Scalar(2.5));
        // Population variance: ((1.5^2 + 0.5^2) * 2) / 4
        assert_eq!(
            engine.variance(&distribution).unwrap(),
            MomentValue::Scalar(1.25)
        );
    }

    #[test]
    fn test_datetime_mean_anchored_on_minimum() {
        let engine = MomentEngine::default();
        let a = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap();
        let distribution = Distribution::Datetime(vec![
            b.timestamp_nanos_opt().unwrap(),
            a.timestamp_nanos_opt().unwrap(),
        ]);

        let mean = engine.mean(&distribution).unwrap();
        assert_eq!(
            mean.as_timestamp(),
            Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_datetime_spread_is_sample_std() {
        let engine = MomentEngine::default();
        // Offsets 0, 2, 4 seconds: sample std = 2 seconds
        let distribution =
            Distribution::Datetime(vec![0, 2_000_000_000, 4_000_000_000]);
        let spread = engine.variance(&distribution).unwrap();
        assert_eq!(spread.as_duration(), Some(chrono::Duration::seconds(2)));

        let single = Distribution::Datetime(vec![42]);
        assert_eq!(engine.variance(&single).unwrap(), MomentValue::Duration(0));
    }

    #[test]
    fn test_datetime_mean_does_not_overflow() {
        let engine = MomentEngine::default();
        let near_max = i64::MAX - 10;
        let distribution = Distribution::Datetime(vec![near_max, near_max, near_max + 6]);
        let mean = engine.mean(&distribution).unwrap();
        assert_eq!(
            mean.as_timestamp().unwrap().timestamp_nanos_opt(),
            Some(near_max + 2)
        );
    }

    #[test]
    fn test_multinomial_moments() {
        let engine = MomentEngine::default();
        let distribution = Distribution::Categorical(
            ["a", "b", "b", "c"].iter().map(|s| s.to_string()).collect(),
        );

        let means = engine.mean(&distribution).unwrap();
        let means = means.as_categories().unwrap();
        assert_eq!(means.len(), 3);
        assert!((means.values().sum::<f64>() - 1.0).abs() < EPSILON);
        assert_eq!(means["b"], 0.5);

        let variances = engine.variance(&distribution).unwrap();
        let variances = variances.as_categories().unwrap();
        for (category, p) in means {
            assert!((variances[category] - 4.0 * p * (1.0 - p)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_unobserved_categories_absent() {
        let engine = MomentEngine::default();
        let distribution = Distribution::Categorical(vec!["x".to_string(), "x".to_string()]);
        let means = engine.mean(&distribution).unwrap();
        let means = means.as_categories().unwrap();
        assert_eq!(means.keys().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(means["x"], 1.0);
    }

    #[test]
    fn test_empty_distribution_rejected() {
        let engine = MomentEngine::default();
        let empty = Distribution::Continuous(vec![]);
        assert!(matches!(
            engine.mean(&empty),
            Err(FairnessError::EmptyDistribution { .. })
        ));
        assert!(matches!(
            engine.variance(&empty),
            Err(FairnessError::EmptyDistribution { .. })
        ));
    }

    #[test]
    fn test_categorical_mode_parsing() {
        assert_eq!(
            "Multinomial".parse::<CategoricalMode>().unwrap(),
            CategoricalMode::Multinomial
        );
        let err = "dirichlet".parse::<CategoricalMode>().unwrap_err();
        assert!(matches!(err, FairnessError::UnsupportedEstimator(name) if name == "dirichlet"));
    }
}
