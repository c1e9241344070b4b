//! Distances between a group's target distribution and a reference.
//!
//! The [`DistanceEngine`] picks a metric from the target's semantic type
//! unless one is requested explicitly:
//!
//! | Target type             | Default metric             |
//! |-------------------------|----------------------------|
//! | Continuous / Datetime   | Kolmogorov-Smirnov         |
//! | Binary categorical      | Binomial (rate difference) |
//! | Other categorical       | Earth mover's (0/1 ground) |
//!
//! Every metric is symmetric and non-negative.
//!
//! ```rust
//! use term_fairness::analyzers::{Distribution, DistributionType};
//! use term_fairness::metrics::{DistanceEngine, DistanceMetric};
//!
//! let engine = DistanceEngine::default();
//! let a = Distribution::Continuous(vec![1.0, 2.0, 3.0]);
//! let b = Distribution::Continuous(vec![4.0, 5.0, 6.0]);
//!
//! let ks = engine.distance(&a, &b, None, DistributionType::Continuous).unwrap();
//! assert_eq!(ks, 1.0);
//!
//! let emd = engine
//!     .distance(&a, &b, Some(DistanceMetric::EarthMovers), DistributionType::Continuous)
//!     .unwrap();
//! assert!((emd - 3.0).abs() < 1e-9);
//! ```

pub mod ecdf;
pub mod histogram;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::analyzers::{Distribution, DistributionType};
use crate::error::{FairnessError, Result};

pub use histogram::{AlignedFrequencies, SharedBins};

/// Supported distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Absolute difference of the positive-class rate (binary targets only).
    Binomial,
    /// Maximum gap between empirical CDFs (ordered targets only).
    KolmogorovSmirnov,
    /// Wasserstein-1 on ordered targets, total variation on categories.
    EarthMovers,
    /// Hellinger distance between category or histogram frequencies.
    Hellinger,
    /// Jensen-Shannon divergence (base 2) between category or histogram frequencies.
    JensenShannon,
}

impl DistanceMetric {
    /// All metrics, in declaration order.
    pub const ALL: [DistanceMetric; 5] = [
        DistanceMetric::Binomial,
        DistanceMetric::KolmogorovSmirnov,
        DistanceMetric::EarthMovers,
        DistanceMetric::Hellinger,
        DistanceMetric::JensenShannon,
    ];

    /// Parses a metric name or one of its aliases, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "binomial" | "binomial_distance" => Some(DistanceMetric::Binomial),
            "kolmogorov_smirnov" | "ks" | "ks_distance" => Some(DistanceMetric::KolmogorovSmirnov),
            "earth_movers" | "emd" | "wasserstein" => Some(DistanceMetric::EarthMovers),
            "hellinger" | "hellinger_distance" => Some(DistanceMetric::Hellinger),
            "jensen_shannon" | "js_divergence" | "js" => Some(DistanceMetric::JensenShannon),
            _ => None,
        }
    }

    /// Canonical metric name.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Binomial => "binomial",
            DistanceMetric::KolmogorovSmirnov => "kolmogorov_smirnov",
            DistanceMetric::EarthMovers => "earth_movers",
            DistanceMetric::Hellinger => "hellinger",
            DistanceMetric::JensenShannon => "jensen_shannon",
        }
    }

    /// The metric used when none is requested.
    pub fn default_for(target_type: DistributionType, binary: bool) -> Self {
        match target_type {
            DistributionType::Continuous | DistributionType::Datetime => {
                DistanceMetric::KolmogorovSmirnov
            }
            DistributionType::Categorical if binary => DistanceMetric::Binomial,
            DistributionType::Categorical => DistanceMetric::EarthMovers,
        }
    }

    /// Whether the metric is defined for the target's type.
    ///
    /// `binary` only matters for categorical targets.
    pub fn supports(&self, target_type: DistributionType, binary: bool) -> bool {
        match self {
            DistanceMetric::Binomial => target_type == DistributionType::Categorical && binary,
            DistanceMetric::KolmogorovSmirnov => target_type.is_ordered(),
            DistanceMetric::EarthMovers
            | DistanceMetric::Hellinger
            | DistanceMetric::JensenShannon => true,
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Computes distances between two distributions of the same target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistanceEngine {
    histogram_bins: Option<usize>,
}

impl DistanceEngine {
    /// Creates an engine. `histogram_bins` fixes the bin count used by
    /// histogram metrics on ordered data; `None` applies Sturges' rule.
    pub fn new(histogram_bins: Option<usize>) -> Self {
        Self { histogram_bins }
    }

    /// Bin count override, if any.
    pub fn histogram_bins(&self) -> Option<usize> {
        self.histogram_bins
    }

    /// Parses an optional metric name for a target type.
    ///
    /// Unknown names, and names whose metric can never apply to the type,
    /// fail with [`FairnessError::UnsupportedMetric`].
    pub fn resolve_metric(
        name: Option<&str>,
        target_type: DistributionType,
    ) -> Result<Option<DistanceMetric>> {
        let Some(name) = name else {
            return Ok(None);
        };
        let metric = DistanceMetric::from_name(name)
            .ok_or_else(|| FairnessError::unsupported_metric(name, target_type))?;
        // Binary-ness is only known per comparison; assume it may hold.
        if !metric.supports(target_type, true) {
            return Err(FairnessError::unsupported_metric(name, target_type));
        }
        Ok(Some(metric))
    }

    /// The metric a comparison of `a` and `b` will use.
    pub fn select_metric(
        &self,
        a: &Distribution,
        b: &Distribution,
        metric: Option<DistanceMetric>,
        target_type: DistributionType,
    ) -> Result<DistanceMetric> {
        let binary = is_binary(a, b);
        let metric = metric.unwrap_or_else(|| DistanceMetric::default_for(target_type, binary));
        if !metric.supports(target_type, binary) {
            return Err(FairnessError::unsupported_metric(metric.name(), target_type));
        }
        Ok(metric)
    }

    /// Distance between `a` and `b` under `metric` (or the type's default).
    ///
    /// Both distributions must be non-empty and of `target_type`, and ordered
    /// values must be finite.
    pub fn distance(
        &self,
        a: &Distribution,
        b: &Distribution,
        metric: Option<DistanceMetric>,
        target_type: DistributionType,
    ) -> Result<f64> {
        if a.is_empty() || b.is_empty() {
            return Err(FairnessError::empty_distribution(
                "distance requires two non-empty distributions",
            ));
        }
        if a.distribution_type() != target_type || b.distribution_type() != target_type {
            return Err(FairnessError::internal(format!(
                "distance between {} and {} distributions requested as {target_type}",
                a.distribution_type(),
                b.distribution_type()
            )));
        }

        let metric = self.select_metric(a, b, metric, target_type)?;
        let distance = match (a.as_reals(), b.as_reals()) {
            (Some(x), Some(y)) => {
                if x.iter().chain(&y).any(|v| !v.is_finite()) {
                    return Err(FairnessError::internal(format!(
                        "{metric} requires finite values"
                    )));
                }
                self.ordered_distance(&x, &y, metric, target_type)?
            }
            _ => categorical_distance(a, b, metric, target_type)?,
        };
        if !distance.is_finite() {
            return Err(FairnessError::internal(format!(
                "{metric} produced non-finite distance {distance}"
            )));
        }

        trace!(metric = %metric, distance, "Computed distance");
        Ok(distance.max(0.0))
    }

    fn ordered_distance(
        &self,
        a: &[f64],
        b: &[f64],
        metric: DistanceMetric,
        target_type: DistributionType,
    ) -> Result<f64> {
        Ok(match metric {
            DistanceMetric::KolmogorovSmirnov => ecdf::kolmogorov_smirnov(a, b),
            DistanceMetric::EarthMovers => ecdf::wasserstein(a, b),
            DistanceMetric::Hellinger | DistanceMetric::JensenShannon => {
                let bins = SharedBins::spanning(a, b, self.histogram_bins);
                let (p, q) = (bins.frequencies(a), bins.frequencies(b));
                if metric == DistanceMetric::Hellinger {
                    histogram::hellinger(&p, &q)
                } else {
                    histogram::jensen_shannon(&p, &q)
                }
            }
            DistanceMetric::Binomial => {
                return Err(FairnessError::unsupported_metric(metric.name(), target_type))
            }
        })
    }
}

fn categorical_distance(
    a: &Distribution,
    b: &Distribution,
    metric: DistanceMetric,
    target_type: DistributionType,
) -> Result<f64> {
    let aligned = AlignedFrequencies::of(a, b);
    Ok(match metric {
        // Rate of the last category in sorted order ("1", "true", "yes", ...)
        DistanceMetric::Binomial => match (aligned.p.last(), aligned.q.last()) {
            (Some(p), Some(q)) => (p - q).abs(),
            _ => 0.0,
        },
        DistanceMetric::EarthMovers => histogram::total_variation(&aligned.p, &aligned.q),
        DistanceMetric::Hellinger => histogram::hellinger(&aligned.p, &aligned.q),
        DistanceMetric::JensenShannon => histogram::jensen_shannon(&aligned.p, &aligned.q),
        DistanceMetric::KolmogorovSmirnov => {
            return Err(FairnessError::unsupported_metric(metric.name(), target_type))
        }
    })
}

/// Binary when at most two categories occur across both samples.
fn is_binary(a: &Distribution, b: &Distribution) -> bool {
    match (a, b) {
        (Distribution::Categorical(_), Distribution::Categorical(_)) => {
            let mut categories: Vec<&str> = a.category_counts().into_keys().collect();
            categories.extend(b.category_counts().into_keys());
            categories.sort_unstable();
            categories.dedup();
            categories.len() <= 2
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    fn labels(values: &[&str]) -> Distribution {
        Distribution::Categorical(values.iter().map(|s| s.to_string()).collect())
    }

    fn rate(positives: usize, n: usize) -> Distribution {
        Distribution::Categorical(
            (0..n)
                .map(|i| if i < positives { "1" } else { "0" }.to_string())
                .collect(),
        )
    }

    #[test]
    fn test_metric_names_and_aliases() {
        for metric in DistanceMetric::ALL {
            assert_eq!(DistanceMetric::from_name(metric.name()), Some(metric));
        }
        assert_eq!(
            DistanceMetric::from_name("KS_Distance"),
            Some(DistanceMetric::KolmogorovSmirnov)
        );
        assert_eq!(DistanceMetric::from_name("emd"), Some(DistanceMetric::EarthMovers));
        assert_eq!(
            DistanceMetric::from_name("js_divergence"),
            Some(DistanceMetric::JensenShannon)
        );
        assert_eq!(DistanceMetric::from_name("cosine"), None);
    }

    #[test]
    fn test_default_metric_by_type() {
        let engine = DistanceEngine::default();
        let binary = engine
            .select_metric(&rate(2, 10), &rate(8, 10), None, DistributionType::Categorical)
            .unwrap();
        assert_eq!(binary, DistanceMetric::Binomial);

        let multi = engine
            .select_metric(&labels(&["a", "b"]), &labels(&["c"]), None, DistributionType::Categorical)
            .unwrap();
        assert_eq!(multi, DistanceMetric::EarthMovers);

        let ordered = Distribution::Continuous(vec![1.0]);
        assert_eq!(
            engine
                .select_metric(&ordered, &ordered, None, DistributionType::Continuous)
                .unwrap(),
            DistanceMetric::KolmogorovSmirnov
        );
    }

    #[test]
    fn test_binomial_rate_difference() {
        let engine = DistanceEngine::default();
        let d = engine
            .distance(&rate(20, 100), &rate(80, 100), None, DistributionType::Categorical)
            .unwrap();
        assert!((d - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_binomial_rejected_for_multiclass_and_continuous() {
        let engine = DistanceEngine::default();
        let err = engine
            .distance(
                &labels(&["a", "b"]),
                &labels(&["c"]),
                Some(DistanceMetric::Binomial),
                DistributionType::Categorical,
            )
            .unwrap_err();
        assert!(matches!(err, FairnessError::UnsupportedMetric { .. }));

        let err = DistanceEngine::resolve_metric(Some("binomial"), DistributionType::Continuous)
            .unwrap_err();
        assert!(matches!(err, FairnessError::UnsupportedMetric { .. }));
    }

    #[test]
    fn test_unknown_metric_name() {
        let err = DistanceEngine::resolve_metric(Some("cosine"), DistributionType::Categorical)
            .unwrap_err();
        assert!(
            matches!(err, FairnessError::UnsupportedMetric { ref metric, .. } if metric == "cosine")
        );
        assert_eq!(
            DistanceEngine::resolve_metric(None, DistributionType::Categorical).unwrap(),
            None
        );
    }

    #[test]
    fn test_ks_rejected_for_categorical() {
        let err = DistanceEngine::resolve_metric(Some("ks"), DistributionType::Categorical)
            .unwrap_err();
        assert!(matches!(err, FairnessError::UnsupportedMetric { .. }));
    }

    #[test]
    fn test_categorical_earth_movers_is_total_variation() {
        let engine = DistanceEngine::default();
        let d = engine
            .distance(
                &labels(&["a", "a", "b", "c"]),
                &labels(&["a", "b", "b", "b"]),
                None,
                DistributionType::Categorical,
            )
            .unwrap();
        // |0.5-0.25| + |0.25-0.75| + |0.25-0| = 1.0, halved
        assert!((d - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_histogram_metrics_on_continuous() {
        let engine = DistanceEngine::new(Some(2));
        let a = Distribution::Continuous(vec![0.0, 0.1, 0.2]);
        let b = Distribution::Continuous(vec![0.9, 1.0]);
        let hellinger = engine
            .distance(&a, &b, Some(DistanceMetric::Hellinger), DistributionType::Continuous)
            .unwrap();
        let js = engine
            .distance(&a, &b, Some(DistanceMetric::JensenShannon), DistributionType::Continuous)
            .unwrap();
        assert!((hellinger - 1.0).abs() < EPSILON);
        assert!((js - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_datetime_distance() {
        let engine = DistanceEngine::default();
        let day = 86_400_000_000_000i64;
        let a = Distribution::Datetime(vec![0, day, 2 * day]);
        let b = Distribution::Datetime(vec![10 * day, 11 * day]);
        let d = engine.distance(&a, &b, None, DistributionType::Datetime).unwrap();
        assert_eq!(d, 1.0);
    }

    #[test]
    fn test_symmetry_and_identity() {
        let engine = DistanceEngine::default();
        let a = labels(&["x", "y", "y", "z"]);
        let b = labels(&["y", "z", "z"]);
        for metric in [
            DistanceMetric::EarthMovers,
            DistanceMetric::Hellinger,
            DistanceMetric::JensenShannon,
        ] {
            let ab = engine
                .distance(&a, &b, Some(metric), DistributionType::Categorical)
                .unwrap();
            let ba = engine
                .distance(&b, &a, Some(metric), DistributionType::Categorical)
                .unwrap();
            assert!((ab - ba).abs() < EPSILON, "{metric} not symmetric");
            assert!(ab > 0.0);
            assert_eq!(
                engine
                    .distance(&a, &a, Some(metric), DistributionType::Categorical)
                    .unwrap(),
                0.0
            );
        }
    }

    #[test]
    fn test_empty_side_rejected() {
        let engine = DistanceEngine::default();
        let err = engine
            .distance(
                &Distribution::Continuous(vec![]),
                &Distribution::Continuous(vec![1.0]),
                None,
                DistributionType::Continuous,
            )
            .unwrap_err();
        assert!(matches!(err, FairnessError::EmptyDistribution { .. }));
    }

    #[test]
    fn test_infinite_values_rejected() {
        let engine = DistanceEngine::default();
        let a = Distribution::Continuous(vec![0.0, 1.0, f64::INFINITY]);
        let b = Distribution::Continuous(vec![100.0, 200.0, f64::INFINITY]);

        for metric in [
            DistanceMetric::KolmogorovSmirnov,
            DistanceMetric::EarthMovers,
            DistanceMetric::Hellinger,
            DistanceMetric::JensenShannon,
        ] {
            let err = engine
                .distance(&a, &b, Some(metric), DistributionType::Continuous)
                .unwrap_err();
            assert!(matches!(err, FairnessError::Internal(_)), "{metric} accepted infinity");
        }
    }
}
