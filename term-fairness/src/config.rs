//! Configuration for fairness scoring runs.
//!
//! [`ScorerConfig`] collects every knob of a [`FairnessScorer`](crate::scorer::FairnessScorer)
//! and round-trips through JSON:
//!
//! ```rust
//! use term_fairness::config::ScorerConfig;
//! use term_fairness::groups::ComparisonMode;
//!
//! let config = ScorerConfig::from_json(r#"{"mode": "pairwise", "metric": "hellinger"}"#).unwrap();
//! assert_eq!(config.mode, ComparisonMode::Pairwise);
//! assert_eq!(config.sensitive_bins, 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::analyzers::{CategoricalMode, InferenceConfig};
use crate::cluster::LinkageMethod;
use crate::error::{FairnessError, Result};
use crate::groups::ComparisonMode;
use crate::metrics::DistanceMetric;

/// Settings shared by group analysis, distance scoring and clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Default comparison topology
    pub mode: ComparisonMode,
    /// Metric name; `None` picks one from the target type
    pub metric: Option<String>,
    /// Estimator for categorical moments
    pub categorical_mode: CategoricalMode,
    /// Linkage rule for dendrograms
    pub linkage: LinkageMethod,
    /// Fixed bin count for histogram metrics on ordered targets
    pub histogram_bins: Option<usize>,
    /// Number of equal-frequency bands for continuous sensitive attributes
    pub sensitive_bins: usize,
    /// Thresholds of the default type classifier
    pub inference: InferenceConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            mode: ComparisonMode::Rest,
            metric: None,
            categorical_mode: CategoricalMode::Multinomial,
            linkage: LinkageMethod::Average,
            histogram_bins: None,
            sensitive_bins: 5,
            inference: InferenceConfig::default(),
        }
    }
}

impl ScorerConfig {
    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks value ranges and the metric name.
    pub fn validate(&self) -> Result<()> {
        if let Some(metric) = &self.metric {
            if DistanceMetric::from_name(metric).is_none() {
                return Err(FairnessError::invalid_config(format!(
                    "unknown metric '{metric}'"
                )));
            }
        }
        if self.histogram_bins == Some(0) {
            return Err(FairnessError::invalid_config(
                "histogram_bins must be at least 1",
            ));
        }
        if self.sensitive_bins == 0 {
            return Err(FairnessError::invalid_config(
                "sensitive_bins must be at least 1",
            ));
        }
        if !(self.inference.ctl_mult.is_finite() && self.inference.ctl_mult >= 0.0) {
            return Err(FairnessError::invalid_config(
                "inference.ctl_mult must be a finite non-negative number",
            ));
        }
        Ok(())
    }

    /// Sets the comparison mode.
    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the metric by name.
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    /// Sets the categorical estimator.
    pub fn with_categorical_mode(mut self, mode: CategoricalMode) -> Self {
        self.categorical_mode = mode;
        self
    }

    /// Sets the linkage rule.
    pub fn with_linkage(mut self, linkage: LinkageMethod) -> Self {
        self.linkage = linkage;
        self
    }

    /// Fixes the histogram bin count.
    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Sets the number of bands for continuous sensitive attributes.
    pub fn with_sensitive_bins(mut self, bins: usize) -> Self {
        self.sensitive_bins = bins;
        self
    }

    /// Sets the classifier thresholds.
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScorerConfig::default();
        assert_eq!(config.mode, ComparisonMode::Rest);
        assert_eq!(config.metric, None);
        assert_eq!(config.linkage, LinkageMethod::Average);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = ScorerConfig::default()
            .with_mode(ComparisonMode::All)
            .with_metric("emd")
            .with_histogram_bins(12);
        let parsed = ScorerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ScorerConfig::from_json(r#"{"linkage": "single", "inference": {"ctl_mult": 1.0, "min_num_unique": 3}}"#)
            .unwrap();
        assert_eq!(config.linkage, LinkageMethod::Single);
        assert_eq!(config.inference.min_num_unique, 3);
        assert_eq!(config.mode, ComparisonMode::Rest);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            ScorerConfig::default().with_metric("cosine").validate(),
            Err(FairnessError::InvalidConfiguration(_))
        ));
        assert!(ScorerConfig::default().with_histogram_bins(0).validate().is_err());
        assert!(ScorerConfig::default().with_sensitive_bins(0).validate().is_err());
        assert!(matches!(
            ScorerConfig::from_json(r#"{"mode": "others"}"#),
            Err(FairnessError::Serialization(_))
        ));
        assert!(matches!(
            ScorerConfig::from_json(r#"{"categorical_mode": "dirichlet"}"#),
            Err(FairnessError::Serialization(_))
        ));
    }
}
