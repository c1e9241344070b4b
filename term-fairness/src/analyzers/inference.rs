//! Semantic distribution-type classification for target and sensitive columns.
//!
//! The moment and distance engines dispatch on a closed [`DistributionType`].
//! How a column is mapped onto that type is delegated to a [`TypeClassifier`];
//! [`HeuristicClassifier`] is the default, driven by the Arrow data type and the
//! column's cardinality:
//!
//! - exactly two distinct values: categorical (binary), regardless of storage type
//! - floating point and decimal columns: continuous
//! - date and timestamp columns: datetime
//! - integer columns: continuous once the number of distinct values exceeds
//!   `max(min_num_unique, ctl_mult * ln(rows))`, categorical otherwise
//! - everything else (strings, booleans, dictionaries): categorical
//!
//! # Example
//!
//! ```rust,ignore
//! use term_fairness::analyzers::{DistributionType, HeuristicClassifier, TypeClassifier};
//!
//! let classifier = HeuristicClassifier::builder()
//!     .min_num_unique(5)
//!     .build();
//!
//! let column = dataset.column("age")?;
//! assert_eq!(classifier.classify(column.as_ref())?, DistributionType::Continuous);
//! ```

use std::collections::HashSet;
use std::fmt;

use arrow::array::Array;
use arrow::datatypes::DataType;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;

/// The semantic type of a one-dimensional distribution.
///
/// Binary is a special case of `Categorical` with exactly two distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionType {
    /// Real-valued data compared through its moments and empirical CDF.
    Continuous,
    /// Timestamps, compared on the integer nanosecond timeline.
    Datetime,
    /// Discrete labels, compared through category frequencies.
    Categorical,
}

impl DistributionType {
    /// Returns the lowercase type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionType::Continuous => "continuous",
            DistributionType::Datetime => "datetime",
            DistributionType::Categorical => "categorical",
        }
    }

    /// Whether values of this type live on an ordered numeric line.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            DistributionType::Continuous | DistributionType::Datetime
        )
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a column into a [`DistributionType`].
///
/// Implementations must be deterministic: the same column always yields the
/// same type.
pub trait TypeClassifier: Send + Sync {
    /// Infers the semantic type of `column`.
    fn classify(&self, column: &dyn Array) -> Result<DistributionType>;
}

/// Configuration for the heuristic classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Multiplier on `ln(rows)` for the integer cardinality cut-off (default: 2.5)
    pub ctl_mult: f64,
    /// Minimum distinct values before an integer column counts as continuous (default: 10)
    pub min_num_unique: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            ctl_mult: 2.5,
            min_num_unique: 10,
        }
    }
}

impl InferenceConfig {
    /// Distinct-value count an integer column must exceed to be continuous.
    pub fn continuous_threshold(&self, rows: usize) -> f64 {
        let log_rows = if rows > 0 { (rows as f64).ln() } else { 0.0 };
        (self.min_num_unique as f64).max(self.ctl_mult * log_rows)
    }
}

/// Builder for [`HeuristicClassifier`].
pub struct HeuristicClassifierBuilder {
    config: InferenceConfig,
}

impl HeuristicClassifierBuilder {
    /// Set the multiplier applied to `ln(rows)`
    pub fn ctl_mult(mut self, mult: f64) -> Self {
        self.config.ctl_mult = mult;
        self
    }

    /// Set the minimum distinct-value count for continuous integers
    pub fn min_num_unique(mut self, min: usize) -> Self {
        self.config.min_num_unique = min;
        self
    }

    /// Build the classifier
    pub fn build(self) -> HeuristicClassifier {
        HeuristicClassifier {
            config: self.config,
        }
    }
}

/// Default cardinality and storage-type based classifier.
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    config: InferenceConfig,
}

impl HeuristicClassifier {
    /// Create a new builder
    pub fn builder() -> HeuristicClassifierBuilder {
        HeuristicClassifierBuilder {
            config: InferenceConfig::default(),
        }
    }

    /// Create a classifier with default thresholds
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a classifier from an existing configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}

impl TypeClassifier for HeuristicClassifier {
    #[instrument(skip(self, column), fields(data_type = %column.data_type(), rows = column.len()))]
    fn classify(&self, column: &dyn Array) -> Result<DistributionType> {
        let distinct = distinct_count(column)?;

        let inferred = if distinct == 2 {
            DistributionType::Categorical
        } else {
            match column.data_type() {
                DataType::Float16
                | DataType::Float32
                | DataType::Float64
                | DataType::Decimal128(_, _)
                | DataType::Decimal256(_, _) => DistributionType::Continuous,
                DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
                    DistributionType::Datetime
                }
                DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64 => {
                    if distinct as f64 > self.config.continuous_threshold(column.len()) {
                        DistributionType::Continuous
                    } else {
                        DistributionType::Categorical
                    }
                }
                _ => DistributionType::Categorical,
            }
        };

        debug!(distinct, inferred = %inferred, "Classified column");
        Ok(inferred)
    }
}

/// Counts distinct non-null values by their display form.
pub(crate) fn distinct_count(column: &dyn Array) -> Result<usize> {
    let formatter = ArrayFormatter::try_new(column, &FormatOptions::default())?;
    let mut seen = HashSet::new();
    for i in 0..column.len() {
        if column.is_valid(i) {
            seen.insert(formatter.value(i).to_string());
        }
    }
    Ok(seen.len())
}
