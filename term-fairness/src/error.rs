//! Error types for the term-fairness library.
//!
//! Every fallible operation in the crate returns [`FairnessError`] through the
//! [`Result`] alias. All failures are surfaced to the caller; no statistic is
//! silently downgraded to `NaN`.

use thiserror::Error;

use crate::analyzers::DistributionType;

/// The main error type for fairness analysis.
#[derive(Error, Debug)]
pub enum FairnessError {
    /// The distribution had no usable (non-missing) values.
    #[error("Empty distribution: {context}")]
    EmptyDistribution {
        /// What was being computed when the emptiness was detected
        context: String,
    },

    /// A pre-built row selector does not match the dataset's row count.
    #[error("Mask length mismatch for group '{group}': expected {expected} rows, found {actual}")]
    MaskLengthMismatch {
        /// Label of the offending group
        group: String,
        /// Row count of the dataset
        expected: usize,
        /// Length of the selector
        actual: usize,
    },

    /// The metric name is unknown, or undefined for the target's type.
    #[error("Unsupported metric '{metric}' for {distribution_type} distributions")]
    UnsupportedMetric {
        /// The requested metric name
        metric: String,
        /// The semantic type of the target column
        distribution_type: DistributionType,
    },

    /// The categorical estimator mode is not implemented.
    #[error("Unsupported categorical estimator '{0}'")]
    UnsupportedEstimator(String),

    /// A comparison that cannot produce a meaningful distance.
    #[error("Degenerate comparison: {0}")]
    DegenerateComparison(String),

    /// No groups were supplied, or none of them selected any rows.
    #[error("No groups to score")]
    NoGroups,

    /// A required column is not present in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound {
        /// Name of the missing column
        column: String,
    },

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error from Arrow compute kernels or array construction.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, FairnessError>`.
pub type Result<T> = std::result::Result<T, FairnessError>;

impl FairnessError {
    /// Creates an empty distribution error.
    pub fn empty_distribution(context: impl Into<String>) -> Self {
        Self::EmptyDistribution {
            context: context.into(),
        }
    }

    /// Creates a degenerate comparison error.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateComparison(msg.into())
    }

    /// Creates an unsupported metric error.
    pub fn unsupported_metric(metric: impl Into<String>, distribution_type: DistributionType) -> Self {
        Self::UnsupportedMetric {
            metric: metric.into(),
            distribution_type,
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<serde_json::Error> for FairnessError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for FairnessError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Internal(format!("Failed to format output: {err}"))
    }
}
