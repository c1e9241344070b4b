//! Prelude for commonly used types and traits in term-fairness.

pub use crate::analyzers::{
    sensitive_group_analysis, CategoricalMode, DistributionType, GroupAnalysis, MomentValue,
    TypeClassifier,
};
pub use crate::cluster::{Dendrogram, GroupClusterer, LinkageMethod, PairwiseMatrix};
pub use crate::config::ScorerConfig;
pub use crate::dataset::Dataset;
pub use crate::error::{FairnessError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::groups::{ComparisonMode, GroupPredicate, GroupSpec};
pub use crate::logging::LogConfig;
pub use crate::metrics::DistanceMetric;
pub use crate::scorer::{
    calculate_score, distribution_score, DistanceTable, FairnessReport, FairnessScore,
    FairnessScorer,
};
