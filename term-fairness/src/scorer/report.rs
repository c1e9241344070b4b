//! Combined output of a fairness audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzers::{DistributionType, GroupAnalysis};
use crate::groups::ComparisonMode;
use crate::metrics::DistanceMetric;
use crate::scorer::{DistanceTable, DistributionScore, FairnessScore};

/// Group moments, distances and the aggregated score for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    /// Target column
    pub target: String,
    /// Semantic type of the target
    pub target_type: DistributionType,
    /// Sensitive attributes the groups were derived from
    pub sensitive_attributes: Vec<String>,
    /// Per-group moments of the target
    pub analysis: GroupAnalysis,
    /// Distances and their aggregate
    pub distances: DistributionScore,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl FairnessReport {
    /// The aggregated score.
    pub fn score(&self) -> &FairnessScore {
        &self.distances.score
    }

    /// The distance table.
    pub fn table(&self) -> &DistanceTable {
        &self.distances.table
    }

    /// Comparison mode of the distance table.
    pub fn mode(&self) -> ComparisonMode {
        self.distances.table.mode
    }

    /// Metric of the distance table.
    pub fn metric(&self) -> DistanceMetric {
        self.distances.table.metric
    }
}
