//! Distance tables: one record per group (or group pair) and comparison mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analyzers::DistributionType;
use crate::error::Result;
use crate::groups::{ComparisonMode, RecordLabel};
use crate::metrics::DistanceMetric;
use crate::scorer::{FairnessScore, ScoreAggregator};

/// Result of comparing one group against its reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DistanceOutcome {
    /// A measured, non-negative distance.
    Measured(f64),
    /// The group selected no rows; nothing was measured.
    EmptyGroup,
}

impl DistanceOutcome {
    /// The measured distance, if any.
    pub fn distance(&self) -> Option<f64> {
        match self {
            DistanceOutcome::Measured(d) => Some(*d),
            DistanceOutcome::EmptyGroup => None,
        }
    }
}

impl fmt::Display for DistanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceOutcome::Measured(d) => write!(f, "{d:.4}"),
            DistanceOutcome::EmptyGroup => f.write_str("empty"),
        }
    }
}

/// One row of a distance table: `{label, distance, count}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    /// Group or pair label
    pub label: RecordLabel,
    /// Distance to the reference
    pub outcome: DistanceOutcome,
    /// Aggregation weight: usable target values in the group, or on the
    /// smaller side of a pair. Zero for empty groups.
    pub count: u64,
}

impl DistanceRecord {
    /// A measured record.
    pub fn measured(label: RecordLabel, distance: f64, count: u64) -> Self {
        Self {
            label,
            outcome: DistanceOutcome::Measured(distance),
            count,
        }
    }

    /// A record for a group that selected no rows.
    pub fn empty(label: RecordLabel) -> Self {
        Self {
            label,
            outcome: DistanceOutcome::EmptyGroup,
            count: 0,
        }
    }

    /// The measured distance, if any.
    pub fn distance(&self) -> Option<f64> {
        self.outcome.distance()
    }
}

/// All distance records produced by one comparison mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    /// Target column
    pub target: String,
    /// Semantic type of the target
    pub target_type: DistributionType,
    /// Comparison topology used
    pub mode: ComparisonMode,
    /// Metric used for every record
    pub metric: DistanceMetric,
    /// Records in group (or pair) order
    pub records: Vec<DistanceRecord>,
}

impl DistanceTable {
    /// Aggregates the table into a single score.
    pub fn score(&self) -> Result<FairnessScore> {
        ScoreAggregator::aggregate(&self.records)
    }

    /// Looks up a record by its display label (`"A"` or `"A vs B"`).
    pub fn get(&self, label: &str) -> Option<&DistanceRecord> {
        self.records.iter().find(|r| r.label.to_string() == label)
    }

    /// Records with a measured distance.
    pub fn measured(&self) -> impl Iterator<Item = &DistanceRecord> {
        self.records.iter().filter(|r| r.distance().is_some())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serialization() {
        let measured = serde_json::to_string(&DistanceOutcome::Measured(0.5)).unwrap();
        assert_eq!(measured, r#"{"type":"Measured","value":0.5}"#);
        let empty = serde_json::to_string(&DistanceOutcome::EmptyGroup).unwrap();
        assert_eq!(empty, r#"{"type":"EmptyGroup"}"#);
    }

    #[test]
    fn test_table_lookup() {
        let table = DistanceTable {
            target: "income".to_string(),
            target_type: DistributionType::Categorical,
            mode: ComparisonMode::Pairwise,
            metric: DistanceMetric::Binomial,
            records: vec![
                DistanceRecord::measured(
                    RecordLabel::Pair("A".to_string(), "B".to_string()),
                    0.25,
                    10,
                ),
                DistanceRecord::empty(RecordLabel::Pair("A".to_string(), "C".to_string())),
            ],
        };

        assert_eq!(table.get("A vs B").unwrap().distance(), Some(0.25));
        assert_eq!(table.get("A vs C").unwrap().count, 0);
        assert_eq!(table.measured().count(), 1);
        assert!(table.get("B vs C").is_none());
    }
}
