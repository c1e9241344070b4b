//! Count-weighted reduction of distance records into one fairness score.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{FairnessError, Result};
use crate::scorer::{DistanceRecord, DistanceTable};

/// A weighted mean of distances, together with the exact terms it was derived from.
///
/// The identity `score * total_count == sum(distance_i * count_i)` holds
/// exactly by construction for the stored terms: `weighted_distance` is that
/// sum, accumulated in record order, and `total_count` is the integer sum of
/// counts. `value` is their quotient, so multiplying it back reproduces
/// `weighted_distance` exactly whenever the division is exact (for example
/// distances and counts that are small binary fractions and integers) and
/// otherwise up to the rounding of that single division.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessScore {
    /// The score: count-weighted mean distance, `>= 0`
    pub value: f64,
    /// `sum(distance_i * count_i)` over the aggregated records
    pub weighted_distance: f64,
    /// `sum(count_i)` over the aggregated records
    pub total_count: u64,
    /// Number of records that contributed
    pub groups: usize,
}

impl FairnessScore {
    /// True when every contributing distance was zero.
    pub fn is_zero(&self) -> bool {
        self.weighted_distance == 0.0
    }
}

impl fmt::Display for FairnessScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.value)
    }
}

/// Reduces distance records to a [`FairnessScore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    /// `score = sum(d_i * c_i) / sum(c_i)` over measured records with `c_i > 0`.
    ///
    /// Empty-group records carry no weight. A slice with no weighted record
    /// fails with [`FairnessError::NoGroups`].
    #[instrument(skip(records), fields(records = records.len()))]
    pub fn aggregate(records: &[DistanceRecord]) -> Result<FairnessScore> {
        let mut weighted_distance = 0.0;
        let mut total_count = 0u64;
        let mut groups = 0;

        for record in records {
            let Some(distance) = record.distance() else {
                continue;
            };
            if record.count == 0 {
                continue;
            }
            if !distance.is_finite() || distance < 0.0 {
                return Err(FairnessError::internal(format!(
                    "record '{}' has invalid distance {distance}",
                    record.label
                )));
            }
            weighted_distance += distance * record.count as f64;
            total_count += record.count;
            groups += 1;
        }

        if total_count == 0 {
            return Err(FairnessError::NoGroups);
        }

        Ok(FairnessScore {
            value: weighted_distance / total_count as f64,
            weighted_distance,
            total_count,
            groups,
        })
    }
}

/// Scores a distance table.
pub fn calculate_score(table: &DistanceTable) -> Result<FairnessScore> {
    ScoreAggregator::aggregate(&table.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::RecordLabel;

    fn record(label: &str, distance: f64, count: u64) -> DistanceRecord {
        DistanceRecord::measured(RecordLabel::Group(label.to_string()), distance, count)
    }

    #[test]
    fn test_weighted_mean() {
        let records = vec![record("A", 0.2, 30), record("B", 0.5, 10)];
        let score = ScoreAggregator::aggregate(&records).unwrap();

        assert_eq!(score.total_count, 40);
        assert_eq!(score.groups, 2);
        assert_eq!(score.weighted_distance, 0.2 * 30.0 + 0.5 * 10.0);
        assert!((score.value - 0.275).abs() < 1e-12);
    }

    #[test]
    fn test_empty_groups_carry_no_weight() {
        let records = vec![
            record("A", 0.4, 5),
            DistanceRecord::empty(RecordLabel::Group("Z".to_string())),
        ];
        let score = ScoreAggregator::aggregate(&records).unwrap();
        assert_eq!(score.value, 0.4);
        assert_eq!(score.groups, 1);
    }

    #[test]
    fn test_no_weighted_records() {
        assert!(matches!(
            ScoreAggregator::aggregate(&[]),
            Err(FairnessError::NoGroups)
        ));
        let only_empty = vec![DistanceRecord::empty(RecordLabel::Group("Z".to_string()))];
        assert!(matches!(
            ScoreAggregator::aggregate(&only_empty),
            Err(FairnessError::NoGroups)
        ));
    }

    #[test]
    fn test_zero_iff_all_distances_zero() {
        let zero = ScoreAggregator::aggregate(&[record("A", 0.0, 3), record("B", 0.0, 9)]).unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero.value, 0.0);

        let positive =
            ScoreAggregator::aggregate(&[record("A", 0.0, 3), record("B", 1e-9, 1)]).unwrap();
        assert!(positive.value > 0.0);
    }

    #[test]
    fn test_invalid_distance_rejected() {
        let err = ScoreAggregator::aggregate(&[record("A", f64::NAN, 3)]).unwrap_err();
        assert!(matches!(err, FairnessError::Internal(_)));
    }
}
