//! Symmetric matrices of pairwise group distances.

use serde::{Deserialize, Serialize};

use crate::error::{FairnessError, Result};
use crate::groups::{ComparisonMode, RecordLabel};
use crate::scorer::{DistanceOutcome, DistanceTable};

/// Distances between every pair of groups, indexed in label order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseMatrix {
    labels: Vec<String>,
    distances: Vec<Vec<f64>>,
}

impl PairwiseMatrix {
    /// Validates and wraps a square matrix.
    ///
    /// The matrix must be `labels.len()` square, symmetric, zero on the
    /// diagonal and finite non-negative elsewhere.
    pub fn new(labels: Vec<String>, distances: Vec<Vec<f64>>) -> Result<Self> {
        let n = labels.len();
        if distances.len() != n || distances.iter().any(|row| row.len() != n) {
            return Err(FairnessError::invalid_config(format!(
                "distance matrix must be {n}x{n} to match its labels"
            )));
        }
        for i in 0..n {
            if distances[i][i] != 0.0 {
                return Err(FairnessError::invalid_config(format!(
                    "distance of '{}' to itself must be zero",
                    labels[i]
                )));
            }
            for j in (i + 1)..n {
                let (d, mirror) = (distances[i][j], distances[j][i]);
                if !d.is_finite() || d < 0.0 {
                    return Err(FairnessError::invalid_config(format!(
                        "distance between '{}' and '{}' must be finite and non-negative, got {d}",
                        labels[i], labels[j]
                    )));
                }
                if d != mirror {
                    return Err(FairnessError::invalid_config(format!(
                        "distance matrix is not symmetric at '{}' / '{}'",
                        labels[i], labels[j]
                    )));
                }
            }
        }
        Ok(Self { labels, distances })
    }

    /// Builds the matrix from a pairwise distance table.
    ///
    /// Labels are taken in order of first appearance. Every pair must have a
    /// measured distance; a table holding empty-group records cannot be
    /// clustered.
    pub fn from_table(table: &DistanceTable) -> Result<Self> {
        if table.mode != ComparisonMode::Pairwise {
            return Err(FairnessError::invalid_config(format!(
                "clustering needs a pairwise distance table, got mode '{}'",
                table.mode
            )));
        }

        let mut labels: Vec<String> = Vec::new();
        let mut pairs = Vec::with_capacity(table.records.len());
        for record in &table.records {
            let RecordLabel::Pair(a, b) = &record.label else {
                return Err(FairnessError::internal(format!(
                    "pairwise table holds a single-group record '{}'",
                    record.label
                )));
            };
            let DistanceOutcome::Measured(distance) = record.outcome else {
                return Err(FairnessError::degenerate(format!(
                    "pair '{}' has no measured distance",
                    record.label
                )));
            };
            let i = index_of(&mut labels, a);
            let j = index_of(&mut labels, b);
            pairs.push((i, j, distance));
        }

        let n = labels.len();
        let mut distances = vec![vec![0.0; n]; n];
        let mut seen = vec![vec![false; n]; n];
        for (i, j, distance) in pairs {
            distances[i][j] = distance;
            distances[j][i] = distance;
            seen[i][j] = true;
            seen[j][i] = true;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if !seen[i][j] {
                    return Err(FairnessError::degenerate(format!(
                        "no distance recorded between '{}' and '{}'",
                        labels[i], labels[j]
                    )));
                }
            }
        }

        Self::new(labels, distances)
    }

    /// Group labels, in matrix order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Distance between groups `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    /// The full matrix.
    pub fn distances(&self) -> &[Vec<f64>] {
        &self.distances
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when the matrix has no groups.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn index_of(labels: &mut Vec<String>, label: &str) -> usize {
    match labels.iter().position(|l| l == label) {
        Some(index) => index,
        None => {
            labels.push(label.to_string());
            labels.len() - 1
        }
    }
}
