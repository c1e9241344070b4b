//! Agglomerative clustering of sensitive groups by their pairwise distances.
//!
//! Starting from one cluster per group, the two closest clusters are merged
//! until a single cluster remains. Inter-cluster distances are updated with
//! the Lance-Williams recurrence of the chosen [`LinkageMethod`].
//!
//! Ties are broken deterministically: among equally close cluster pairs, the
//! pair with the lexicographically smallest `(smaller id, larger id)` merges
//! first, where leaves are numbered in label order and merged clusters by
//! creation.
//!
//! ```rust
//! use term_fairness::cluster::{GroupClusterer, PairwiseMatrix};
//!
//! let matrix = PairwiseMatrix::new(
//!     vec!["A".into(), "B".into(), "C".into()],
//!     vec![
//!         vec![0.0, 0.9, 0.1],
//!         vec![0.9, 0.0, 0.8],
//!         vec![0.1, 0.8, 0.0],
//!     ],
//! )
//! .unwrap();
//!
//! let dendrogram = GroupClusterer::default().cluster(&matrix).unwrap();
//! let first = dendrogram.merges()[0];
//! assert_eq!((first.left, first.right), (0, 2));
//! ```

pub mod dendrogram;
pub mod matrix;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{FairnessError, Result};

pub use dendrogram::{Dendrogram, DendrogramNode, Merge};
pub use matrix::PairwiseMatrix;

/// Rule for the distance between two clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageMethod {
    /// Minimum distance between members.
    Single,
    /// Maximum distance between members.
    Complete,
    /// Mean distance over all member pairs (UPGMA).
    #[default]
    Average,
    /// Mean of the two merged clusters' distances (WPGMA).
    Weighted,
}

impl LinkageMethod {
    /// Returns the linkage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkageMethod::Single => "single",
            LinkageMethod::Complete => "complete",
            LinkageMethod::Average => "average",
            LinkageMethod::Weighted => "weighted",
        }
    }

    /// Distance from the merge of `i` (size `n_i`) and `j` (size `n_j`) to `k`.
    fn update(&self, d_ik: f64, d_jk: f64, n_i: usize, n_j: usize) -> f64 {
        match self {
            LinkageMethod::Single => d_ik.min(d_jk),
            LinkageMethod::Complete => d_ik.max(d_jk),
            LinkageMethod::Average => {
                (n_i as f64 * d_ik + n_j as f64 * d_jk) / (n_i + n_j) as f64
            }
            LinkageMethod::Weighted => 0.5 * (d_ik + d_jk),
        }
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkageMethod {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(LinkageMethod::Single),
            "complete" => Ok(LinkageMethod::Complete),
            "average" => Ok(LinkageMethod::Average),
            "weighted" => Ok(LinkageMethod::Weighted),
            other => Err(FairnessError::invalid_config(format!(
                "unknown linkage '{other}', expected one of: single, complete, average, weighted"
            ))),
        }
    }
}

/// Builds dendrograms from pairwise group distances.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupClusterer {
    linkage: LinkageMethod,
}

impl GroupClusterer {
    /// Creates a clusterer with the given linkage rule.
    pub fn new(linkage: LinkageMethod) -> Self {
        Self { linkage }
    }

    /// Linkage rule in use.
    pub fn linkage(&self) -> LinkageMethod {
        self.linkage
    }

    /// Clusters the groups of `matrix`. Needs at least two groups.
    #[instrument(skip(self, matrix), fields(groups = matrix.len(), linkage = %self.linkage))]
    pub fn cluster(&self, matrix: &PairwiseMatrix) -> Result<Dendrogram> {
        let n = matrix.len();
        if n < 2 {
            return Err(FairnessError::degenerate(format!(
                "clustering needs at least two groups, got {n}"
            )));
        }

        // Slot `s` holds the cluster `ids[s]`; merged slots are deactivated.
        let mut distances: Vec<Vec<f64>> = matrix.distances().to_vec();
        let mut ids: Vec<usize> = (0..n).collect();
        let mut sizes = vec![1usize; n];
        let mut active = vec![true; n];
        let mut merges = Vec::with_capacity(n - 1);

        for step in 0..n - 1 {
            let (a, b) = self.closest_pair(&distances, &ids, &active)?;
            let distance = distances[a][b];
            let (n_a, n_b) = (sizes[a], sizes[b]);

            for k in 0..n {
                if active[k] && k != a && k != b {
                    let updated = self.linkage.update(distances[a][k], distances[b][k], n_a, n_b);
                    distances[a][k] = updated;
                    distances[k][a] = updated;
                }
            }

            let (left, right) = (ids[a].min(ids[b]), ids[a].max(ids[b]));
            merges.push(Merge {
                left,
                right,
                distance,
                size: n_a + n_b,
            });
            debug!(step, left, right, distance, "Merged clusters");

            ids[a] = n + step;
            sizes[a] = n_a + n_b;
            active[b] = false;
        }

        Ok(Dendrogram::new(matrix.labels().to_vec(), merges, self.linkage))
    }

    fn closest_pair(
        &self,
        distances: &[Vec<f64>],
        ids: &[usize],
        active: &[bool],
    ) -> Result<(usize, usize)> {
        let mut best: Option<(f64, (usize, usize), (usize, usize))> = None;
        for a in 0..distances.len() {
            if !active[a] {
                continue;
            }
            for b in (a + 1)..distances.len() {
                if !active[b] {
                    continue;
                }
                let d = distances[a][b];
                let key = (ids[a].min(ids[b]), ids[a].max(ids[b]));
                let better = match best {
                    None => true,
                    Some((best_d, best_key, _)) => d < best_d || (d == best_d && key < best_key),
                };
                if better {
                    best = Some((d, key, (a, b)));
                }
            }
        }
        best.map(|(_, _, slots)| slots)
            .ok_or_else(|| FairnessError::internal("no active cluster pair left to merge"))
    }
}
