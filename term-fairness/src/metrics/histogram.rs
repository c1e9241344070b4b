//! Probability vectors over shared supports, and distances between them.
//!
//! Categorical samples are aligned on the union of their observed categories;
//! ordered samples are binned on shared, equal-width edges spanning both.

use std::collections::BTreeSet;

use crate::analyzers::Distribution;

/// Equal-width bins spanning `[lo, lo + width * bins]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedBins {
    /// Lower edge of the first bin
    pub lo: f64,
    /// Width of every bin (zero for constant data)
    pub width: f64,
    /// Number of bins
    pub bins: usize,
}

impl SharedBins {
    /// Bins covering both samples. Without an explicit count, Sturges' rule
    /// on the combined size is used.
    pub fn spanning(a: &[f64], b: &[f64], bins: Option<usize>) -> Self {
        let (lo, hi) = a
            .iter()
            .chain(b.iter())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        let bins = bins
            .unwrap_or_else(|| sturges(a.len() + b.len()))
            .max(1);
        let width = if hi > lo { (hi - lo) / bins as f64 } else { 0.0 };
        Self { lo, width, bins }
    }

    /// Relative frequency of `values` in each bin.
    pub fn frequencies(&self, values: &[f64]) -> Vec<f64> {
        let mut counts = vec![0usize; self.bins];
        for &x in values {
            let index = if self.width > 0.0 {
                (((x - self.lo) / self.width).floor() as usize).min(self.bins - 1)
            } else {
                0
            };
            counts[index] += 1;
        }
        let n = values.len() as f64;
        counts.into_iter().map(|c| c as f64 / n).collect()
    }
}

fn sturges(n: usize) -> usize {
    if n <= 1 {
        1
    } else {
        (n as f64).log2().ceil() as usize + 1
    }
}

/// Category frequencies of two categorical samples over their joint support.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFrequencies {
    /// Union of observed categories, sorted
    pub categories: Vec<String>,
    /// Frequencies of the first sample
    pub p: Vec<f64>,
    /// Frequencies of the second sample
    pub q: Vec<f64>,
}

impl AlignedFrequencies {
    /// Aligns two distributions. Non-categorical inputs yield empty supports.
    pub fn of(a: &Distribution, b: &Distribution) -> Self {
        let (counts_a, counts_b) = (a.category_counts(), b.category_counts());
        let categories: BTreeSet<&str> = counts_a.keys().chain(counts_b.keys()).copied().collect();
        let (na, nb) = (a.len() as f64, b.len() as f64);

        let mut aligned = Self {
            categories: Vec::with_capacity(categories.len()),
            p: Vec::with_capacity(categories.len()),
            q: Vec::with_capacity(categories.len()),
        };
        for category in categories {
            aligned.categories.push(category.to_string());
            aligned
                .p
                .push(counts_a.get(category).copied().unwrap_or(0) as f64 / na);
            aligned
                .q
                .push(counts_b.get(category).copied().unwrap_or(0) as f64 / nb);
        }
        aligned
    }
}

/// Total variation distance `0.5 * sum |p - q|`; the earth mover's distance
/// under a 0/1 ground metric.
pub fn total_variation(p: &[f64], q: &[f64]) -> f64 {
    0.5 * p.iter().zip(q).map(|(a, b)| (a - b).abs()).sum::<f64>()
}

/// Hellinger distance `sqrt(0.5 * sum (sqrt p - sqrt q)^2)`, in `[0, 1]`.
pub fn hellinger(p: &[f64], q: &[f64]) -> f64 {
    let sum: f64 = p
        .iter()
        .zip(q)
        .map(|(a, b)| (a.sqrt() - b.sqrt()).powi(2))
        .sum();
    (0.5 * sum).sqrt()
}

/// Jensen-Shannon divergence in bits, in `[0, 1]`.
pub fn jensen_shannon(p: &[f64], q: &[f64]) -> f64 {
    let mut divergence = 0.0;
    for (&a, &b) in p.iter().zip(q) {
        let m = 0.5 * (a + b);
        if a > 0.0 {
            divergence += 0.5 * a * (a / m).log2();
        }
        if b > 0.0 {
            divergence += 0.5 * b * (b / m).log2();
        }
    }
    divergence.max(0.0)
}
