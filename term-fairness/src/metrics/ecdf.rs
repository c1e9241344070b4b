//! Distances between empirical CDFs of ordered (continuous/datetime) samples.

/// Kolmogorov-Smirnov statistic: `sup |F_a(x) - F_b(x)|`, in `[0, 1]`.
///
/// Both samples must be non-empty.
pub fn kolmogorov_smirnov(a: &[f64], b: &[f64]) -> f64 {
    let a = sorted(a);
    let b = sorted(b);
    let (na, nb) = (a.len() as f64, b.len() as f64);

    let (mut i, mut j) = (0, 0);
    let mut statistic: f64 = 0.0;
    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        statistic = statistic.max((i as f64 / na - j as f64 / nb).abs());
    }
    statistic
}

/// First Wasserstein (earth mover's) distance: `integral |F_a(x) - F_b(x)| dx`.
///
/// Expressed in the units of the samples. Both samples must be non-empty.
pub fn wasserstein(a: &[f64], b: &[f64]) -> f64 {
    let a = sorted(a);
    let b = sorted(b);
    let (na, nb) = (a.len() as f64, b.len() as f64);

    let mut points: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    points.sort_by(f64::total_cmp);
    points.dedup();

    let (mut i, mut j) = (0, 0);
    let mut area = 0.0;
    for window in points.windows(2) {
        let (x, next) = (window[0], window[1]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        area += (i as f64 / na - j as f64 / nb).abs() * (next - x);
    }
    area
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(f64::total_cmp);
    values
}
