//! Derivation of sensitive groups from attribute columns.
//!
//! Categorical attributes contribute one group per distinct value, labelled
//! `attribute=value` so equal values of different attributes stay apart. Continuous
//! and datetime attributes (ages, birth dates) are split into equal-frequency
//! bands so that each band holds roughly the same number of rows.

use std::collections::BTreeSet;

use arrow::array::BooleanArray;
use chrono::DateTime;
use tracing::debug;

use crate::analyzers::distribution::positional_reals;
use crate::analyzers::{Distribution, DistributionType, TypeClassifier};
use crate::dataset::Dataset;
use crate::error::{FairnessError, Result};
use crate::groups::{GroupPredicate, GroupSpec};

/// Enumerates the groups induced by one sensitive attribute.
pub fn attribute_groups(
    dataset: &Dataset,
    attribute: &str,
    classifier: &dyn TypeClassifier,
    bins: usize,
) -> Result<Vec<GroupSpec>> {
    let column = dataset.column(attribute)?;
    let attribute_type = classifier.classify(column.as_ref())?;

    let groups = match attribute_type {
        DistributionType::Categorical => {
            let distribution = Distribution::from_array(column.as_ref(), attribute_type)?;
            distribution
                .category_counts()
                .into_keys()
                .map(|value| {
                    let label = format!("{attribute}={value}");
                    GroupSpec::Values(GroupPredicate::new(attribute, [value]).with_label(label))
                })
                .collect()
        }
        DistributionType::Continuous | DistributionType::Datetime => {
            let values = positional_reals(column.as_ref(), attribute_type)?;
            banded_groups(attribute, attribute_type, &values, bins)?
        }
    };

    debug!(attribute, attribute_type = %attribute_type, groups = groups.len(), "Enumerated attribute groups");
    Ok(groups)
}

fn banded_groups(
    attribute: &str,
    attribute_type: DistributionType,
    values: &[Option<f64>],
    bins: usize,
) -> Result<Vec<GroupSpec>> {
    if bins == 0 {
        return Err(FairnessError::invalid_config(
            "sensitive attribute bins must be at least 1",
        ));
    }

    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return Ok(Vec::new());
    }
    sorted.sort_by(f64::total_cmp);

    let edges = quantile_edges(&sorted, bins);
    let last = edges.len() - 1;

    let mut groups = Vec::with_capacity(last.max(1));
    if last == 0 {
        // Constant attribute: a single band holding every observed row.
        let mask = BooleanArray::from(values.iter().map(|v| v.is_some()).collect::<Vec<_>>());
        let bound = format_bound(edges[0], attribute_type);
        groups.push(GroupSpec::selector(format!("{attribute} [{bound}, {bound}]"), mask));
        return Ok(groups);
    }

    for band in 0..last {
        let (lo, hi) = (edges[band], edges[band + 1]);
        let closed = band + 1 == last;
        let mask = BooleanArray::from(
            values
                .iter()
                .map(|v| match v {
                    Some(x) => *x >= lo && (*x < hi || (closed && *x <= hi)),
                    None => false,
                })
                .collect::<Vec<_>>(),
        );
        let label = format!(
            "{attribute} [{}, {}{}",
            format_bound(lo, attribute_type),
            format_bound(hi, attribute_type),
            if closed { "]" } else { ")" }
        );
        groups.push(GroupSpec::selector(label, mask));
    }

    Ok(groups)
}

/// Distinct quantile cut points `q(0), q(1/bins), ..., q(1)` of sorted data.
fn quantile_edges(sorted: &[f64], bins: usize) -> Vec<f64> {
    let mut edges = BTreeSet::new();
    let n = sorted.len();
    for k in 0..=bins {
        let position = (k * (n - 1)) / bins;
        edges.insert(OrderedBound(sorted[position]));
    }
    edges.into_iter().map(|bound| bound.0).collect()
}

fn format_bound(value: f64, attribute_type: DistributionType) -> String {
    match attribute_type {
        DistributionType::Datetime => DateTime::from_timestamp_nanos(value as i64)
            .format("%Y-%m-%d")
            .to_string(),
        _ => format!("{value}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedBound(f64);

impl Eq for OrderedBound {}

impl PartialOrd for OrderedBound {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedBound {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
