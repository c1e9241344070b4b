//! Typed one-dimensional distributions extracted from Arrow columns.

use std::collections::BTreeMap;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray};
use arrow::compute::{cast, filter};
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampNanosecondType};
use arrow::util::display::{ArrayFormatter, FormatOptions};

use crate::analyzers::DistributionType;
use crate::error::Result;

/// The non-missing values of one column, typed by their semantic type.
///
/// Nulls (and `NaN` or infinite values for continuous data) are dropped at
/// extraction time and never imputed.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    /// Real values.
    Continuous(Vec<f64>),
    /// Nanoseconds since the Unix epoch.
    Datetime(Vec<i64>),
    /// Category labels in their display form.
    Categorical(Vec<String>),
}

impl Distribution {
    /// Extracts a distribution from a whole column.
    pub fn from_array(array: &dyn Array, distribution_type: DistributionType) -> Result<Self> {
        let distribution = match distribution_type {
            DistributionType::Continuous => {
                Distribution::Continuous(reals(array)?.into_iter().flatten().collect())
            }
            DistributionType::Datetime => {
                Distribution::Datetime(timeline(array)?.into_iter().flatten().collect())
            }
            DistributionType::Categorical => {
                Distribution::Categorical(labels(array)?.into_iter().flatten().collect())
            }
        };
        Ok(distribution)
    }

    /// Extracts the rows of `array` selected by `mask`.
    pub fn from_masked(
        array: &ArrayRef,
        mask: &BooleanArray,
        distribution_type: DistributionType,
    ) -> Result<Self> {
        let selected = filter(array.as_ref(), mask)?;
        Self::from_array(selected.as_ref(), distribution_type)
    }

    /// Returns the semantic type of the distribution.
    pub fn distribution_type(&self) -> DistributionType {
        match self {
            Distribution::Continuous(_) => DistributionType::Continuous,
            Distribution::Datetime(_) => DistributionType::Datetime,
            Distribution::Categorical(_) => DistributionType::Categorical,
        }
    }

    /// Number of usable values.
    pub fn len(&self) -> usize {
        match self {
            Distribution::Continuous(values) => values.len(),
            Distribution::Datetime(values) => values.len(),
            Distribution::Categorical(values) => values.len(),
        }
    }

    /// True when no usable values remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category frequencies, sorted by label. Empty for ordered distributions.
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        if let Distribution::Categorical(values) = self {
            for value in values {
                *counts.entry(value.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Values on a real line: continuous values as-is, datetimes as nanoseconds.
    pub fn as_reals(&self) -> Option<Vec<f64>> {
        match self {
            Distribution::Continuous(values) => Some(values.clone()),
            Distribution::Datetime(values) => Some(values.iter().map(|&v| v as f64).collect()),
            Distribution::Categorical(_) => None,
        }
    }
}

/// Row-aligned real values of an ordered column, `None` where missing.
pub(crate) fn positional_reals(
    array: &dyn Array,
    distribution_type: DistributionType,
) -> Result<Vec<Option<f64>>> {
    match distribution_type {
        DistributionType::Continuous => reals(array),
        DistributionType::Datetime => Ok(timeline(array)?
            .into_iter()
            .map(|v| v.map(|nanos| nanos as f64))
            .collect()),
        DistributionType::Categorical => Ok(labels(array)?
            .into_iter()
            .map(|v| v.and_then(|label| label.parse::<f64>().ok()))
            .collect()),
    }
}

fn reals(array: &dyn Array) -> Result<Vec<Option<f64>>> {
    let casted = cast(array, &DataType::Float64)?;
    Ok(casted
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn timeline(array: &dyn Array) -> Result<Vec<Option<i64>>> {
    // Keep any timezone so the stored UTC instants are read back unchanged.
    let target = match array.data_type() {
        DataType::Timestamp(_, tz) => DataType::Timestamp(TimeUnit::Nanosecond, tz.clone()),
        _ => DataType::Timestamp(TimeUnit::Nanosecond, None),
    };
    let casted = cast(array, &target)?;
    Ok(casted
        .as_primitive::<TimestampNanosecondType>()
        .iter()
        .collect())
}

fn labels(array: &dyn Array) -> Result<Vec<Option<String>>> {
    let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
    Ok((0..array.len())
        .map(|i| array.is_valid(i).then(|| formatter.value(i).to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use std::sync::Arc;

    #[test]
    fn test_continuous_drops_nulls_and_nan() {
        let array = Float64Array::from(vec![Some(1.0), None, Some(f64::NAN), Some(3.0)]);
        let distribution = Distribution::from_array(&array, DistributionType::Continuous).unwrap();
        assert_eq!(distribution, Distribution::Continuous(vec![1.0, 3.0]));
    }

    #[test]
    fn test_continuous_drops_infinities() {
        let array = Float64Array::from(vec![0.0, f64::INFINITY, 1.0, f64::NEG_INFINITY]);
        let distribution = Distribution::from_array(&array, DistributionType::Continuous).unwrap();
        assert_eq!(distribution, Distribution::Continuous(vec![0.0, 1.0]));

        let positions = positional_reals(&array, DistributionType::Continuous).unwrap();
        assert_eq!(positions, vec![Some(0.0), None, Some(1.0), None]);
    }

    #[test]
    fn test_integers_cast_to_reals() {
        let array = Int64Array::from(vec![Some(2), None, Some(4)]);
        let distribution = Distribution::from_array(&array, DistributionType::Continuous).unwrap();
        assert_eq!(distribution.as_reals(), Some(vec![2.0, 4.0]));
    }

    #[test]
    fn test_dates_become_nanoseconds() {
        let array = Date32Array::from(vec![Some(0), Some(1), None]);
        let distribution = Distribution::from_array(&array, DistributionType::Datetime).unwrap();
        assert_eq!(
            distribution,
            Distribution::Datetime(vec![0, 86_400_000_000_000])
        );
    }

    #[test]
    fn test_categorical_counts() {
        let array = StringArray::from(vec![Some("b"), Some("a"), None, Some("b")]);
        let distribution = Distribution::from_array(&array, DistributionType::Categorical).unwrap();
        assert_eq!(distribution.len(), 3);

        let counts = distribution.category_counts();
        assert_eq!(counts.get("a"), Some(&1));
        assert_eq!(counts.get("b"), Some(&2));
        assert_eq!(counts.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_masked_extraction() {
        let array: ArrayRef = Arc::new(Int64Array::from(vec![1, 2, 3, 4]));
        let mask = BooleanArray::from(vec![true, false, true, false]);
        let distribution =
            Distribution::from_masked(&array, &mask, DistributionType::Categorical).unwrap();
        assert_eq!(
            distribution,
            Distribution::Categorical(vec!["1".to_string(), "3".to_string()])
        );
    }

    #[test]
    fn test_positional_reals_keep_alignment() {
        let array = Float64Array::from(vec![Some(1.5), None, Some(2.5)]);
        let values = positional_reals(&array, DistributionType::Continuous).unwrap();
        assert_eq!(values, vec![Some(1.5), None, Some(2.5)]);
    }
}
