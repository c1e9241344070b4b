//! Deterministic datasets shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampSecondArray};
use term_fairness::dataset::Dataset;
use term_fairness::scorer::{DistanceTable, FairnessScore};

/// `n` rows of which the first `round(n * rate)` are positive.
fn outcomes(n: usize, rate: f64) -> Vec<i64> {
    let positives = (n as f64 * rate).round() as usize;
    (0..n).map(|i| (i < positives) as i64).collect()
}

/// Binary `outcome` over groups of a `group` column, one `(label, n, rate)` each.
pub fn rates_dataset(groups: &[(&str, usize, f64)]) -> Dataset {
    let mut labels = Vec::new();
    let mut outcome = Vec::new();
    for &(label, n, rate) in groups {
        labels.extend(std::iter::repeat_n(label, n));
        outcome.extend(outcomes(n, rate));
    }
    Dataset::from_columns(vec![
        ("group", Arc::new(StringArray::from(labels)) as ArrayRef),
        ("outcome", Arc::new(Int64Array::from(outcome)) as ArrayRef),
    ])
    .unwrap()
}

/// Binary `y` over string attribute columns, one `(values, n, rate)` per cell.
fn cells_dataset(attributes: [&str; 2], cells: &[([&str; 2], usize, f64)]) -> Dataset {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut y = Vec::new();
    for &([a, b], n, rate) in cells {
        first.extend(std::iter::repeat_n(a, n));
        second.extend(std::iter::repeat_n(b, n));
        y.extend(outcomes(n, rate));
    }
    Dataset::from_columns(vec![
        (attributes[0], Arc::new(StringArray::from(first)) as ArrayRef),
        (attributes[1], Arc::new(StringArray::from(second)) as ArrayRef),
        ("y", Arc::new(Int64Array::from(y)) as ArrayRef),
    ])
    .unwrap()
}

/// `race` x `sex` where every `race=C` row is `M`; each cell has its own rate.
pub fn nested_dataset() -> Dataset {
    cells_dataset(
        ["race", "sex"],
        &[
            (["A", "F"], 10, 0.1),
            (["A", "M"], 10, 0.3),
            (["B", "F"], 10, 0.5),
            (["B", "M"], 10, 0.7),
            (["C", "M"], 10, 0.9),
        ],
    )
}

/// Two yes/no flags, `married` and `veteran`, with a distinct rate per cell.
pub fn shared_flags_dataset() -> Dataset {
    cells_dataset(
        ["married", "veteran"],
        &[
            (["no", "no"], 10, 0.2),
            (["no", "yes"], 10, 0.4),
            (["yes", "no"], 10, 0.6),
            (["yes", "yes"], 10, 0.8),
        ],
    )
}

/// A census-like dataset with known disparities.
///
/// - `sex`: alternating `Female`/`Male`
/// - `race`: cycles through `A`, `B`, `C`, `D` every 2 rows
/// - `age`: 18..=77, cycling
/// - `income`: continuous, shifted up for `Male` and for race `A`
/// - `hired`: binary, rate 0.25 for `Female` and 0.75 for `Male`
/// - `joined`: datetime, later for `Female`
pub fn census_dataset(rows: usize) -> Dataset {
    let sex: Vec<&str> = (0..rows)
        .map(|i| if i % 2 == 0 { "Female" } else { "Male" })
        .collect();
    let race: Vec<&str> = (0..rows).map(|i| ["A", "B", "C", "D"][(i / 2) % 4]).collect();
    let age: Vec<f64> = (0..rows).map(|i| 18.0 + (i % 60) as f64).collect();
    let income: Vec<f64> = (0..rows)
        .map(|i| {
            let base = 30_000.0 + ((i * 7919) % 1000) as f64 * 20.0;
            let sex_shift = if i % 2 == 1 { 8_000.0 } else { 0.0 };
            let race_shift = if (i / 2) % 4 == 0 { 5_000.0 } else { 0.0 };
            base + sex_shift + race_shift
        })
        .collect();
    let hired: Vec<i64> = (0..rows)
        .map(|i| {
            let k = i / 2;
            if i % 2 == 0 {
                (k % 4 == 0) as i64
            } else {
                (k % 4 != 0) as i64
            }
        })
        .collect();
    let day = 86_400i64;
    let joined: Vec<i64> = (0..rows)
        .map(|i| 1_577_836_800 + (i as i64 % 365) * day + if i % 2 == 0 { 400 * day } else { 0 })
        .collect();

    Dataset::from_columns(vec![
        ("sex", Arc::new(StringArray::from(sex)) as ArrayRef),
        ("race", Arc::new(StringArray::from(race)) as ArrayRef),
        ("age", Arc::new(Float64Array::from(age)) as ArrayRef),
        ("income", Arc::new(Float64Array::from(income)) as ArrayRef),
        ("hired", Arc::new(Int64Array::from(hired)) as ArrayRef),
        ("joined", Arc::new(TimestampSecondArray::from(joined)) as ArrayRef),
    ])
    .unwrap()
}

/// Row selector equal to `column == value`.
pub fn selector(dataset: &Dataset, column: &str, value: &str) -> BooleanArray {
    let column = dataset.column(column).unwrap();
    let strings = column
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("string column");
    BooleanArray::from(strings.iter().map(|v| v == Some(value)).collect::<Vec<_>>())
}

/// Checks the aggregation identity against the table the score came from.
///
/// The numerator is recomputed in table order and must match exactly; the
/// quotient may differ from it by the rounding of one division.
pub fn assert_identity(table: &DistanceTable, score: &FairnessScore) {
    let mut weighted = 0.0;
    let mut total = 0u64;
    for record in &table.records {
        if let Some(distance) = record.distance() {
            if record.count > 0 {
                weighted += distance * record.count as f64;
                total += record.count;
            }
        }
    }

    assert_eq!(score.weighted_distance, weighted);
    assert_eq!(score.total_count, total);
    let reconstructed = score.value * total as f64;
    let tolerance = 4.0 * f64::EPSILON * weighted.abs().max(1.0);
    assert!(
        (reconstructed - weighted).abs() <= tolerance,
        "score * total = {reconstructed}, sum(distance * count) = {weighted}"
    );
}
