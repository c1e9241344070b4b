//! # term-fairness - Fairness Auditing for Tabular Data
//!
//! term-fairness measures how the distribution of a target attribute shifts
//! across sensitive subgroups of a dataset (race, sex, age bands, ...). It
//! works on in-memory Arrow [`RecordBatch`](arrow::record_batch::RecordBatch)es
//! and reports:
//!
//! - **Group moments**: mean and variance of the target within each group,
//!   adapted to whether the target is continuous, a datetime or categorical
//! - **Distance tables**: a distance between each group's target distribution
//!   and a reference (the whole dataset, the rest of the rows, or every other
//!   group), weighted by sample counts
//! - **Fairness score**: the count-weighted mean of those distances
//! - **Dendrograms**: agglomerative clustering of groups by pairwise distance
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use term_fairness::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let sex: Vec<&str> = (0..200).map(|i| if i < 100 { "A" } else { "B" }).collect();
//! let outcome: Vec<i64> = (0..200)
//!     .map(|i| if i < 100 { (i % 5 == 0) as i64 } else { (i % 5 != 0) as i64 })
//!     .collect();
//! let dataset = Dataset::from_columns(vec![
//!     ("sex", Arc::new(StringArray::from(sex)) as ArrayRef),
//!     ("outcome", Arc::new(Int64Array::from(outcome)) as ArrayRef),
//! ])?;
//!
//! let scorer = FairnessScorer::new(dataset, "outcome", ["sex"])?;
//! let result = scorer.distribution_score(Some(ComparisonMode::Rest), None)?;
//!
//! // Outcome rates 0.2 and 0.8: every group sits 0.6 away from the rest
//! assert!((result.score.value - 0.6).abs() < 1e-9);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Comparison Modes
//!
//! | Mode       | Reference for group `G`      | Record count          |
//! |------------|------------------------------|-----------------------|
//! | `all`      | every row                    | usable values in `G`  |
//! | `rest`     | rows outside `G`             | usable values in `G`  |
//! | `pairwise` | `H and not G`, for each `H`  | smaller side of pair  |
//!
//! Groups that select no rows are kept in the table as empty records and
//! carry no weight in the score.
//!
//! ## Architecture
//!
//! - **`analyzers`**: type classification, typed distributions and moments
//! - **`groups`**: group specifications, masks and comparison plans
//! - **`metrics`**: distance metrics and the distance engine
//! - **`scorer`**: distance tables, aggregation and the [`FairnessScorer`](scorer::FairnessScorer) façade
//! - **`cluster`**: pairwise matrices, linkage and dendrograms
//! - **`config`**: serializable scorer configuration
//! - **`formatters`**: JSON, console and Markdown reports
//! - **`logging`**: verbosity controls and subscriber setup

pub mod analyzers;
pub mod cluster;
pub mod config;
pub mod dataset;
pub mod error;
pub mod formatters;
pub mod groups;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod scorer;
