//! Type-adapted distribution analysis.
//!
//! - **Type classification** (`inference`): maps a column onto the closed
//!   [`DistributionType`] through a pluggable [`TypeClassifier`]
//! - **Distributions** (`distribution`): non-missing values of a column,
//!   optionally restricted to a group mask
//! - **Moments** (`moments`): means and variances whose shape follows the
//!   distribution type (scalar, timestamp/duration, per-category map)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use term_fairness::analyzers::sensitive_group_analysis;
//! use term_fairness::groups::GroupSpec;
//!
//! let analysis = sensitive_group_analysis(
//!     &dataset,
//!     "income",
//!     &[GroupSpec::values("sex", ["Female"]), GroupSpec::values("sex", ["Male"])],
//! )?;
//!
//! for row in &analysis.rows {
//!     println!("{}: mean={} variance={}", row.label, row.mean, row.variance);
//! }
//! ```

pub mod distribution;
pub mod inference;
pub mod moments;
pub mod types;

pub use distribution::Distribution;
pub use inference::{
    DistributionType, HeuristicClassifier, HeuristicClassifierBuilder, InferenceConfig,
    TypeClassifier,
};
pub use moments::{
    analyze_groups, sensitive_group_analysis, CategoricalMode, GroupAnalysis, GroupMoments,
    MomentEngine,
};
pub use types::MomentValue;
