//! Sensitive group specification and predicate partitioning.
//!
//! A group is specified either as attribute -> allowed values
//! ([`GroupPredicate`]) or as a pre-built boolean selector. The
//! [`PredicatePartitioner`] resolves both forms into null-free masks of the
//! dataset's length and builds the comparisons each [`ComparisonMode`] needs.
//!
//! ```rust,ignore
//! use term_fairness::groups::{ComparisonMode, GroupPredicate, GroupSpec, PredicatePartitioner};
//!
//! let groups = vec![
//!     GroupSpec::values("sex", ["Female"]),
//!     GroupPredicate::new("sex", ["Male"]).and("race", ["Black"]).into(),
//! ];
//!
//! let partitioner = PredicatePartitioner::new(&dataset);
//! let masks = partitioner.partition(&groups)?;
//! let plans = partitioner.plan(&masks, ComparisonMode::Rest)?;
//! ```

pub mod enumerate;
pub mod partition;
pub mod spec;

pub use enumerate::attribute_groups;
pub use partition::{
    ComparisonMode, GroupMask, PlannedComparison, PredicatePartitioner, RecordLabel,
};
pub use spec::{GroupPredicate, GroupSpec};
