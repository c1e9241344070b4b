//! Resolution of group specifications into boolean row masks, and the
//! comparison plans built from those masks.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use arrow::array::{Array, BooleanArray};
use arrow::compute::{and, not, prep_null_mask_filter};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::error::{FairnessError, Result};
use crate::groups::{GroupPredicate, GroupSpec};

/// Which reference distribution each group is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Each group vs. the whole dataset.
    All,
    /// Each group vs. every row outside the group.
    #[default]
    Rest,
    /// Every unordered pair of groups against each other.
    Pairwise,
}

impl ComparisonMode {
    /// Returns the mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::All => "all",
            ComparisonMode::Rest => "rest",
            ComparisonMode::Pairwise => "pairwise",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ComparisonMode::All),
            "rest" => Ok(ComparisonMode::Rest),
            "pairwise" => Ok(ComparisonMode::Pairwise),
            other => Err(FairnessError::invalid_config(format!(
                "unknown comparison mode '{other}', expected one of: all, rest, pairwise"
            ))),
        }
    }
}

/// A resolved group: its label and a null-free mask over all dataset rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMask {
    /// Group label
    pub label: String,
    /// Row selector, same length as the dataset
    pub mask: BooleanArray,
}

impl GroupMask {
    /// Number of selected rows.
    pub fn row_count(&self) -> usize {
        self.mask.true_count()
    }

    /// True when the mask selects no rows.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// The mask of every row not in this group.
    pub fn complement(&self) -> Result<BooleanArray> {
        Ok(not(&self.mask)?)
    }

    /// Rows in both groups, labelled `"self, other"`.
    pub fn intersection(&self, other: &GroupMask) -> Result<GroupMask> {
        Ok(GroupMask {
            label: format!("{}, {}", self.label, other.label),
            mask: and(&self.mask, &other.mask)?,
        })
    }
}

/// Label of a distance record: one group, or an unordered pair of groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordLabel {
    /// A single group compared against a global reference.
    Group(String),
    /// Two groups compared against each other.
    Pair(String, String),
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordLabel::Group(label) => f.write_str(label),
            RecordLabel::Pair(a, b) => write!(f, "{a} vs {b}"),
        }
    }
}

/// One comparison to run, or a group that has nothing to compare.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedComparison {
    /// Compare the target under `group` against the target under `reference`.
    Compare {
        /// Record label
        label: RecordLabel,
        /// Rows of the group (for pairwise: of the first group, minus the second)
        group: BooleanArray,
        /// Rows of the reference distribution
        reference: BooleanArray,
    },
    /// The group selects no rows.
    EmptyGroup {
        /// Record label
        label: RecordLabel,
    },
}

/// Turns group specifications into masks over a dataset.
#[derive(Debug, Clone, Copy)]
pub struct PredicatePartitioner<'a> {
    dataset: &'a Dataset,
}

impl<'a> PredicatePartitioner<'a> {
    /// Creates a partitioner over `dataset`.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Resolves every specification, preserving order.
    pub fn partition(&self, specs: &[GroupSpec]) -> Result<Vec<GroupMask>> {
        specs.iter().map(|spec| self.resolve(spec)).collect()
    }

    /// Resolves a single specification into a mask.
    pub fn resolve(&self, spec: &GroupSpec) -> Result<GroupMask> {
        let label = spec.label();
        let mask = match spec {
            GroupSpec::Values(predicate) => self.predicate_mask(predicate)?,
            GroupSpec::Selector { mask, .. } => {
                if mask.len() != self.dataset.num_rows() {
                    return Err(FairnessError::MaskLengthMismatch {
                        group: label,
                        expected: self.dataset.num_rows(),
                        actual: mask.len(),
                    });
                }
                if mask.null_count() > 0 {
                    prep_null_mask_filter(mask)
                } else {
                    mask.clone()
                }
            }
        };

        debug!(group = %label, rows = mask.true_count(), "Resolved group mask");
        Ok(GroupMask { label, mask })
    }

    fn predicate_mask(&self, predicate: &GroupPredicate) -> Result<BooleanArray> {
        let mut selected = vec![true; self.dataset.num_rows()];

        for (attribute, values) in predicate.conditions() {
            let column = self.dataset.column(attribute)?;
            let formatter = ArrayFormatter::try_new(column.as_ref(), &FormatOptions::default())?;
            let allowed: HashSet<&str> = values.iter().map(String::as_str).collect();

            for (row, keep) in selected.iter_mut().enumerate() {
                if *keep {
                    *keep = column.is_valid(row)
                        && allowed.contains(formatter.value(row).to_string().as_str());
                }
            }
        }

        Ok(BooleanArray::from(selected))
    }

    /// Builds the comparisons a mode requires from resolved group masks.
    ///
    /// - `all`: each group against an all-true reference.
    /// - `rest`: each group against its complement; an empty complement is a
    ///   [`FairnessError::DegenerateComparison`].
    /// - `pairwise`: each unordered pair `(a, b)` compared as the disjoint rows
    ///   `a and not b` vs. `b and not a`. Identical masks, or a pair where one
    ///   side disappears once shared rows are removed, are degenerate.
    ///
    /// Groups selecting no rows become [`PlannedComparison::EmptyGroup`].
    pub fn plan(&self, masks: &[GroupMask], mode: ComparisonMode) -> Result<Vec<PlannedComparison>> {
        if masks.is_empty() {
            return Err(FairnessError::NoGroups);
        }

        let mut plans = Vec::new();
        match mode {
            ComparisonMode::All => {
                let everything = BooleanArray::from(vec![true; self.dataset.num_rows()]);
                for group in masks {
                    let label = RecordLabel::Group(group.label.clone());
                    if group.is_empty() {
                        warn!(group = %group.label, "Group selects no rows");
                        plans.push(PlannedComparison::EmptyGroup { label });
                        continue;
                    }
                    plans.push(PlannedComparison::Compare {
                        label,
                        group: group.mask.clone(),
                        reference: everything.clone(),
                    });
                }
            }
            ComparisonMode::Rest => {
                for group in masks {
                    let label = RecordLabel::Group(group.label.clone());
                    if group.is_empty() {
                        warn!(group = %group.label, "Group selects no rows");
                        plans.push(PlannedComparison::EmptyGroup { label });
                        continue;
                    }
                    let rest = group.complement()?;
                    if rest.true_count() == 0 {
                        return Err(FairnessError::degenerate(format!(
                            "group '{}' covers every row, its complement is empty",
                            group.label
                        )));
                    }
                    plans.push(PlannedComparison::Compare {
                        label,
                        group: group.mask.clone(),
                        reference: rest,
                    });
                }
            }
            ComparisonMode::Pairwise => {
                for (i, first) in masks.iter().enumerate() {
                    for second in &masks[i + 1..] {
                        plans.push(self.plan_pair(first, second)?);
                    }
                }
            }
        }

        Ok(plans)
    }

    fn plan_pair(&self, first: &GroupMask, second: &GroupMask) -> Result<PlannedComparison> {
        let label = RecordLabel::Pair(first.label.clone(), second.label.clone());

        if first.is_empty() || second.is_empty() {
            warn!(pair = %label, "Pair involves a group selecting no rows");
            return Ok(PlannedComparison::EmptyGroup { label });
        }
        if first.mask == second.mask {
            return Err(FairnessError::degenerate(format!(
                "groups '{}' and '{}' select identical rows",
                first.label, second.label
            )));
        }

        let only_first = and(&first.mask, &not(&second.mask)?)?;
        let only_second = and(&second.mask, &not(&first.mask)?)?;
        if only_first.true_count() == 0 || only_second.true_count() == 0 {
            return Err(FairnessError::degenerate(format!(
                "groups '{}' and '{}' are nested, one side is empty once shared rows are removed",
                first.label, second.label
            )));
        }

        Ok(PlannedComparison::Compare {
            label,
            group: only_first,
            reference: only_second,
        })
    }
}
