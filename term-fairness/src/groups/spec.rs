//! Group specifications: attribute predicates or pre-built row selectors.

use std::collections::BTreeMap;

use arrow::array::BooleanArray;

/// Attribute -> allowed values, conjoined across attributes.
///
/// Within one attribute the values are alternatives (OR); across attributes
/// all conditions must hold (AND). Values are matched against the display
/// form of the column's entries, so `"1"` matches an integer `1` and `"true"`
/// a boolean `true`. Missing entries never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPredicate {
    conditions: BTreeMap<String, Vec<String>>,
    label: Option<String>,
}

impl GroupPredicate {
    /// Creates a predicate on a single attribute.
    pub fn new<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            conditions: BTreeMap::new(),
            label: None,
        }
        .and(attribute, values)
    }

    /// Adds a condition on another attribute.
    ///
    /// Repeating an attribute widens its allowed value set.
    pub fn and<I, V>(mut self, attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let allowed = self.conditions.entry(attribute.into()).or_default();
        for value in values {
            let value = value.into();
            if !allowed.contains(&value) {
                allowed.push(value);
            }
        }
        self
    }

    /// Overrides the derived label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attribute conditions, ordered by attribute name.
    pub fn conditions(&self) -> &BTreeMap<String, Vec<String>> {
        &self.conditions
    }

    /// The explicit label, or the allowed values (`|`-joined per attribute,
    /// attributes joined by `, `).
    pub fn label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        self.conditions
            .values()
            .map(|values| values.join("|"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A sensitive group, in either of the two accepted input forms.
///
/// The partitioner resolves both forms into a uniform boolean mask; nothing
/// downstream of it sees this type.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSpec {
    /// Attribute-value predicate.
    Values(GroupPredicate),
    /// A pre-built boolean row selector. Null entries count as unselected.
    Selector {
        /// Display label for the group
        label: String,
        /// One entry per dataset row
        mask: BooleanArray,
    },
}

impl GroupSpec {
    /// Shorthand for a single-attribute predicate.
    ///
    /// ```rust
    /// use term_fairness::groups::GroupSpec;
    ///
    /// let group = GroupSpec::values("Sex", ["Female"]);
    /// assert_eq!(group.label(), "Female");
    /// ```
    pub fn values<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        GroupSpec::Values(GroupPredicate::new(attribute, values))
    }

    /// Wraps a pre-built selector.
    pub fn selector(label: impl Into<String>, mask: BooleanArray) -> Self {
        GroupSpec::Selector {
            label: label.into(),
            mask,
        }
    }

    /// The label this group is reported under.
    pub fn label(&self) -> String {
        match self {
            GroupSpec::Values(predicate) => predicate.label(),
            GroupSpec::Selector { label, .. } => label.clone(),
        }
    }
}

impl From<GroupPredicate> for GroupSpec {
    fn from(predicate: GroupPredicate) -> Self {
        GroupSpec::Values(predicate)
    }
}
