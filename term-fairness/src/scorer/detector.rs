//! Pluggable discovery of sensitive attributes.

use crate::dataset::Dataset;
use crate::error::Result;

/// Suggests which columns of a dataset hold sensitive attributes.
///
/// No detector ships with this crate. Any `Fn(&Dataset) -> Result<Vec<String>>`
/// closure is a detector:
///
/// ```rust
/// use term_fairness::dataset::Dataset;
/// use term_fairness::error::Result;
/// use term_fairness::scorer::SensitiveAttributeDetector;
///
/// let by_name = |dataset: &Dataset| -> Result<Vec<String>> {
///     Ok(dataset
///         .column_names()
///         .into_iter()
///         .filter(|name| ["sex", "race", "age"].contains(&name.to_lowercase().as_str()))
///         .collect::<Vec<_>>())
/// };
/// # fn assert_detector(_: &impl SensitiveAttributeDetector) {}
/// # assert_detector(&by_name);
/// ```
pub trait SensitiveAttributeDetector {
    /// Returns the names of columns considered sensitive.
    fn detect(&self, dataset: &Dataset) -> Result<Vec<String>>;
}

impl<F> SensitiveAttributeDetector for F
where
    F: Fn(&Dataset) -> Result<Vec<String>>,
{
    fn detect(&self, dataset: &Dataset) -> Result<Vec<String>> {
        self(dataset)
    }
}
