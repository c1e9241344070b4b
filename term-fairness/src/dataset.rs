//! In-memory tabular dataset backed by an Arrow [`RecordBatch`].
//!
//! Loading data (CSV, Parquet, databases) is left to the caller; the fairness
//! engines only need named columns of equal length.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::error::{FairnessError, Result};

/// A snapshot of rows x named columns.
///
/// The dataset is never mutated by the analysis; every derived table is a pure
/// function of this snapshot.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wraps an existing record batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Builds a dataset from `(name, column)` pairs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use arrow::array::{ArrayRef, Int64Array, StringArray};
    /// use term_fairness::dataset::Dataset;
    ///
    /// let dataset = Dataset::from_columns(vec![
    ///     ("sex", Arc::new(StringArray::from(vec!["M", "F"])) as ArrayRef),
    ///     ("outcome", Arc::new(Int64Array::from(vec![1, 0])) as ArrayRef),
    /// ])
    /// .unwrap();
    /// assert_eq!(dataset.num_rows(), 2);
    /// ```
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        let batch = RecordBatch::try_from_iter(columns)?;
        Ok(Self { batch })
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Returns the schema of the underlying batch.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Checks whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| FairnessError::column_not_found(name))
    }

    /// Returns the number of non-null entries in a column.
    pub fn non_null_count(&self, name: &str) -> Result<usize> {
        let column = self.column(name)?;
        Ok(column.len() - column.null_count())
    }

    /// Borrows the underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }
}

impl From<RecordBatch> for Dataset {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

impl From<Arc<RecordBatch>> for Dataset {
    fn from(batch: Arc<RecordBatch>) -> Self {
        Self::new(batch.as_ref().clone())
    }
}
