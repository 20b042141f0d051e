use std::sync::Arc;

use crate::types::RowValues;

use super::row::ResultRow;

/// The tabular output of one executed statement.
///
/// A SELECT-like execution carries a schema plus zero or more rows and no
/// affected-row count; a DML execution carries an affected-row count and no
/// schema. A single execution call may yield several of these in sequence.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the statement
    pub rows: Vec<ResultRow>,
    /// The number of rows affected; None means "not applicable" (e.g. SELECT)
    pub rows_affected: Option<usize>,
    /// Column names shared by all rows (to avoid duplicating in each row)
    column_names: Option<Arc<Vec<String>>>,
}

impl ResultSet {
    /// Create a result set that will carry rows under the given schema.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> ResultSet {
        ResultSet {
            rows: Vec::new(),
            rows_affected: None,
            column_names: Some(Arc::new(column_names)),
        }
    }

    /// Create a schema-less result set for a DML statement that only reports
    /// how many rows it touched.
    #[must_use]
    pub fn from_dml(rows_affected: usize) -> ResultSet {
        ResultSet {
            rows: Vec::new(),
            rows_affected: Some(rows_affected),
            column_names: None,
        }
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Add a row to the result set; ignored when no schema has been set.
    pub fn add_row_values(&mut self, values: Vec<RowValues>) {
        if let Some(column_names) = &self.column_names {
            self.rows.push(ResultRow::new(column_names.clone(), values));
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
