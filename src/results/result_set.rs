use std::collections::HashMap;
use std::sync::Arc;

use super::row::{Row, build_column_index};

/// The result of a statement, with a cursor for row-at-a-time fetching
///
/// When a query string holds several statements this is the result of the
/// last one.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    rows: Vec<Row>,
    /// Count from the server's command tag (rows returned or affected)
    rows_affected: u64,
    column_names: Arc<Vec<String>>,
    column_index_cache: Arc<HashMap<String, usize>>,
    cursor: usize,
}

impl QueryResult {
    /// Create an empty result with the given column names.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> Self {
        let cache = Arc::new(build_column_index(&column_names));
        Self {
            rows: Vec::new(),
            rows_affected: 0,
            column_names: Arc::new(column_names),
            column_index_cache: cache,
            cursor: 0,
        }
    }

    /// Append a row; the values must line up with the column names.
    pub fn add_row_values(&mut self, values: Vec<Option<String>>) {
        self.rows.push(Row {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index_cache: Arc::clone(&self.column_index_cache),
        });
    }

    pub(crate) fn set_rows_affected(&mut self, rows_affected: u64) {
        self.rows_affected = rows_affected;
    }

    /// Number of rows in the result
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Rows returned or affected, as reported by the server
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Fetch the next row for access by column name, advancing the cursor.
    pub fn fetch_assoc(&mut self) -> Option<&Row> {
        let row = self.rows.get(self.cursor)?;
        self.cursor += 1;
        Some(row)
    }

    /// Fetch the next row as positional values, advancing the cursor.
    pub fn fetch_row(&mut self) -> Option<&[Option<String>]> {
        let row = self.rows.get(self.cursor)?;
        self.cursor += 1;
        Some(&row.values)
    }

    /// Move the cursor back to the first row.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to `position`. Returns `false` (and leaves the cursor
    /// alone) when `position` is past the last row.
    pub fn seek(&mut self, position: usize) -> bool {
        if position >= self.rows.len() {
            return false;
        }
        self.cursor = position;
        true
    }
}
