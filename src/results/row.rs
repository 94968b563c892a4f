use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

/// A row from a query result
///
/// Values come back from the server in text form, as the simple query protocol
/// delivers them. SQL `NULL` is `None`.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    pub values: Vec<Option<String>>,
    // Shared name -> position lookup, built once per result
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Create a new row, building its own column lookup.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Option<String>>) -> Self {
        let cache = Arc::new(build_column_index(&column_names));
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name
    ///
    /// When a result carries duplicate column names the last one wins, matching
    /// how an associative fetch overwrites earlier keys.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_index_cache.get(column_name).copied()
    }

    /// Get a value from the row by column name
    ///
    /// Returns `None` when the column does not exist and `Some(None)` when it
    /// holds SQL `NULL`.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<Option<&str>> {
        let idx = self.get_column_index(column_name)?;
        self.values.get(idx).map(Option::as_deref)
    }

    /// Get a value from the row by column position
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<Option<&str>> {
        self.values.get(index).map(Option::as_deref)
    }

    /// Number of columns in this row
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the row as a JSON object keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.values.len());
        for (name, value) in self.column_names.iter().zip(&self.values) {
            let json = match value {
                Some(text) => Value::String(text.clone()),
                None => Value::Null,
            };
            map.insert(name.clone(), json);
        }
        Value::Object(map)
    }
}

pub(crate) fn build_column_index(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}
