//! SQL text for the row operations.
//!
//! Every fragment is interpolated verbatim. Nothing here quotes or validates
//! input, so callers must pass untrusted values through
//! [`crate::escape::escape_string`] first.

/// Rewrite MySQL-style backtick quoting to PostgreSQL double quotes.
#[must_use]
pub fn normalize_fields(fields: &str) -> String {
    fields.replace('`', "\"")
}

/// Rewrite double-quoted values to single-quoted string literals.
#[must_use]
pub fn normalize_values(values: &str) -> String {
    values.replace('"', "'")
}

/// `INSERT INTO <table> (<fields>) VALUES (<values>);`
///
/// Backticks in `fields` become double quotes and double quotes in `values`
/// become single quotes before formatting.
#[must_use]
pub fn insert(table: &str, fields: &str, values: &str) -> String {
    format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        normalize_fields(fields),
        normalize_values(values)
    )
}

/// `DELETE FROM <table> WHERE <condition>;`
#[must_use]
pub fn delete(table: &str, condition: &str) -> String {
    format!("DELETE FROM {table} WHERE {condition};")
}

/// `UPDATE <table> SET <assignments> WHERE <condition>;`
#[must_use]
pub fn update(table: &str, assignments: &str, condition: &str) -> String {
    format!("UPDATE {table} SET {assignments} WHERE {condition};")
}

/// `SELECT <fields> FROM <table> WHERE <condition>;`
#[must_use]
pub fn select(table: &str, fields: &str, condition: &str) -> String {
    format!("SELECT {fields} FROM {table} WHERE {condition};")
}
