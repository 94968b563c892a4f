//! Query results: rows of text values with a fetch cursor.

pub mod result_set;
pub mod row;

pub use result_set::QueryResult;
pub use row::Row;
