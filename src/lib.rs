//! A thin PostgreSQL connection wrapper.
//!
//! Connection settings come from either an XML settings file or a constants
//! file. The connection then runs INSERT/UPDATE/DELETE/SELECT statements built
//! by plain string formatting, escapes strings, and fetches rows either by
//! column name or by position.
//!
//! Statements are interpolated verbatim. Pass untrusted values through
//! [`executor::RowOperations::escape_string`] before building SQL with them.

pub mod config;
pub mod error;
pub mod escape;
pub mod executor;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod statement;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{ConnectionParams, ConnectionSettings, SettingsFormat};
pub use error::PgConnError;
pub use executor::{QueryExecutor, RowOperations};
pub use postgres::PgConnection;
pub use results::{QueryResult, Row};
