//! Convenient imports for common functionality.

pub use crate::config::{ConnectionParams, ConnectionSettings, SettingsFormat};
pub use crate::error::PgConnError;
pub use crate::executor::{QueryExecutor, RowOperations};
pub use crate::postgres::PgConnection;
pub use crate::results::{QueryResult, Row};
