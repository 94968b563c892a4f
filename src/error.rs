use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgConnError {
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[error(transparent)]
    XmlError(#[from] roxmltree::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}

impl PgConnError {
    /// Text of the error as the server reported it, without the variant prefix.
    ///
    /// For server-side failures this is the `DbError` message (e.g.
    /// `relation "foo" does not exist`); everything else falls back to `Display`.
    #[must_use]
    pub fn server_message(&self) -> String {
        match self {
            PgConnError::PostgresError(e) => postgres_error_message(e),
            PgConnError::ExecutionError(msg) | PgConnError::ConnectionError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Prefer the server's message over the client's wrapper text.
pub(crate) fn postgres_error_message(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.message().to_string(),
        None => err.to_string(),
    }
}
