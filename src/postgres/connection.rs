use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

use super::query::build_query_result;
use crate::config::ConnectionSettings;
use crate::error::{PgConnError, postgres_error_message};
use crate::executor::QueryExecutor;
use crate::results::QueryResult;

/// Error state shared with the task that drives the connection.
#[derive(Debug, Default)]
struct ConnectionState {
    last_error: Mutex<Option<String>>,
    broken: AtomicBool,
}

impl ConnectionState {
    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        match self.last_error.lock() {
            Ok(guard) => guard,
            // Clear the poison and continue with the recovered data
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, message: String) {
        *self.lock() = Some(message);
    }

    fn clear(&self) {
        *self.lock() = None;
    }

    fn mark_broken(&self, message: String) {
        self.broken.store(true, Ordering::SeqCst);
        self.record(message);
    }
}

/// A single PostgreSQL connection
///
/// The connection's I/O runs on a spawned tokio task for as long as this value
/// lives. Statement operations come from [`crate::executor::RowOperations`].
///
/// ```rust,no_run
/// use pgconn::prelude::*;
///
/// # async fn run() -> Result<(), PgConnError> {
/// let conn = PgConnection::from_constants_file("config.php").await?;
/// let name = conn.escape_string("O'Reilly")?;
/// conn.insert_new_row("authors", "`name`", &format!("'{name}'")).await?;
///
/// let mut result = conn.get_row("authors", "id, name", "true").await?;
/// while let Some(row) = result.fetch_assoc() {
///     println!("{:?}", row.get("name"));
/// }
/// conn.close().await
/// # }
/// ```
pub struct PgConnection {
    client: Client,
    driver: JoinHandle<()>,
    state: Arc<ConnectionState>,
    standard_conforming_strings: bool,
}

impl PgConnection {
    /// Connect using `settings`.
    ///
    /// # Errors
    /// Returns `PgConnError::ConfigError` for incomplete settings and
    /// `PgConnError::ConnectionError` carrying the server's message if the
    /// connection cannot be established.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, PgConnError> {
        let pg_config = settings.to_pg_config()?;
        tracing::info!(settings = %settings, "connecting to postgres");

        let (client, connection) = pg_config
            .connect(NoTls)
            .await
            .map_err(|e| connect_failure(settings, &e))?;

        let state = Arc::new(ConnectionState::default());
        let driver_state = Arc::clone(&state);
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection terminated");
                driver_state.mark_broken(postgres_error_message(&e));
            }
        });

        let standard_conforming_strings = read_standard_conforming_strings(&client)
            .await
            .map_err(|e| connect_failure(settings, &e))?;

        Ok(Self {
            client,
            driver,
            state,
            standard_conforming_strings,
        })
    }

    /// Load an XML settings file and connect.
    ///
    /// # Errors
    /// See [`ConnectionSettings::from_xml_file`] and [`PgConnection::connect`].
    pub async fn from_xml_file(path: impl AsRef<Path>) -> Result<Self, PgConnError> {
        let settings = ConnectionSettings::from_xml_file(path)?;
        Self::connect(&settings).await
    }

    /// Load a constants settings file and connect.
    ///
    /// # Errors
    /// See [`ConnectionSettings::from_constants_file`] and [`PgConnection::connect`].
    pub async fn from_constants_file(path: impl AsRef<Path>) -> Result<Self, PgConnError> {
        let settings = ConnectionSettings::from_constants_file(path)?;
        Self::connect(&settings).await
    }

    /// Close the connection and wait for its I/O task to finish.
    ///
    /// # Errors
    /// Returns `PgConnError::ConnectionError` if the I/O task panicked.
    pub async fn close(self) -> Result<(), PgConnError> {
        let PgConnection { client, driver, .. } = self;
        drop(client);
        driver.await.map_err(|e| {
            PgConnError::ConnectionError(format!("postgres connection task failed: {e}"))
        })?;
        tracing::info!("postgres connection closed");
        Ok(())
    }

    /// The underlying `tokio_postgres` client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    /// Message of the most recent failure on this connection, cleared by the
    /// next successful statement.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().clone()
    }
}

#[async_trait]
impl QueryExecutor for PgConnection {
    async fn simple_query(&self, sql: &str) -> Result<QueryResult, PgConnError> {
        match self.client.simple_query(sql).await {
            Ok(messages) => {
                let result = match build_query_result(messages) {
                    Ok(result) => result,
                    Err(e) => {
                        let message = e.server_message();
                        tracing::warn!(sql, error = %message, "statement result unreadable");
                        self.state.record(message);
                        return Err(e);
                    }
                };
                self.state.clear();
                tracing::debug!(
                    rows = result.num_rows(),
                    rows_affected = result.rows_affected(),
                    "statement complete"
                );
                Ok(result)
            }
            Err(e) => {
                let message = postgres_error_message(&e);
                tracing::warn!(sql, error = %message, "statement failed");
                self.state.record(message.clone());
                Err(PgConnError::ExecutionError(message))
            }
        }
    }

    fn check_ready(&self) -> Result<(), PgConnError> {
        if self.state.broken.load(Ordering::SeqCst) || self.client.is_closed() {
            let reason = self
                .last_error()
                .unwrap_or_else(|| "connection is closed".to_string());
            return Err(PgConnError::ConnectionError(reason));
        }
        Ok(())
    }

    fn standard_conforming_strings(&self) -> bool {
        self.standard_conforming_strings
    }
}

// Anything that fails before `connect` returns is a connection failure.
fn connect_failure(settings: &ConnectionSettings, err: &tokio_postgres::Error) -> PgConnError {
    let message = postgres_error_message(err);
    tracing::error!(settings = %settings, error = %message, "postgres connect failed");
    PgConnError::ConnectionError(format!("Failed to connect to Postgres: {message}"))
}

async fn read_standard_conforming_strings(
    client: &Client,
) -> Result<bool, tokio_postgres::Error> {
    let messages = client
        .simple_query("SHOW standard_conforming_strings")
        .await?;
    for message in &messages {
        if let SimpleQueryMessage::Row(row) = message {
            if let Some(value) = row.try_get(0)? {
                return Ok(value.eq_ignore_ascii_case("on"));
            }
        }
    }
    Ok(true)
}
