//! The seam between the row operations and the client that runs SQL.

use async_trait::async_trait;

use crate::error::PgConnError;
use crate::escape;
use crate::results::QueryResult;
use crate::statement;

/// Something that can run a statement through the simple query protocol.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Send `sql` as-is and return the result of its last statement.
    async fn simple_query(&self, sql: &str) -> Result<QueryResult, PgConnError>;

    /// Fail if the connection can no longer run statements.
    fn check_ready(&self) -> Result<(), PgConnError>;

    /// Whether the server treats backslashes in `'...'` literally.
    fn standard_conforming_strings(&self) -> bool {
        true
    }
}

/// Statement operations available on every [`QueryExecutor`].
///
/// Each one checks the connection first and returns an error instead of
/// aborting when the statement fails.
#[async_trait]
pub trait RowOperations: QueryExecutor {
    /// Run a raw SQL string.
    ///
    /// # Errors
    /// Returns `PgConnError::ConnectionError` if the connection is unusable, or
    /// `PgConnError::ExecutionError` with the server's message if the statement fails.
    async fn query(&self, sql: &str) -> Result<QueryResult, PgConnError> {
        self.check_ready()?;
        tracing::debug!(sql, "running statement");
        self.simple_query(sql).await
    }

    /// `INSERT INTO table (fields) VALUES (values);`
    ///
    /// # Errors
    /// See [`RowOperations::query`].
    async fn insert_new_row(
        &self,
        table: &str,
        fields: &str,
        values: &str,
    ) -> Result<QueryResult, PgConnError> {
        self.query(&statement::insert(table, fields, values)).await
    }

    /// `DELETE FROM table WHERE condition;`
    ///
    /// # Errors
    /// See [`RowOperations::query`].
    async fn delete_row(&self, table: &str, condition: &str) -> Result<QueryResult, PgConnError> {
        self.query(&statement::delete(table, condition)).await
    }

    /// `UPDATE table SET assignments WHERE condition;`
    ///
    /// # Errors
    /// See [`RowOperations::query`].
    async fn update_row(
        &self,
        table: &str,
        assignments: &str,
        condition: &str,
    ) -> Result<QueryResult, PgConnError> {
        self.query(&statement::update(table, assignments, condition)).await
    }

    /// `SELECT fields FROM table WHERE condition;`
    ///
    /// # Errors
    /// See [`RowOperations::query`].
    async fn get_row(
        &self,
        table: &str,
        fields: &str,
        condition: &str,
    ) -> Result<QueryResult, PgConnError> {
        self.query(&statement::select(table, fields, condition)).await
    }

    /// Escape `value` for use inside a single-quoted literal on this connection.
    ///
    /// # Errors
    /// Returns `PgConnError::ParameterError` if `value` contains a NUL byte.
    fn escape_string(&self, value: &str) -> Result<String, PgConnError> {
        escape::escape_string(value, self.standard_conforming_strings())
    }

    /// See [`escape::escape_literal`].
    ///
    /// # Errors
    /// Returns `PgConnError::ParameterError` if `value` contains a NUL byte.
    fn escape_literal(&self, value: &str) -> Result<String, PgConnError> {
        escape::escape_literal(value)
    }

    /// See [`escape::escape_identifier`].
    ///
    /// # Errors
    /// Returns `PgConnError::ParameterError` if `value` contains a NUL byte.
    fn escape_identifier(&self, value: &str) -> Result<String, PgConnError> {
        escape::escape_identifier(value)
    }
}

impl<T: QueryExecutor> RowOperations for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Recorder {
        statements: Mutex<Vec<String>>,
        closed: AtomicBool,
        fail_with: Option<String>,
        non_conforming: bool,
    }

    impl Recorder {
        fn statements(&self) -> Vec<String> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for Recorder {
        async fn simple_query(&self, sql: &str) -> Result<QueryResult, PgConnError> {
            self.statements.lock().unwrap().push(sql.to_string());
            match &self.fail_with {
                Some(msg) => Err(PgConnError::ExecutionError(msg.clone())),
                None => Ok(QueryResult::default()),
            }
        }

        fn check_ready(&self) -> Result<(), PgConnError> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(PgConnError::ConnectionError("connection is closed".to_string()));
            }
            Ok(())
        }

        fn standard_conforming_strings(&self) -> bool {
            !self.non_conforming
        }
    }

    #[tokio::test]
    async fn row_operations_send_formatted_sql() -> Result<(), PgConnError> {
        let exec = Recorder::default();
        exec.insert_new_row("users", "`id`, `name`", "1, \"ann\"").await?;
        exec.update_row("users", "name = 'bo'", "id = 1").await?;
        exec.get_row("users", "*", "id = 1").await?;
        exec.delete_row("users", "id = 1").await?;
        exec.query("SELECT 1").await?;

        assert_eq!(
            exec.statements(),
            vec![
                "INSERT INTO users (\"id\", \"name\") VALUES (1, 'ann');".to_string(),
                "UPDATE users SET name = 'bo' WHERE id = 1;".to_string(),
                "SELECT * FROM users WHERE id = 1;".to_string(),
                "DELETE FROM users WHERE id = 1;".to_string(),
                "SELECT 1".to_string(),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn closed_connection_runs_nothing() {
        let exec = Recorder::default();
        exec.closed.store(true, Ordering::SeqCst);

        let err = exec.delete_row("users", "true").await.unwrap_err();
        assert!(matches!(err, PgConnError::ConnectionError(_)));
        assert!(exec.statements().is_empty());
    }

    #[tokio::test]
    async fn statement_failure_is_returned_not_fatal() {
        let exec = Recorder {
            fail_with: Some("relation \"users\" does not exist".to_string()),
            ..Recorder::default()
        };
        let err = exec.get_row("users", "*", "true").await.unwrap_err();
        assert_eq!(err.server_message(), "relation \"users\" does not exist");

        // the executor is still usable afterwards
        assert!(exec.get_row("users", "*", "true").await.is_err());
        assert_eq!(exec.statements().len(), 2);
    }

    #[test]
    fn escape_follows_server_setting() {
        let conforming = Recorder::default();
        assert_eq!(conforming.escape_string(r"a\'b").unwrap(), r"a\''b");

        let legacy = Recorder {
            non_conforming: true,
            ..Recorder::default()
        };
        assert_eq!(legacy.escape_string(r"a\'b").unwrap(), r"a\\''b");
    }
}
