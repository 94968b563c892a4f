use tokio_postgres::SimpleQueryMessage;

use crate::error::PgConnError;
use crate::results::QueryResult;

/// Collects the results of a (possibly multi-statement) simple query.
///
/// Each `CommandComplete` closes the statement in progress; only the last
/// closed statement is kept.
#[derive(Debug, Default)]
pub(crate) struct ResultAccumulator {
    current: Option<QueryResult>,
    last: QueryResult,
}

impl ResultAccumulator {
    pub(crate) fn describe(&mut self, column_names: Vec<String>) {
        self.current = Some(QueryResult::with_columns(column_names));
    }

    /// `column_names` is only consulted when no description preceded the row.
    pub(crate) fn push_row(
        &mut self,
        column_names: impl FnOnce() -> Vec<String>,
        values: Vec<Option<String>>,
    ) {
        self.current
            .get_or_insert_with(|| QueryResult::with_columns(column_names()))
            .add_row_values(values);
    }

    pub(crate) fn complete(&mut self, rows_affected: u64) {
        let mut done = self.current.take().unwrap_or_default();
        done.set_rows_affected(rows_affected);
        self.last = done;
    }

    pub(crate) fn finish(self) -> QueryResult {
        self.last
    }
}

/// Build a `QueryResult` from the messages of `Client::simple_query`.
///
/// # Errors
/// Returns `PgConnError::ExecutionError` if a value is not valid UTF-8, which
/// happens when a statement switches the session's `client_encoding`.
pub fn build_query_result(
    messages: Vec<SimpleQueryMessage>,
) -> Result<QueryResult, PgConnError> {
    let mut acc = ResultAccumulator::default();
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                acc.describe(columns.iter().map(|c| c.name().to_string()).collect());
            }
            SimpleQueryMessage::Row(row) => {
                let values = (0..row.len())
                    .map(|idx| row.try_get(idx).map(|v| v.map(str::to_string)))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| {
                        PgConnError::ExecutionError(format!("postgres result decode error: {e}"))
                    })?;
                acc.push_row(
                    || row.columns().iter().map(|c| c.name().to_string()).collect(),
                    values,
                );
            }
            SimpleQueryMessage::CommandComplete(rows) => acc.complete(rows),
            _ => {}
        }
    }
    Ok(acc.finish())
}
