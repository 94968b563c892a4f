use super::super::SHARED_RUNTIME;
use crate::config::{ConnectionParams, ConnectionSettings};
use crate::executor::RowOperations;
use crate::postgres::PgConnection;

use postgresql_embedded::PostgreSQL;

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    /// Working parameters for the created database
    pub params: ConnectionParams,
}

impl EmbeddedPostgres {
    #[must_use]
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::Params(self.params.clone())
    }

    /// The same parameters written as a constants settings file.
    #[must_use]
    pub fn constants_file_contents(&self) -> String {
        let p = &self.params;
        format!(
            "<?php\ndefine('DB_HOST','{}');\ndefine('DB_PORT','{}');\ndefine('DB_USER','{}');\ndefine('DB_PASS','{}');\ndefine('DB_NAME','{}');\ndefine('CHARSET','{}');\n?>\n",
            p.host.as_deref().unwrap_or_default(),
            self.port,
            p.user.as_deref().unwrap_or_default(),
            p.password.as_deref().unwrap_or_default().replace('\\', "\\\\").replace('\'', "\\'"),
            p.dbname.as_deref().unwrap_or_default(),
            p.charset,
        )
    }
}

/// Set up an embedded `PostgreSQL` instance with a database named `dbname`.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up, started, or if database
/// provisioning or the post-start connectivity check fails.
pub fn setup_postgres_embedded(
    dbname: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // Setup PostgreSQL binaries (bundled, so no download conflicts)
        postgresql.setup().await?;
        postgresql.start().await?;

        let port = postgresql.settings().port;
        postgresql.create_database(dbname).await?;

        let params = ConnectionParams {
            host: Some(postgresql.settings().host.clone()),
            port: Some(port),
            user: Some(postgresql.settings().username.clone()),
            password: Some(postgresql.settings().password.clone()),
            dbname: Some(dbname.to_string()),
            ..ConnectionParams::default()
        };

        // Quick connection test
        let conn = PgConnection::connect(&ConnectionSettings::Params(params.clone())).await?;
        conn.query("SELECT 1").await?;
        conn.close().await?;
        tracing::info!(port, dbname, "embedded postgres ready");

        Ok(EmbeddedPostgres {
            postgresql,
            port,
            params,
        })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
