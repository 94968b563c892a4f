#![cfg(feature = "test-utils")]

use std::fs;
use std::time::Duration;

use pgconn::prelude::*;
use pgconn::test_utils::{setup_postgres_embedded, stop_postgres_embedded};
use tempfile::TempDir;

#[test]
fn test2_postgres_row_operations() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("test_db")?;

    let dir = TempDir::new()?;
    let config_path = dir.path().join("config.php");
    fs::write(&config_path, pg.constants_file_contents())?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let conn = PgConnection::from_constants_file(&config_path).await?;
        assert!(!conn.is_closed());

        conn.query(
            "DROP TABLE IF EXISTS authors;
             CREATE TABLE authors (id INT PRIMARY KEY, name TEXT, note TEXT);",
        )
        .await?;

        let name = conn.escape_string("O'Reilly")?;
        let inserted = conn
            .insert_new_row("authors", "`id`, `name`", &format!("1, '{name}'"))
            .await?;
        assert_eq!(inserted.rows_affected(), 1);
        conn.insert_new_row("authors", "`id`, `name`, `note`", "2, \"Knuth\", \"taocp\"")
            .await?;

        let mut result = conn.get_row("authors", "id, name, note", "true ORDER BY id").await?;
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.column_names(), &["id", "name", "note"]);

        let first = result.fetch_assoc().unwrap();
        assert_eq!(first.get("id"), Some(Some("1")));
        assert_eq!(first.get("name"), Some(Some("O'Reilly")));
        assert_eq!(first.get("note"), Some(None));

        let second = result.fetch_row().unwrap();
        assert_eq!(second[1].as_deref(), Some("Knuth"));
        assert!(result.fetch_row().is_none());

        let updated = conn.update_row("authors", "note = 'art'", "id = 2").await?;
        assert_eq!(updated.rows_affected(), 1);

        let deleted = conn.delete_row("authors", "id = 1").await?;
        assert_eq!(deleted.rows_affected(), 1);

        let mut result = conn.get_row("authors", "note", "id = 2").await?;
        assert_eq!(result.fetch_assoc().unwrap().get("note"), Some(Some("art")));

        let empty = conn.get_row("authors", "id", "id = 99").await?;
        assert_eq!(empty.num_rows(), 0);
        assert_eq!(empty.column_names(), &["id"]);

        conn.close().await?;
        Ok::<(), PgConnError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn test2_postgres_errors_are_recoverable() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("test_db_errors")?;
    let p = pg.params.clone();

    let dir = TempDir::new()?;
    let xml_path = dir.path().join("appsettings.xml");
    let conn_str = format!(
        "host={} port={} dbname={} user={} password={}",
        p.host.as_deref().unwrap_or_default(),
        pg.port,
        p.dbname.as_deref().unwrap_or_default(),
        p.user.as_deref().unwrap_or_default(),
        p.password.as_deref().unwrap_or_default(),
    );
    fs::write(
        &xml_path,
        format!(
            "<Database><Setting AdapterPath=\"PostgreSQL\" ConnectionString=\"{conn_str}\"/></Database>"
        ),
    )?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let conn = PgConnection::from_xml_file(&xml_path).await?;

        let err = conn.get_row("no_such_table", "*", "true").await.unwrap_err();
        assert!(matches!(err, PgConnError::ExecutionError(_)));
        let last = conn.last_error().unwrap();
        assert!(last.contains("no_such_table"), "unexpected error text: {last}");

        // the connection keeps working and the error is cleared
        let mut result = conn.query("SELECT 1 AS one").await?;
        assert_eq!(result.fetch_assoc().unwrap().get("one"), Some(Some("1")));
        assert_eq!(conn.last_error(), None);

        conn.close().await?;
        Ok::<(), PgConnError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn test2_postgres_undecodable_text_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("test_db_encoding")?;
    let settings = pg.settings();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let conn = PgConnection::connect(&settings).await?;

        // LATIN1 'é' is a lone 0xE9 byte, which is not UTF-8
        let err = conn
            .query("SET client_encoding TO 'LATIN1'; SELECT 'café' AS v")
            .await
            .unwrap_err();
        assert!(matches!(err, PgConnError::ExecutionError(_)), "got {err:?}");
        assert!(conn.last_error().is_some());

        conn.query("SET client_encoding TO 'UTF8'").await?;
        let mut result = conn.query("SELECT 'café' AS v").await?;
        assert_eq!(result.fetch_assoc().unwrap().get("v"), Some(Some("café")));
        assert_eq!(conn.last_error(), None);

        conn.close().await?;
        Ok::<(), PgConnError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn test2_postgres_terminated_backend_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("test_db_terminate")?;
    let settings = pg.settings();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let conn = PgConnection::connect(&settings).await?;

        let _ = conn.query("SELECT pg_terminate_backend(pg_backend_pid())").await;
        for _ in 0..50 {
            if conn.is_closed() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(conn.is_closed());

        let err = conn.get_row("pg_class", "relname", "true").await.unwrap_err();
        assert!(matches!(err, PgConnError::ConnectionError(_)), "got {err:?}");
        assert!(conn.last_error().is_some());

        conn.close().await?;
        Ok::<(), PgConnError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn test2_postgres_rejected_login_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded("test_db_login")?;
    let mut params = pg.params.clone();
    params.dbname = Some("no_such_database".to_string());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let err = PgConnection::connect(&ConnectionSettings::Params(params))
            .await
            .err()
            .unwrap();
        match err {
            PgConnError::ConnectionError(msg) => {
                assert!(msg.starts_with("Failed to connect to Postgres:"), "{msg}");
                assert!(msg.contains("no_such_database"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    });

    stop_postgres_embedded(pg);
    Ok(())
}
