mod args;
mod logging;

use clap::Parser;
use pgconn::prelude::*;
use tracing::Level;

use crate::args::{Action, Args, CliConfig};
use crate::logging::LogWriter;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = CliConfig::from_args(args).unwrap_or_else(|err| err.exit());
    let writer = LogWriter::new(config.log.clone()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(level)
        .init();

    let config_json = serde_json::to_string(&config).unwrap_or_else(|_| "{}".to_string());
    tracing::debug!("config: {}", config_json);

    if let Err(err) = run(&config).await {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn load_settings(config: &CliConfig) -> Result<ConnectionSettings, PgConnError> {
    match (config.format, &config.adapter) {
        (SettingsFormat::Xml, Some(adapter)) => {
            ConnectionSettings::from_xml_file_for_adapter(&config.settings, adapter)
        }
        (format, _) => format.load(&config.settings),
    }
}

async fn run(config: &CliConfig) -> Result<(), PgConnError> {
    let settings = load_settings(config)?;
    let conn = PgConnection::connect(&settings).await?;

    match &config.action {
        Action::Query(sql) => {
            let mut result = conn.query(sql).await?;
            while let Some(row) = result.fetch_assoc() {
                println!("{}", row.to_json());
            }
            tracing::info!(
                rows = result.num_rows(),
                rows_affected = result.rows_affected(),
                "done"
            );
        }
        Action::Escape(text) => println!("{}", conn.escape_string(text)?),
    }

    conn.close().await
}
