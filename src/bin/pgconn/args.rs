use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use pgconn::SettingsFormat;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a statement against PostgreSQL using a settings file")]
#[command(group(ArgGroup::new("action").required(true).multiple(false).args(["query", "escape"])))]
pub(crate) struct Args {
    /// Settings file (`appsettings.xml` or a constants file)
    #[arg(long)]
    pub(crate) settings: PathBuf,
    /// Settings format; inferred from the file extension when omitted
    #[arg(long, value_enum)]
    pub(crate) format: Option<SettingsFormat>,
    /// `AdapterPath` of the XML setting to use (XML settings only; default `PostgreSQL`)
    #[arg(long)]
    pub(crate) adapter: Option<String>,
    /// SQL to run
    #[arg(long)]
    pub(crate) query: Option<String>,
    /// Text to escape for a single-quoted literal
    #[arg(long)]
    pub(crate) escape: Option<String>,
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
    #[arg(long)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Action {
    Query(String),
    Escape(String),
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CliConfig {
    pub(crate) settings: PathBuf,
    pub(crate) format: SettingsFormat,
    pub(crate) adapter: Option<String>,
    #[serde(skip_serializing)]
    pub(crate) action: Action,
    pub(crate) log: Option<PathBuf>,
    pub(crate) verbose: bool,
}

impl CliConfig {
    pub(crate) fn from_args(args: Args) -> Result<Self, clap::Error> {
        let format = args
            .format
            .unwrap_or_else(|| SettingsFormat::from_path(&args.settings));
        if format == SettingsFormat::Constants && args.adapter.is_some() {
            return Err(Args::command().error(
                ErrorKind::ArgumentConflict,
                "--adapter only applies to XML settings files",
            ));
        }
        let action = match (args.query, args.escape) {
            (Some(sql), None) => Action::Query(sql),
            (None, Some(text)) => Action::Escape(text),
            _ => unreachable!("the `action` group requires exactly one of --query and --escape"),
        };
        Ok(CliConfig {
            settings: args.settings,
            format,
            adapter: args.adapter,
            action,
            log: args.log,
            verbose: args.verbose,
        })
    }
}
