use std::path::Path;

use roxmltree::Document;

use super::ConnectionSettings;
use crate::error::PgConnError;

/// `AdapterPath` of the setting selected by default.
pub const DEFAULT_ADAPTER: &str = "PostgreSQL";

const ROOT_ELEMENT: &str = "Database";
const SETTING_ELEMENT: &str = "Setting";
const ADAPTER_ATTRIBUTE: &str = "AdapterPath";
const CONNECTION_STRING_ATTRIBUTE: &str = "ConnectionString";

pub(crate) fn load_file(path: &Path, adapter: &str) -> Result<ConnectionSettings, PgConnError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        PgConnError::ConfigError(format!("cannot read settings file {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), adapter, "loading xml settings");
    parse(&source, adapter)
}

/// Select `/Database/Setting[@AdapterPath=adapter]/@ConnectionString`.
pub(crate) fn parse(source: &str, adapter: &str) -> Result<ConnectionSettings, PgConnError> {
    let doc = Document::parse(source)?;
    let root = doc.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(PgConnError::ConfigError(format!(
            "expected <{ROOT_ELEMENT}> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let setting = root
        .children()
        .filter(|node| node.is_element() && node.tag_name().name() == SETTING_ELEMENT)
        .find(|node| node.attribute(ADAPTER_ATTRIBUTE) == Some(adapter))
        .ok_or_else(|| {
            PgConnError::ConfigError(format!(
                "no <{SETTING_ELEMENT}> with {ADAPTER_ATTRIBUTE}='{adapter}'"
            ))
        })?;

    let conn_str = setting
        .attribute(CONNECTION_STRING_ATTRIBUTE)
        .ok_or_else(|| {
            PgConnError::ConfigError(format!(
                "<{SETTING_ELEMENT} {ADAPTER_ATTRIBUTE}='{adapter}'> has no {CONNECTION_STRING_ATTRIBUTE} attribute"
            ))
        })?;

    Ok(ConnectionSettings::ConnectionString(conn_str.trim().to_string()))
}
