use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{ConnectionParams, ConnectionSettings, DEFAULT_CHARSET};
use crate::error::PgConnError;

pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASS: &str = "DB_PASS";
pub const DB_NAME: &str = "DB_NAME";
pub const CHARSET: &str = "CHARSET";

static DEFINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"define\s*\(\s*['"]([A-Za-z_][A-Za-z0-9_]*)['"]\s*,\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|(-?[0-9]+))\s*\)"#,
    )
    .expect("valid define regex")
});

static TIMEZONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"date_default_timezone_set\s*\(\s*(?:'([^']*)'|"([^"]*)")\s*\)"#)
        .expect("valid timezone regex")
});

pub(crate) fn load_file(path: &Path) -> Result<ConnectionSettings, PgConnError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        PgConnError::ConfigError(format!("cannot read settings file {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "loading constants settings");
    parse(&source)
}

pub(crate) fn parse(source: &str) -> Result<ConnectionSettings, PgConnError> {
    let code = strip_comments(source);
    let defines = collect_defines(&code);

    let required = |name: &str| {
        defines
            .get(name)
            .cloned()
            .ok_or_else(|| PgConnError::ConfigError(format!("{name} is not defined")))
    };

    let port_text = required(DB_PORT)?;
    let port = port_text.trim().parse::<u16>().map_err(|_| {
        PgConnError::ConfigError(format!("{DB_PORT} is not a valid port: {port_text}"))
    })?;

    let timezone = TIMEZONE_PATTERN.captures(&code).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    });

    Ok(ConnectionSettings::Params(ConnectionParams {
        host: Some(required(DB_HOST)?),
        port: Some(port),
        user: Some(required(DB_USER)?),
        password: Some(required(DB_PASS)?),
        dbname: Some(required(DB_NAME)?),
        charset: defines
            .get(CHARSET)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
        timezone,
    }))
}

/// Later definitions of the same name override earlier ones.
fn collect_defines(code: &str) -> HashMap<String, String> {
    let mut defines = HashMap::new();
    for caps in DEFINE_PATTERN.captures_iter(code) {
        let name = caps[1].to_string();
        let value = if let Some(single) = caps.get(2) {
            unescape_single_quoted(single.as_str())
        } else if let Some(double) = caps.get(3) {
            unescape_double_quoted(double.as_str())
        } else if let Some(number) = caps.get(4) {
            number.as_str().to_string()
        } else {
            continue;
        };
        defines.insert(name, value);
    }
    defines
}

// Drops `//`, `#` and `/* */` comments that sit outside string literals.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                out.push(ch);
            }
            '#' => skip_line(&mut chars),
            '/' if chars.peek() == Some(&'/') => skip_line(&mut chars),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while let Some(c) = chars.next() {
        if c == '\n' {
            break;
        }
    }
}

fn unescape_single_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some(&next @ ('\'' | '\\')) => {
                    out.push(next);
                    chars.next();
                }
                _ => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn unescape_double_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('\\' | '"' | '$')) => out.push(c),
            _ => {
                out.push('\\');
                continue;
            }
        }
        chars.next();
    }
    out
}
