//! Escaping helpers for text that is interpolated into SQL.
//!
//! These follow libpq's `PQescapeStringConn`, `PQescapeLiteral` and
//! `PQescapeIdentifier`. PostgreSQL text cannot contain NUL, so any input
//! carrying one is rejected instead of being silently truncated.

use crate::error::PgConnError;

fn reject_nul(value: &str) -> Result<(), PgConnError> {
    if value.contains('\0') {
        return Err(PgConnError::ParameterError(
            "string contains a NUL byte and cannot be escaped".to_string(),
        ));
    }
    Ok(())
}

/// Escape `value` for use inside an already single-quoted SQL literal.
///
/// Single quotes are doubled. With `standard_conforming_strings = off` the
/// server also treats backslash as an escape character, so those are doubled too.
///
/// # Errors
/// Returns `PgConnError::ParameterError` if `value` contains a NUL byte.
pub fn escape_string(value: &str, standard_conforming_strings: bool) -> Result<String, PgConnError> {
    reject_nul(value)?;
    let mut out = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' if !standard_conforming_strings => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// Quote `value` as a complete SQL string literal.
///
/// Literals containing a backslash use the `E'...'` form (with a leading space,
/// like libpq) so they mean the same thing regardless of
/// `standard_conforming_strings`.
///
/// # Errors
/// Returns `PgConnError::ParameterError` if `value` contains a NUL byte.
pub fn escape_literal(value: &str) -> Result<String, PgConnError> {
    reject_nul(value)?;
    let has_backslash = value.contains('\\');
    let mut out = String::with_capacity(value.len() + 4);
    if has_backslash {
        out.push_str(" E");
    }
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    Ok(out)
}

/// Quote `value` as an SQL identifier.
///
/// # Errors
/// Returns `PgConnError::ParameterError` if `value` contains a NUL byte.
pub fn escape_identifier(value: &str) -> Result<String, PgConnError> {
    reject_nul(value)?;
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
    Ok(out)
}
