//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-print any serializable value to stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", to_string(value)?);
    Ok(())
}

/// Pretty-print a value to a string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// ```json
/// { "error": true, "message": "..." }
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_error(message: &str) -> Result<String> {
    to_string(&serde_json::json!({
        "error": true,
        "message": message,
    }))
}
