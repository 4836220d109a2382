//! Caller-supplied version and reference patterns
//!
//! Patterns come from the command line and are compiled lazily, once per
//! distinct pattern string.

use crate::error::PackagerError;
use anyhow::Result;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

/// Matches `VERSION = "1.2.3"`, `APP_VERSION '1.2.3'`, `VERSION=1.2.3`, ...
pub const DEFAULT_VERSION_PATTERN: &str =
    r#"(?:[a-zA-Z_][a-zA-Z0-9_]*)?VERSION\b\s*(?:=\s*)?['"]?([^'" ]*)"#;

static CACHE: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Compile `pattern`, reusing a previous compilation of the same string
///
/// # Errors
///
/// Returns a pattern error if the regex is invalid or has no capture group
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    if let Ok(cache) = CACHE.lock()
        && let Some(regex) = cache.get(pattern)
    {
        return Ok(regex.clone());
    }

    let regex = Regex::new(pattern).map_err(|e| PackagerError::pattern(pattern, e.to_string()))?;
    if regex.captures_len() < 2 {
        return Err(PackagerError::pattern(
            pattern,
            "the pattern needs a capturing group around the version",
        )
        .into());
    }

    if let Ok(mut cache) = CACHE.lock() {
        cache.insert(pattern.to_owned(), regex.clone());
    }
    Ok(regex)
}

/// Pattern locating the reference version of an application downstream
///
/// An explicit pattern wins. Otherwise the pattern is derived from the
/// application name, e.g. `myapp_version = "1.2.3"` or `MYAPP_TAG=1.2.3`
/// for the name `myapp` / `MYAPP`.
///
/// # Errors
///
/// Returns a configuration error when neither a pattern nor an application
/// name is available, or a pattern error when the pattern is invalid
pub fn build_reference_pattern(
    pattern: Option<&str>,
    application_name: Option<&str>,
) -> Result<Regex> {
    if let Some(pattern) = pattern.filter(|p| !p.is_empty()) {
        return compile_pattern(pattern);
    }

    let Some(name) = application_name.filter(|n| !n.is_empty()) else {
        return Err(PackagerError::configuration(
            "--pattern-reference is missing (or set --application-name or DEFAULT_REPO_NAME)",
        )
        .into());
    };

    compile_pattern(&format!(
        r#"{}_?(?:[vV]ersion|VERSION|[tT]ag|TAG)?\b\s*(?:=\s*)?['"]?([^'" ]*)"#,
        regex::escape(name)
    ))
}
