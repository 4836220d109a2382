//! Debian changelog entries
//!
//! Entries keep `%TARGET_NAME%`, `%PKG_DISTRIBUTION%` (and `%PROJECT_NAME%`
//! when the project name is unknown) as placeholders: the changelog lives in
//! the template directory and is resolved per target at build time.

use super::commands::run_interactive;
use crate::config::Config;
use crate::config::defaults::{DEFAULT_MAINTAINER, DEFAULT_URGENCY, DEFAULT_UTC};
use crate::error::PackagerError;
use crate::system::System;
use anyhow::{Context as _, Result};
use chrono::{DateTime, FixedOffset, Utc};
use core::fmt::Write as _;
use std::path::Path;
use tempfile::Builder;
use tracing::info;

/// Default editor when `EDITOR` is unset
pub const DEFAULT_EDITOR: &str = "nano";

/// Provides the free-form text of a changelog entry
pub trait ChangelogSource {
    /// Text of the entry for `version`, one change per line
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be obtained
    fn read_entry(&self, version: &str) -> Result<String>;
}

/// Opens an editor on a temporary file and returns what was written
#[derive(Debug, Clone)]
pub struct EditorSource {
    /// Editor command line, e.g. `vi` or `code --wait`
    pub editor: String,
}

impl EditorSource {
    /// Editor from the `EDITOR` environment variable
    #[must_use]
    pub fn from_env(system: &dyn System) -> Self {
        let editor = system
            .env_var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDITOR.to_owned());
        Self { editor }
    }
}

impl ChangelogSource for EditorSource {
    fn read_entry(&self, version: &str) -> Result<String> {
        let file = Builder::new()
            .prefix(&format!("{version}-"))
            .suffix("-changelog.tmp")
            .tempfile()
            .context("Failed to create temporary changelog file")?;
        let path = file.path().to_string_lossy().into_owned();

        let mut words = self.editor.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| PackagerError::configuration("EDITOR is empty"))?;
        let mut args: Vec<&str> = words.collect();
        args.push(&path);

        let working_dir = std::env::temp_dir();
        run_interactive(program, &args, &working_dir)?;

        std::fs::read_to_string(file.path())
            .with_context(|| format!("Failed to read changelog from editor: {path}"))
    }
}

/// Fixed text, for non-interactive use
#[derive(Debug, Clone)]
pub struct StaticSource(pub String);

impl ChangelogSource for StaticSource {
    fn read_entry(&self, _version: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Header and trailer data of a changelog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub project_name: Option<String>,
    pub version: String,
    pub urgency: String,
    pub maintainer: String,
    /// Offset such as `0200`, `+0530` or `-0400`
    pub utc: String,
}

impl ChangelogEntry {
    /// Entry for `version` using the urgency, maintainer and offset of `config`
    #[must_use]
    pub fn from_config(config: &Config, version: &str) -> Self {
        Self {
            project_name: config
                .get("PROJECT_NAME")
                .filter(|n| !n.is_empty())
                .map(str::to_owned),
            version: version.to_owned(),
            urgency: config.get("URGENCY").unwrap_or(DEFAULT_URGENCY).to_owned(),
            maintainer: config
                .get("MAINTAINER")
                .unwrap_or(DEFAULT_MAINTAINER)
                .to_owned(),
            utc: config.get("UTC").unwrap_or(DEFAULT_UTC).to_owned(),
        }
    }
}

/// Parse an offset such as `0200`, `+0200` or `-0530`
///
/// # Errors
///
/// Returns a configuration error for anything else
pub fn parse_utc_offset(utc: &str) -> Result<FixedOffset> {
    let invalid = || PackagerError::configuration(format!("Invalid UTC offset: {utc:?}"));

    let (sign, digits) = match utc.as_bytes().first() {
        Some(b'-') => (-1, &utc[1..]),
        Some(b'+') => (1, &utc[1..]),
        _ => (1, utc),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid().into());
    }

    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(|| invalid().into())
}

/// Format a changelog entry
///
/// Blank lines of `body` are dropped, every other line becomes a bullet.
///
/// # Errors
///
/// Returns a configuration error if the body has no content or the UTC
/// offset is invalid
pub fn format_entry(entry: &ChangelogEntry, body: &str, now: DateTime<Utc>) -> Result<String> {
    let mut changes = String::new();
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(changes, "  * {line}");
    }
    if changes.is_empty() {
        return Err(PackagerError::configuration("Change log is empty").into());
    }

    let offset = parse_utc_offset(&entry.utc)?;
    let date = now.with_timezone(&offset).format("%a, %d %b %Y %H:%M:%S %z");
    let project = entry.project_name.as_deref().unwrap_or("%PROJECT_NAME%");

    Ok(format!(
        "{project} ({}%TARGET_NAME%) %PKG_DISTRIBUTION%; urgency={}\n\n{changes}\n\n -- {}  {date}\n\n",
        entry.version, entry.urgency, entry.maintainer
    ))
}

/// Prepend a formatted entry to an existing changelog
///
/// # Errors
///
/// Returns a template error if the changelog cannot be read or written
pub fn prepend_entry(system: &dyn System, changelog_path: &Path, entry: &str) -> Result<()> {
    let existing = system
        .read_to_string(changelog_path)
        .map_err(|e| PackagerError::template_io(changelog_path, e))?;

    let mut content = String::with_capacity(entry.len() + existing.len());
    content.push_str(entry);
    content.push_str(&existing);

    system
        .write(changelog_path, content.as_bytes())
        .map_err(|e| PackagerError::template_io(changelog_path, e))?;
    info!("Updated {}", changelog_path.display());
    Ok(())
}
