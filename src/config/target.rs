//! Target file parsing
//!
//! Target files are line oriented:
//!
//! ```text
//! # comment
//! include common
//! PKG_DISTRIBUTION = stable
//! ```
//!
//! `include` paths are relative to the directory of the file that contains
//! them and are merged at the position of the directive.

use super::{ConfigMap, KEY_PATTERN};
use crate::error::PackagerError;
use crate::system::System;
use crate::utils::path::{normalize_path, resolve_sibling};
use anyhow::{Context as _, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

const INCLUDE_DIRECTIVE: &str = "include ";

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({KEY_PATTERN})\s*=(.*)")).expect("assignment pattern is valid")
});

/// Merge the target file at `path` into `values`
///
/// # Errors
///
/// Returns an error if:
/// - `path` or an included file does not exist or cannot be read
/// - An include chain refers back to a file being read
pub fn read_config(system: &dyn System, path: &Path, values: &mut ConfigMap) -> Result<()> {
    if !system.is_file(path) {
        return Err(PackagerError::configuration(format!(
            "Target file not found: {}",
            path.display()
        ))
        .into());
    }

    let mut stack = Vec::new();
    read_config_file(system, path, values, &mut stack)
}

fn read_config_file(
    system: &dyn System,
    path: &Path,
    values: &mut ConfigMap,
    stack: &mut Vec<PathBuf>,
) -> Result<()> {
    let normalized = normalize_path(path);
    if stack.contains(&normalized) {
        return Err(PackagerError::configuration(format!(
            "Include cycle detected: {} is already being read",
            path.display()
        ))
        .into());
    }

    let content = system
        .read_to_string(path)
        .with_context(|| format!("Failed to read target file: {}", path.display()))?;

    debug!("Reading target file {}", path.display());
    stack.push(normalized);

    for line in content.lines() {
        if let Some(include) = line.strip_prefix(INCLUDE_DIRECTIVE) {
            let included = resolve_sibling(path, include.trim());
            if !system.is_file(&included) {
                return Err(PackagerError::configuration(format!(
                    "Included file not found: {} (included from {})",
                    included.display(),
                    path.display()
                ))
                .into());
            }
            read_config_file(system, &included, values, stack)?;
        } else if let Some(caps) = ASSIGNMENT.captures(line) {
            values.insert(caps[1].to_owned(), caps[2].trim().to_owned());
        }
    }

    stack.pop();
    Ok(())
}
