//! Template directory rendering

use super::substitute::{placeholders, substitute};
use super::variants::{build_variants, destinations};
use crate::config::Config;
use crate::error::PackagerError;
use crate::system::System;
use crate::utils::fs::ensure_dir_exists;
use anyhow::Result;
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Editor autosaves (`#name#`) and backups (`name~`)
static TEMPORARY_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^#.*#$|~$").expect("temporary file pattern is valid"));

/// Files produced by one [`render_directory`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Written files, relative to the output directory
    pub rendered: Vec<PathBuf>,
    /// Skipped editor files, relative to the template directory
    pub skipped: Vec<PathBuf>,
}

/// Whether a file name is an editor leftover that must not be rendered
#[must_use]
pub fn is_temporary_file(name: &str) -> bool {
    TEMPORARY_FILE.is_match(name)
}

/// Render every file of `template_dir` into `output_dir`
///
/// Placeholders are substituted with `config`. Nested directories are
/// mirrored. `output_dir` is created when missing and is never cleared.
///
/// # Errors
///
/// Returns an error if:
/// - A template cannot be read or an output file cannot be written
/// - `PYBUILD` variants are requested without `PROJECT_NAME`
pub fn render_directory(
    system: &dyn System,
    template_dir: &Path,
    output_dir: &Path,
    config: &Config,
) -> Result<RenderReport> {
    ensure_dir_exists(system, output_dir)
        .map_err(|e| PackagerError::template_io(output_dir, e))?;

    let entries = system
        .walk_dir(template_dir)
        .map_err(|e| PackagerError::template_io(template_dir, e))?;
    let variants = build_variants(config);
    let mut report = RenderReport::default();

    for entry in entries {
        let Ok(relative) = entry.path.strip_prefix(template_dir) else {
            continue;
        };
        let relative = relative.to_path_buf();

        if has_temporary_component(&relative) {
            debug!("Skipping {}", relative.display());
            if entry.is_file {
                report.skipped.push(relative);
            }
            continue;
        }

        if entry.is_dir {
            let target = output_dir.join(&relative);
            ensure_dir_exists(system, &target).map_err(|e| PackagerError::template_io(&target, e))?;
            continue;
        }
        if !entry.is_file {
            continue;
        }

        let template = system
            .read_to_string(&entry.path)
            .map_err(|e| PackagerError::template_io(&entry.path, e))?;
        let missing: Vec<String> = placeholders(&template)
            .into_iter()
            .filter(|key| !config.contains_key(key))
            .collect();
        if !missing.is_empty() {
            debug!(
                "{}: unresolved placeholders {}",
                relative.display(),
                missing.join(", ")
            );
        }

        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent = relative.parent().unwrap_or_else(|| Path::new(""));

        for (dest_name, dest_config) in destinations(&file_name, config, &variants)? {
            let dest_relative = parent.join(&dest_name);
            let target = output_dir.join(&dest_relative);
            system
                .write(&target, substitute(&template, &dest_config).as_bytes())
                .map_err(|e| PackagerError::template_io(&target, e))?;
            debug!("Rendered {}", dest_relative.display());
            report.rendered.push(dest_relative);
        }
    }

    Ok(report)
}

fn has_temporary_component(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => is_temporary_file(&name.to_string_lossy()),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporary_files() {
        assert!(is_temporary_file("#control#"));
        assert!(is_temporary_file("rules~"));
        assert!(is_temporary_file("##"));
        assert!(!is_temporary_file("control"));
        assert!(!is_temporary_file("#control"));
        assert!(!is_temporary_file("a~b"));
    }

    #[test]
    fn temporary_directory_hides_its_content() {
        assert!(has_temporary_component(Path::new("old~/control")));
        assert!(!has_temporary_component(Path::new("source/format")));
    }
}
