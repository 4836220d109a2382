//! Package build orchestration

use super::commands::run_interactive;
use super::render::{RenderReport, render_directory};
use crate::config::{Config, ConfigBuilder};
use crate::error::PackagerError;
use crate::git::Git;
use crate::system::System;
use crate::utils::fs::remove_dir_safe;
use crate::version::read_version_file;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// Template directory used when none is given
pub const DEFAULT_TEMPLATE_DIR: &str = "packaging/template/debian";
/// Output directory used when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "debian";
/// Arguments of the package build command
pub const DPKG_BUILDPACKAGE_ARGS: [&str; 5] = ["-b", "-tc", "-us", "-uc", "-r"];

/// Runs the OS package builder
pub trait PackageBuilder {
    /// Build the package in the current project
    ///
    /// # Errors
    ///
    /// Returns an error if the builder fails
    fn build_package(&self) -> Result<()>;
}

/// `dpkg-buildpackage` in a project directory
#[derive(Debug, Clone)]
pub struct DpkgBuilder {
    pub project_dir: PathBuf,
}

impl PackageBuilder for DpkgBuilder {
    fn build_package(&self) -> Result<()> {
        run_interactive("dpkg-buildpackage", &DPKG_BUILDPACKAGE_ARGS, &self.project_dir)
    }
}

/// Options of a package build
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub template_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Fills `PROJECT_VERSION` when the configuration has none
    pub version_file: Option<PathBuf>,
    pub pattern: String,
    pub check_clean: bool,
    /// Require `PROJECT_VERSION` to be the last tag
    pub check_version: bool,
    pub build_package: bool,
    pub keep_output: bool,
}

/// Result of a package build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub config: Config,
    pub rendered: RenderReport,
    pub built: bool,
}

/// Finalize a configuration, filling `PROJECT_VERSION` from a version file
///
/// # Errors
///
/// Returns an error if the version file is given but holds no version
pub fn resolve_config(
    system: &dyn System,
    builder: ConfigBuilder,
    version_file: Option<&std::path::Path>,
    pattern: &str,
) -> Result<Config> {
    let config = builder.build();
    match version_file {
        Some(path) if !config.contains_key("PROJECT_VERSION") => {
            let found = read_version_file(system, path, pattern, str::to_owned)?;
            debug!("PROJECT_VERSION = {} (from {})", found.version, path.display());
            Ok(config.with_value("PROJECT_VERSION", &found.version))
        }
        _ => Ok(config),
    }
}

/// Render the package files and optionally build the package
///
/// # Errors
///
/// Returns an error if:
/// - The working tree is dirty (with `check_clean`)
/// - `PROJECT_VERSION` differs from the last tag (with `check_version`)
/// - Rendering fails
/// - The package builder fails
pub fn run_build(
    system: &dyn System,
    git: &dyn Git,
    builder: &dyn PackageBuilder,
    options: &BuildOptions,
    config: ConfigBuilder,
) -> Result<BuildReport> {
    if options.check_clean {
        let changes = git.uncommitted_changes()?;
        if !changes.trim().is_empty() {
            return Err(PackagerError::git_dirty(format!(
                "{}\nPlease commit before packaging or use --no-check-uncommitted",
                changes.trim()
            ))
            .into());
        }
    }

    let config = resolve_config(
        system,
        config,
        options.version_file.as_deref(),
        &options.pattern,
    )?;

    if options.check_version {
        let version = config.get("PROJECT_VERSION").unwrap_or_default();
        let tag = git.last_tag()?;
        if version != tag {
            return Err(PackagerError::version_mismatch(version, tag).into());
        }
    }

    remove_dir_safe(system, &options.output_dir)?;

    let mut rendered = RenderReport::default();
    for template_dir in &options.template_dirs {
        info!(
            "Rendering {} into {}",
            template_dir.display(),
            options.output_dir.display()
        );
        let report = render_directory(system, template_dir, &options.output_dir, &config)?;
        rendered.rendered.extend(report.rendered);
        rendered.skipped.extend(report.skipped);
    }

    if options.build_package {
        info!("Building package");
        builder.build_package()?;
    }

    if !options.keep_output {
        remove_dir_safe(system, &options.output_dir)?;
    }

    Ok(BuildReport {
        config,
        rendered,
        built: options.build_package,
    })
}
