//! CLI command implementations
//!
//! Each command maps its arguments onto an operation. Collaborators are
//! passed in so that commands run the same against the real system and
//! against mocks.

use super::args::{
    BuildArgs, ChangelogArgs, ConfigArgs, ConfigCommandArgs, ConfigFormat, CreateTagArgs,
    SyncArgs, VersionArgs,
};
use crate::config::{ConfigBuilder, load_defaults};
use crate::error::PackagerError;
use crate::git::Git;
use crate::operations::build::{BuildOptions, BuildReport, PackageBuilder, resolve_config, run_build};
use crate::operations::changelog::{ChangelogEntry, ChangelogSource, format_entry, prepend_entry};
use crate::operations::release::{ReleaseHook, ReleaseOptions, ReleaseReport, ReleaseWorkflow};
use crate::operations::sync::{SyncReport, sync_downstream};
use crate::system::System;
use crate::version::read_version_file;
use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolve `path` against the current directory of `system`
///
/// # Errors
///
/// Returns an error if the current directory is unavailable
pub fn resolve_path(system: &dyn System, path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let current_dir = system
        .current_dir()
        .context("Failed to get current directory")?;
    Ok(current_dir.join(path))
}

/// Defaults, target file and overrides, not yet normalized
///
/// # Errors
///
/// Returns an error if a layer cannot be loaded
pub fn config_layers(system: &dyn System, args: &ConfigArgs) -> Result<ConfigBuilder> {
    let mut builder = load_defaults(system, &args.defaults())?;
    if let Some(target_file) = &args.target_file {
        builder = builder.read_target(system, &resolve_path(system, target_file)?)?;
    }
    builder.apply_overrides(&args.variables)
}

/// `version`: the version found in the version file
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no version
pub fn execute_version(
    system: &dyn System,
    args: &VersionArgs,
    hook: &dyn ReleaseHook,
) -> Result<String> {
    let path = resolve_path(system, &args.version_file)?;
    let found = read_version_file(system, &path, &args.pattern_version, |v| {
        hook.normalize_version(v)
    })?;
    Ok(found.version)
}

/// `config`: the resolved configuration in the requested format
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved or serialized
pub fn execute_config(system: &dyn System, args: &ConfigCommandArgs) -> Result<String> {
    let builder = config_layers(system, &args.config)?;
    let version_file = match &args.version.version_file {
        Some(path) => Some(resolve_path(system, path)?),
        None => None,
    };
    let config = resolve_config(
        system,
        builder,
        version_file.as_deref(),
        &args.version.pattern_version,
    )?;

    match args.format {
        ConfigFormat::Text => Ok(config.to_text()),
        ConfigFormat::Json => {
            let mut json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration to JSON")?;
            json.push('\n');
            Ok(json)
        }
        ConfigFormat::Yaml => {
            serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")
        }
    }
}

/// `build`: render the templates and optionally build the package
///
/// # Errors
///
/// Returns an error if a check, the rendering or the package build fails
pub fn execute_build(
    system: &dyn System,
    git: &dyn Git,
    builder: &dyn PackageBuilder,
    args: &BuildArgs,
) -> Result<BuildReport> {
    let layers = config_layers(system, &args.config)?;
    let version_file = match &args.version.version_file {
        Some(path) => Some(resolve_path(system, path)?),
        None => None,
    };
    let template_dirs = args
        .package_template_dir
        .iter()
        .map(|dir| resolve_path(system, dir))
        .collect::<Result<Vec<_>>>()?;

    let options = BuildOptions {
        template_dirs,
        output_dir: resolve_path(system, &args.output_build)?,
        version_file,
        pattern: args.version.pattern_version.clone(),
        check_clean: !(args.no_check || args.no_check_uncommitted),
        check_version: !(args.no_check || args.no_check_version),
        build_package: args.build_package,
        keep_output: args.no_clean,
    };

    run_build(system, git, builder, &options, layers)
}

/// `create-tag`: bump, commit, tag and push, then sync downstream
///
/// # Errors
///
/// Returns an error if:
/// - The downstream repository is required but not configured
/// - A release check fails
/// - A file or git operation fails
pub fn execute_create_tag(
    system: &dyn System,
    git: &dyn Git,
    downstream_git: Option<&dyn Git>,
    hook: &dyn ReleaseHook,
    args: &CreateTagArgs,
) -> Result<ReleaseReport> {
    let Some(version_file) = &args.version.version_file else {
        return Err(PackagerError::configuration("--version-file is missing").into());
    };

    let downstream = if args.no_downstream_update {
        None
    } else {
        if downstream_git.is_none() {
            return Err(PackagerError::configuration(
                "use -U or add the downstream repository (-u / --downstream-path)",
            )
            .into());
        }
        let Some(settings) = args.downstream.settings() else {
            return Err(PackagerError::configuration("--reference-file is missing").into());
        };
        Some(settings)
    };

    let mut options = ReleaseOptions::new(
        resolve_path(system, version_file)?,
        args.version.pattern_version.clone(),
    );
    options.version = args.force_version.clone();
    options.force = args.force;
    options.release_line = args.release_line.clone();
    options.check_clean =
        !(args.no_check_uncommitted || args.downstream.ignore_change_and_not_pull);
    options.commit = !args.no_commit;
    options.annotate = args.annotate;
    options.push = !args.no_push;
    options.remote = args.remote.clone();
    options.branch = args.branch.clone();
    options.commit_message = args.message.clone();
    options.downstream = downstream;

    let mut workflow = ReleaseWorkflow::new(system, git, hook);
    if let Some(downstream_git) = downstream_git {
        workflow = workflow.with_downstream(downstream_git);
    }
    workflow.run(&options)
}

/// `sync`: pin the current (or forced) version downstream
///
/// # Errors
///
/// Returns an error if the version cannot be determined or the sync fails
pub fn execute_sync(
    system: &dyn System,
    downstream_git: &dyn Git,
    hook: &dyn ReleaseHook,
    args: &SyncArgs,
) -> Result<SyncReport> {
    let Some(settings) = args.downstream.settings() else {
        return Err(PackagerError::configuration("--reference-file is missing").into());
    };

    let version = match (&args.force_version, &args.version.version_file) {
        (Some(version), _) => version.clone(),
        (None, Some(path)) => {
            let path = resolve_path(system, path)?;
            read_version_file(system, &path, &args.version.pattern_version, |v| {
                hook.normalize_version(v)
            })?
            .version
        }
        (None, None) => {
            return Err(PackagerError::configuration(
                "--version-file or --force-version is required",
            )
            .into());
        }
    };

    sync_downstream(system, downstream_git, &settings, &version)
}

/// `changelog`: prepend an entry to the changelog of every template directory
///
/// Directories without a changelog are skipped. Returns the updated files.
///
/// # Errors
///
/// Returns an error if:
/// - `PROJECT_VERSION` is unknown
/// - The entry text is empty
/// - A changelog cannot be updated
pub fn execute_changelog(
    system: &dyn System,
    source: &dyn ChangelogSource,
    args: &ChangelogArgs,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let builder = config_layers(system, &args.config)?;
    let version_file = match &args.version.version_file {
        Some(path) => Some(resolve_path(system, path)?),
        None => None,
    };
    let config = resolve_config(
        system,
        builder,
        version_file.as_deref(),
        &args.version.pattern_version,
    )?;

    let Some(version) = config.get("PROJECT_VERSION").filter(|v| !v.is_empty()) else {
        return Err(PackagerError::configuration(
            "Unknown PROJECT_VERSION. Use --version-file, --project-version or -s PROJECT_VERSION=...",
        )
        .into());
    };

    let body = source.read_entry(version)?;
    let entry = format_entry(&ChangelogEntry::from_config(&config, version), &body, now)?;

    let mut updated = Vec::new();
    for template_dir in &args.package_template_dir {
        let changelog = resolve_path(system, template_dir)?.join("changelog");
        if !system.is_file(&changelog) {
            info!("No changelog in {}, skipped", template_dir.display());
            continue;
        }
        prepend_entry(system, &changelog, &entry)?;
        updated.push(changelog);
    }

    Ok(updated)
}
