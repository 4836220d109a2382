//! `pkgsmith` - Package templating and release tagging
//!
//! This library resolves a layered `KEY = value` configuration, renders
//! package template directories with it, and drives the version bump,
//! tag and downstream sync workflow of a release.

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod operations;
pub mod system;
pub mod utils;
pub mod version;

use anyhow::Result;
use chrono::Utc;
use cli::{Args, Command, commands};
use error::PackagerError;
use git::{Git, SystemGit};
use operations::build::DpkgBuilder;
use operations::changelog::{ChangelogSource, EditorSource, StaticSource};
use operations::release::{DefaultHook, ReleaseHook};
use system::{RealSystem, System};
use tracing::{info, warn};

/// Main entry point for the pkgsmith library
///
/// # Errors
///
/// Returns the error of the selected command
pub fn run(args: Args) -> Result<()> {
    run_with_hook(args, &DefaultHook)
}

/// Run a command with project specific release hooks
///
/// # Errors
///
/// Returns the error of the selected command
pub fn run_with_hook(args: Args, hook: &dyn ReleaseHook) -> Result<()> {
    let system = RealSystem::new();
    let current_dir = system.current_dir()?;

    match args.command {
        Command::Version(version_args) => {
            println!("{}", commands::execute_version(&system, &version_args, hook)?);
        }
        Command::Config(config_args) => {
            print!("{}", commands::execute_config(&system, &config_args)?);
        }
        Command::Build(build_args) => {
            let git = SystemGit::new(&current_dir);
            let builder = DpkgBuilder {
                project_dir: current_dir.clone(),
            };
            let report = commands::execute_build(&system, &git, &builder, &build_args)?;
            info!(
                "Rendered {} file(s) for {} {}",
                report.rendered.rendered.len(),
                report.config.get("PROJECT_NAME").unwrap_or("<unnamed>"),
                report.config.get("PROJECT_VERSION").unwrap_or("<no version>")
            );
        }
        Command::CreateTag(tag_args) => {
            let git = SystemGit::new(&current_dir);
            let downstream_git = match &tag_args.downstream.downstream_path {
                Some(path) => Some(SystemGit::new(commands::resolve_path(&system, path)?)),
                None => None,
            };
            let report = commands::execute_create_tag(
                &system,
                &git,
                downstream_git.as_ref().map(|g| g as &dyn Git),
                hook,
                &tag_args,
            )?;
            let stages: Vec<String> = report.stages.iter().map(ToString::to_string).collect();
            info!(
                "Released {} (was {}): {}",
                report.version,
                report.previous_version,
                stages.join(", ")
            );
        }
        Command::Sync(sync_args) => {
            let Some(path) = &sync_args.downstream.downstream_path else {
                return Err(PackagerError::configuration(
                    "-u / --downstream-path is required",
                )
                .into());
            };
            let downstream_git = SystemGit::new(commands::resolve_path(&system, path)?);
            let report = commands::execute_sync(&system, &downstream_git, hook, &sync_args)?;
            info!(
                "Downstream updated from {} to {}",
                report.previous_version, report.version
            );
        }
        Command::Changelog(changelog_args) => {
            let source: Box<dyn ChangelogSource> = if changelog_args.messages.is_empty() {
                Box::new(EditorSource::from_env(&system))
            } else {
                Box::new(StaticSource(changelog_args.messages.join("\n")))
            };
            let updated =
                commands::execute_changelog(&system, source.as_ref(), &changelog_args, Utc::now())?;
            if updated.is_empty() {
                warn!("No changelog found in the template directories");
            }
        }
    }

    Ok(())
}
