//! Downstream repository synchronization
//!
//! A downstream repository pins the released version of the application in
//! a reference file. Syncing switches that repository to its branch,
//! rewrites the reference and optionally commits and pushes it.

use super::bump::{Publication, bump_file, publish};
use crate::error::PackagerError;
use crate::git::Git;
use crate::system::System;
use crate::version::{build_reference_pattern, keep_version};
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing::info;

/// Settings of a downstream sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamSync {
    /// Display name used in prompts and logs
    pub repository_name: String,
    pub branch: String,
    /// Reference file, relative to the downstream working tree
    pub reference_file: PathBuf,
    /// Explicit reference pattern
    pub pattern: Option<String>,
    /// Used to derive the reference pattern and the commit message
    pub application_name: Option<String>,
    pub pull: bool,
    pub commit: bool,
    pub push: bool,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

/// Outcome of a downstream sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub previous_version: String,
    pub version: String,
    pub committed: bool,
}

/// Pin `version` in the downstream repository handled by `git`
///
/// # Errors
///
/// Returns an error if:
/// - The operator declines the confirmation
/// - A git command fails
/// - The reference file is missing or the reference pattern does not match
pub fn sync_downstream(
    system: &dyn System,
    git: &dyn Git,
    settings: &DownstreamSync,
    version: &str,
) -> Result<SyncReport> {
    let pattern = build_reference_pattern(
        settings.pattern.as_deref(),
        settings.application_name.as_deref(),
    )?;

    if !settings.assume_yes {
        let question = format!(
            "Use \"{}\" branch for \"{}\" ?",
            settings.branch, settings.repository_name
        );
        if !system.confirm(&question).context("Failed to read answer")? {
            return Err(PackagerError::cancelled(format!(
                "{} was not updated",
                settings.repository_name
            ))
            .into());
        }
    }

    info!(
        "Syncing {} ({}) to {version}",
        settings.repository_name, settings.branch
    );
    git.fetch_all()?;
    git.switch(&settings.branch)?;
    if settings.pull {
        git.pull_rebase("origin", &settings.branch)?;
    }

    let reference_file = git.workdir().join(&settings.reference_file);
    let previous = bump_file(
        system,
        &reference_file,
        pattern.as_str(),
        keep_version,
        version,
    )?;

    if settings.commit {
        let application = settings
            .application_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("application");
        let push = settings.push
            && (settings.assume_yes
                || system
                    .confirm(&format!(
                        "git push origin \"{}\" on \"{}\" repository ?",
                        settings.branch, settings.repository_name
                    ))
                    .context("Failed to read answer")?);
        publish(
            git,
            &Publication {
                commit_message: format!("{application} updated to {version}"),
                tag: None,
                annotate: false,
                remote: "origin".to_owned(),
                branch: Some(settings.branch.clone()),
                push,
            },
        )?;
    }

    Ok(SyncReport {
        previous_version: previous.version,
        version: version.to_owned(),
        committed: settings.commit,
    })
}
