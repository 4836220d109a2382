//! Release tag workflow
//!
//! Checks the working tree, computes the next version, rewrites the version
//! file, then commits, tags and pushes. Every check runs before the first
//! mutation, so a failed check leaves the repository untouched.

use super::bump::{Publication, publish, write_bumped};
use super::sync::{DownstreamSync, SyncReport, sync_downstream};
use crate::error::{PackagerError, TagNamespace};
use crate::git::Git;
use crate::system::System;
use crate::version::{less_than, next_patch_version, read_version_file, same_release_line};
use anyhow::Result;
use core::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Commit message of a release; `{version}` is replaced by the new version
pub const DEFAULT_COMMIT_MESSAGE: &str = "Version {version}";

/// Project specific customization points of a release
pub trait ReleaseHook {
    /// Normalize the version read from the version file
    fn normalize_version(&self, version: &str) -> String {
        version.to_owned()
    }

    /// Called after the version file was rewritten, before any git command
    ///
    /// # Errors
    ///
    /// An error aborts the release before anything is committed
    fn after_update(&self, _version: &str) -> Result<()> {
        Ok(())
    }
}

/// Hook that keeps versions as they are and does nothing after updates
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHook;

impl ReleaseHook for DefaultHook {}

/// Workflow stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReleaseStage {
    CheckClean,
    ExtractVersion,
    CheckMonotonic,
    CheckTag,
    RewriteFile,
    CommitTag,
    Push,
    SyncDownstream,
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::CheckClean => "check-clean",
            Self::ExtractVersion => "extract-version",
            Self::CheckMonotonic => "check-monotonic",
            Self::CheckTag => "check-tag",
            Self::RewriteFile => "rewrite-file",
            Self::CommitTag => "commit-tag",
            Self::Push => "push",
            Self::SyncDownstream => "sync-downstream",
        };
        f.write_str(name)
    }
}

/// Options of a release
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    pub version_file: PathBuf,
    pub pattern: String,
    /// Explicit new version; defaults to the next patch version
    pub version: Option<String>,
    /// Accept a version that is not greater than the current one
    pub force: bool,
    /// Regex prefix both versions must share
    pub release_line: Option<String>,
    pub check_clean: bool,
    pub commit: bool,
    pub annotate: bool,
    pub push: bool,
    pub remote: String,
    /// Branch to push; `None` pushes the current branch
    pub branch: Option<String>,
    /// Template of the commit message, see [`DEFAULT_COMMIT_MESSAGE`]
    pub commit_message: String,
    pub downstream: Option<DownstreamSync>,
}

impl ReleaseOptions {
    /// Options with every check enabled, committing and pushing to `origin`
    #[must_use]
    pub fn new<P: Into<PathBuf>, S: Into<String>>(version_file: P, pattern: S) -> Self {
        Self {
            version_file: version_file.into(),
            pattern: pattern.into(),
            version: None,
            force: false,
            release_line: None,
            check_clean: true,
            commit: true,
            annotate: false,
            push: true,
            remote: "origin".to_owned(),
            branch: None,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_owned(),
            downstream: None,
        }
    }
}

/// What a release did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReport {
    pub previous_version: String,
    pub version: String,
    pub stages: Vec<ReleaseStage>,
    pub downstream: Option<SyncReport>,
}

/// Release tag workflow bound to its collaborators
pub struct ReleaseWorkflow<'a> {
    system: &'a dyn System,
    git: &'a dyn Git,
    hook: &'a dyn ReleaseHook,
    downstream_git: Option<&'a dyn Git>,
}

impl<'a> ReleaseWorkflow<'a> {
    #[must_use]
    pub fn new(system: &'a dyn System, git: &'a dyn Git, hook: &'a dyn ReleaseHook) -> Self {
        Self {
            system,
            git,
            hook,
            downstream_git: None,
        }
    }

    /// Git handle of the downstream repository
    #[must_use]
    pub fn with_downstream(mut self, git: &'a dyn Git) -> Self {
        self.downstream_git = Some(git);
        self
    }

    /// Run the workflow
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The working tree is dirty
    /// - The version file holds no version
    /// - The new version is not greater than the current one, or leaves
    ///   the release line
    /// - The tag already exists locally or on the remote
    /// - A file or git operation fails
    pub fn run(&self, options: &ReleaseOptions) -> Result<ReleaseReport> {
        let mut stages = Vec::new();

        let downstream = match (&options.downstream, self.downstream_git) {
            (Some(settings), Some(git)) => Some((settings, git)),
            (Some(_), None) => {
                return Err(PackagerError::configuration(
                    "downstream sync requested without a downstream repository",
                )
                .into());
            }
            (None, _) => None,
        };

        if options.check_clean {
            stages.push(ReleaseStage::CheckClean);
            let changes = self.git.uncommitted_changes()?;
            if !changes.trim().is_empty() {
                return Err(PackagerError::git_dirty(changes.trim()).into());
            }
        }

        stages.push(ReleaseStage::ExtractVersion);
        let found = read_version_file(
            self.system,
            &options.version_file,
            &options.pattern,
            |v| self.hook.normalize_version(v),
        )?;
        let current = found.version.clone();
        let proposed = match &options.version {
            Some(version) => version.clone(),
            None => next_patch_version(&current).ok_or_else(|| {
                PackagerError::configuration(format!(
                    "Cannot compute the next version of {current:?}, give one explicitly"
                ))
            })?,
        };
        info!("Current version {current}, new version {proposed}");

        stages.push(ReleaseStage::CheckMonotonic);
        if options.force {
            debug!("Version ordering check disabled");
        } else if !less_than(&current, &proposed) {
            return Err(PackagerError::version_regression(&current, &proposed).into());
        }
        if let Some(pattern) = &options.release_line
            && !same_release_line(pattern, &current, &proposed)?
        {
            return Err(PackagerError::release_line(&current, &proposed, pattern).into());
        }

        if options.commit {
            stages.push(ReleaseStage::CheckTag);
            self.check_tag(&proposed, &options.remote)?;
        }

        stages.push(ReleaseStage::RewriteFile);
        write_bumped(self.system, &options.version_file, &found, &proposed)?;
        self.hook.after_update(&proposed)?;

        if options.commit {
            stages.push(ReleaseStage::CommitTag);
            if options.push {
                stages.push(ReleaseStage::Push);
            }
            let commit_message = options.commit_message.replace("{version}", &proposed);
            publish(
                self.git,
                &Publication {
                    commit_message,
                    tag: Some(proposed.clone()),
                    annotate: options.annotate,
                    remote: options.remote.clone(),
                    branch: options.branch.clone(),
                    push: options.push,
                },
            )?;
        }

        let downstream = match downstream {
            Some((settings, git)) => {
                stages.push(ReleaseStage::SyncDownstream);
                Some(sync_downstream(self.system, git, settings, &proposed)?)
            }
            None => None,
        };

        Ok(ReleaseReport {
            previous_version: current,
            version: proposed,
            stages,
            downstream,
        })
    }

    fn check_tag(&self, tag: &str, remote: &str) -> Result<()> {
        if self.git.local_tags()?.iter().any(|t| t == tag) {
            return Err(PackagerError::tag_exists(tag, TagNamespace::Local).into());
        }
        if self.git.remote_tags(remote)?.iter().any(|t| t == tag) {
            return Err(PackagerError::tag_exists(tag, TagNamespace::Remote).into());
        }
        Ok(())
    }
}
