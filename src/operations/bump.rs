//! Version file rewriting and publication
//!
//! Shared by the release workflow (version file of the project) and the
//! downstream sync (reference file of the consuming repository).

use crate::error::PackagerError;
use crate::git::Git;
use crate::system::System;
use crate::version::{ExtractedVersion, read_version_file};
use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Replace the version matched by `pattern` in the file at `path`
///
/// Returns the version that was found before the rewrite.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or if the
/// pattern does not match
pub fn bump_file(
    system: &dyn System,
    path: &Path,
    pattern: &str,
    normalizer: impl Fn(&str) -> String,
    new_version: &str,
) -> Result<ExtractedVersion> {
    let found = read_version_file(system, path, pattern, normalizer)?;
    write_bumped(system, path, &found, new_version)?;
    Ok(found)
}

/// Write `found` back to `path` with `new_version` spliced in
///
/// # Errors
///
/// Returns a template error if the file cannot be written
pub fn write_bumped(
    system: &dyn System,
    path: &Path,
    found: &ExtractedVersion,
    new_version: &str,
) -> Result<()> {
    system
        .write(path, found.replaced_with(new_version).as_bytes())
        .map_err(|e| PackagerError::template_io(path, e))?;
    info!(
        "{}: {} -> {new_version}",
        path.display(),
        found.raw()
    );
    Ok(())
}

/// What to record and publish after a bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub commit_message: String,
    /// Tag to create on the new commit
    pub tag: Option<String>,
    /// Create an annotated tag (message = commit message)
    pub annotate: bool,
    pub remote: String,
    /// Branch to push; `None` pushes the current branch to its upstream
    pub branch: Option<String>,
    pub push: bool,
}

/// Commit, tag and push a bump
///
/// The branch is pushed before the tag, with two separate pushes.
///
/// # Errors
///
/// Returns an error as soon as one git command fails
pub fn publish(git: &dyn Git, publication: &Publication) -> Result<()> {
    git.commit_all(&publication.commit_message)?;

    if let Some(tag) = &publication.tag {
        let message = publication
            .annotate
            .then_some(publication.commit_message.as_str());
        git.create_tag(tag, message)?;
        info!("Tagged {tag}");
    }

    if publication.push {
        let remote = publication.branch.as_ref().map(|_| publication.remote.as_str());
        git.push(remote, publication.branch.as_deref())?;
        if let Some(tag) = &publication.tag {
            git.push_tag(&publication.remote, tag)?;
        }
        info!("Pushed to {}", publication.remote);
    }

    Ok(())
}
