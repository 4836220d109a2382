//! Git operations through the system `git` binary

use super::{Git, parse_describe, parse_remote_tags, parse_tag_list};
use crate::operations::commands::run_command;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// [`Git`] implementation running `git` inside a working tree
#[derive(Debug, Clone)]
pub struct SystemGit {
    workdir: PathBuf,
}

impl SystemGit {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let output = run_command("git", args, &self.workdir)?;
        Ok(output.stdout)
    }
}

impl Git for SystemGit {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn uncommitted_changes(&self) -> Result<String> {
        // Staged changes count too, `commit -am` would pick them up
        let status = self
            .git(&["status", "--porcelain", "--untracked-files=no"])
            .context("Failed to check for uncommitted changes")?;
        Ok(status.trim_end().to_owned())
    }

    fn local_tags(&self) -> Result<Vec<String>> {
        let output = self
            .git(&["tag", "--list"])
            .context("Failed to list local tags")?;
        Ok(parse_tag_list(&output))
    }

    fn remote_tags(&self, remote: &str) -> Result<Vec<String>> {
        let output = self
            .git(&["ls-remote", "--tags", remote])
            .with_context(|| format!("Failed to list tags of remote '{remote}'"))?;
        Ok(parse_remote_tags(&output))
    }

    fn last_tag(&self) -> Result<String> {
        let output = self
            .git(&["describe", "--tags"])
            .context("Failed to describe HEAD")?;
        let tag = parse_describe(&output);
        debug!("Last tag: {tag}");
        Ok(tag)
    }

    fn commit_all(&self, message: &str) -> Result<()> {
        self.git(&["commit", "-am", message])?;
        Ok(())
    }

    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<()> {
        match message {
            Some(message) => self.git(&["tag", "-a", name, "-m", message])?,
            None => self.git(&["tag", name])?,
        };
        Ok(())
    }

    fn push(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
        let mut args = vec!["push"];
        args.extend(remote);
        args.extend(branch);
        self.git(&args)?;
        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let reference = format!("refs/tags/{tag}");
        self.git(&["push", remote, &reference])?;
        Ok(())
    }

    fn fetch_all(&self) -> Result<()> {
        self.git(&["fetch", "--tags", "--all"])?;
        Ok(())
    }

    fn switch(&self, branch: &str) -> Result<()> {
        self.git(&["switch", branch])?;
        Ok(())
    }

    fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()> {
        self.git(&["pull", remote, branch, "--rebase"])?;
        Ok(())
    }
}
