//! Scripted git collaborator for tests

use super::Git;
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory [`Git`] implementation
///
/// Repository state is scripted with `with_*` builders, every mutating call
/// is recorded as a `git ...` command line and can be inspected with
/// [`MockGit::calls`].
///
/// # Example
/// ```
/// use pkgsmith::git::{Git, MockGit};
///
/// let git = MockGit::new("/repo")
///     .with_local_tag("1.0.0")
///     .with_remote_tag("1.0.1");
///
/// git.create_tag("1.0.2", None).unwrap();
/// assert_eq!(git.calls(), vec!["git tag 1.0.2"]);
/// ```
#[derive(Clone)]
pub struct MockGit {
    workdir: PathBuf,
    state: Arc<RwLock<MockGitState>>,
}

#[derive(Default)]
struct MockGitState {
    changes: String,
    local_tags: Vec<String>,
    remote_tags: Vec<String>,
    last_tag: Option<String>,
    calls: Vec<String>,
    failing: Option<String>,
}

impl MockGit {
    /// Clean repository without tags
    #[must_use]
    pub fn new<P: Into<PathBuf>>(workdir: P) -> Self {
        Self {
            workdir: workdir.into(),
            state: Arc::new(RwLock::new(MockGitState::default())),
        }
    }

    fn update(self, f: impl FnOnce(&mut MockGitState)) -> Self {
        if let Ok(mut state) = self.state.write() {
            f(&mut state);
        }
        self
    }

    /// Report uncommitted changes
    #[must_use]
    pub fn with_changes(self, changes: &str) -> Self {
        self.update(|s| s.changes = changes.to_owned())
    }

    #[must_use]
    pub fn with_local_tag(self, tag: &str) -> Self {
        self.update(|s| s.local_tags.push(tag.to_owned()))
    }

    #[must_use]
    pub fn with_remote_tag(self, tag: &str) -> Self {
        self.update(|s| s.remote_tags.push(tag.to_owned()))
    }

    /// Output of `git describe --tags`, already stripped
    #[must_use]
    pub fn with_last_tag(self, tag: &str) -> Self {
        self.update(|s| s.last_tag = Some(tag.to_owned()))
    }

    /// Make every command whose line starts with `prefix` fail
    #[must_use]
    pub fn with_failure(self, prefix: &str) -> Self {
        self.update(|s| s.failing = Some(prefix.to_owned()))
    }

    /// Recorded command lines, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state
            .read()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, args: &[&str]) -> Result<()> {
        let line = format!("git {}", args.join(" "));
        let mut state = self
            .state
            .write()
            .map_err(|e| anyhow!("mock git state poisoned: {e}"))?;
        if state
            .failing
            .as_ref()
            .is_some_and(|prefix| line.starts_with(prefix.as_str()))
        {
            return Err(anyhow!("{line} failed"));
        }
        state.calls.push(line);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&MockGitState) -> T) -> Result<T> {
        let state = self
            .state
            .read()
            .map_err(|e| anyhow!("mock git state poisoned: {e}"))?;
        Ok(f(&state))
    }
}

impl Git for MockGit {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn uncommitted_changes(&self) -> Result<String> {
        self.read(|s| s.changes.clone())
    }

    fn local_tags(&self) -> Result<Vec<String>> {
        self.read(|s| s.local_tags.clone())
    }

    fn remote_tags(&self, _remote: &str) -> Result<Vec<String>> {
        self.read(|s| s.remote_tags.clone())
    }

    fn last_tag(&self) -> Result<String> {
        self.read(|s| s.last_tag.clone())?
            .ok_or_else(|| anyhow!("fatal: No names found, cannot describe anything."))
    }

    fn commit_all(&self, message: &str) -> Result<()> {
        self.record(&["commit", "-am", message])
    }

    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<()> {
        match message {
            Some(message) => self.record(&["tag", "-a", name, "-m", message])?,
            None => self.record(&["tag", name])?,
        }
        if let Ok(mut state) = self.state.write() {
            state.local_tags.push(name.to_owned());
        }
        Ok(())
    }

    fn push(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()> {
        let mut args = vec!["push"];
        args.extend(remote);
        args.extend(branch);
        self.record(&args)
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let reference = format!("refs/tags/{tag}");
        self.record(&["push", remote, &reference])?;
        if let Ok(mut state) = self.state.write() {
            state.remote_tags.push(tag.to_owned());
        }
        Ok(())
    }

    fn fetch_all(&self) -> Result<()> {
        self.record(&["fetch", "--tags", "--all"])
    }

    fn switch(&self, branch: &str) -> Result<()> {
        self.record(&["switch", branch])
    }

    fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(&["pull", remote, branch, "--rebase"])
    }
}
