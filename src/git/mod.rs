//! Git collaborator
//!
//! Every git interaction of the release workflow goes through the [`Git`]
//! trait. [`SystemGit`] shells out to the `git` binary of a working tree,
//! [`MockGit`] scripts repository state for tests.

pub mod mock;
pub mod system;

pub use mock::MockGit;
pub use system::SystemGit;

use anyhow::Result;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DESCRIBE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-[0-9]+-g[0-9a-f]+$").expect("describe suffix pattern is valid"));

/// Git operations needed to check, tag and publish a release
pub trait Git {
    /// Working tree this handle operates on
    fn workdir(&self) -> &Path;

    /// Summary of uncommitted changes, empty when the tree is clean
    fn uncommitted_changes(&self) -> Result<String>;

    /// Tags known to the local repository
    fn local_tags(&self) -> Result<Vec<String>>;

    /// Tags published on `remote`
    fn remote_tags(&self, remote: &str) -> Result<Vec<String>>;

    /// Most recent tag reachable from HEAD
    fn last_tag(&self) -> Result<String>;

    /// Commit every tracked modification
    fn commit_all(&self, message: &str) -> Result<()>;

    /// Create a tag on HEAD, annotated when a message is given
    fn create_tag(&self, name: &str, message: Option<&str>) -> Result<()>;

    /// Push `branch` to `remote`, or the current branch to its upstream
    fn push(&self, remote: Option<&str>, branch: Option<&str>) -> Result<()>;

    /// Push a single tag to `remote`
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;

    /// Fetch every remote, including tags
    fn fetch_all(&self) -> Result<()>;

    /// Switch the working tree to `branch`
    fn switch(&self, branch: &str) -> Result<()>;

    /// Rebase the current branch on `remote/branch`
    fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()>;
}

/// Tag names from `git tag --list` output
#[must_use]
pub fn parse_tag_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Tag names from `git ls-remote --tags` output
///
/// Lines look like `<hash>\trefs/tags/<name>`. Peeled entries (`<name>^{}`)
/// duplicate their annotated tag and are dropped.
#[must_use]
pub fn parse_remote_tags(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/tags/"))
        .filter(|name| !name.ends_with("^{}"))
        .map(str::to_owned)
        .collect()
}

/// Tag name from `git describe --tags` output
///
/// `9.1.33-4-g1a2b3c4` becomes `9.1.33`, an exact tag is kept as is.
#[must_use]
pub fn parse_describe(output: &str) -> String {
    let description = output.trim();
    DESCRIBE_SUFFIX.replace(description, "").into_owned()
}
