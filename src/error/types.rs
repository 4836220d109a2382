//! Custom error types with exit codes

use core::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Where a conflicting release tag was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagNamespace {
    Local,
    Remote,
}

impl fmt::Display for TagNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Main error type for pkgsmith operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PackagerError {
    /// Configuration Error - missing include, malformed override, bad option
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Pattern Error - a version or reference regex does not compile
    #[error("Invalid pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    /// Version Not Found - the version pattern did not match
    #[error("Version not found\npattern = {pattern}\nfilename = {source_name}")]
    VersionNotFound {
        pattern: String,
        source_name: String,
    },

    /// Version Regression - proposed version is not newer than the current one
    #[error("Version {proposed} is not greater than the current version {current}")]
    VersionRegression { current: String, proposed: String },

    /// Release Line - proposed version leaves the release line of the current one
    #[error("Version {proposed} is not on the release line of {current} (pattern = {pattern})")]
    ReleaseLine {
        current: String,
        proposed: String,
        pattern: String,
    },

    /// Version Mismatch - project version differs from the last tag
    #[error(
        "Repository head mismatch current version.\n- PROJECT_VERSION: {version}\n- tag: {tag}"
    )]
    VersionMismatch { version: String, tag: String },

    /// Tag Exists - the release tag already exists
    #[error("Tag {tag} already exists ({namespace})")]
    TagExists { tag: String, namespace: TagNamespace },

    /// Git Dirty - the working tree has uncommitted changes
    #[error("Your repository has uncommitted changes:\n{changes}")]
    GitDirty { changes: String },

    /// Template IO - read or write failure while rendering
    #[error("Template error on {}: {source}", path.display())]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// External Command - a delegated process failed
    #[error("Command `{command}` failed with exit code {code}: {stderr}")]
    ExternalCommand {
        command: String,
        code: i32,
        stderr: String,
    },

    /// Cancelled - the operator declined a confirmation
    #[error("Cancelled: {message}")]
    Cancelled { message: String },
}

impl PackagerError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Configuration { .. } | Self::Cancelled { .. } => 1,
            Self::Pattern { .. } => 2,
            Self::VersionNotFound { .. } => 3,
            Self::VersionRegression { .. }
            | Self::ReleaseLine { .. }
            | Self::VersionMismatch { .. } => 4,
            Self::TagExists { .. } => 5,
            Self::GitDirty { .. } => 6,
            Self::TemplateIo { .. } => 7,
            Self::ExternalCommand { .. } => 8,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a pattern error
    #[inline]
    pub fn pattern<P: Into<String>, S: Into<String>>(pattern: P, message: S) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a version-not-found error
    #[inline]
    pub fn version_not_found<P: Into<String>, S: Into<String>>(pattern: P, source_name: S) -> Self {
        Self::VersionNotFound {
            pattern: pattern.into(),
            source_name: source_name.into(),
        }
    }

    /// Create a version regression error
    #[inline]
    pub fn version_regression<C: Into<String>, P: Into<String>>(current: C, proposed: P) -> Self {
        Self::VersionRegression {
            current: current.into(),
            proposed: proposed.into(),
        }
    }

    /// Create a release line error
    #[inline]
    pub fn release_line<C: Into<String>, P: Into<String>, R: Into<String>>(
        current: C,
        proposed: P,
        pattern: R,
    ) -> Self {
        Self::ReleaseLine {
            current: current.into(),
            proposed: proposed.into(),
            pattern: pattern.into(),
        }
    }

    /// Create a version mismatch error
    #[inline]
    pub fn version_mismatch<V: Into<String>, T: Into<String>>(version: V, tag: T) -> Self {
        Self::VersionMismatch {
            version: version.into(),
            tag: tag.into(),
        }
    }

    /// Create an external command error
    #[inline]
    pub fn external_command<C: Into<String>, S: Into<String>>(
        command: C,
        code: i32,
        stderr: S,
    ) -> Self {
        Self::ExternalCommand {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }

    /// Create a tag-exists error
    #[inline]
    pub fn tag_exists<S: Into<String>>(tag: S, namespace: TagNamespace) -> Self {
        Self::TagExists {
            tag: tag.into(),
            namespace,
        }
    }

    /// Create a dirty working tree error
    #[inline]
    pub fn git_dirty<S: Into<String>>(changes: S) -> Self {
        Self::GitDirty {
            changes: changes.into(),
        }
    }

    /// Create a template IO error
    #[inline]
    pub fn template_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::TemplateIo {
            path: path.into(),
            source,
        }
    }

    /// Create a cancellation error
    #[inline]
    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }
}
