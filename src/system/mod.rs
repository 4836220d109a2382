//! System abstraction for environment, filesystem and operator prompts
//!
//! Operations never touch `std::fs`, `std::env` or stdin directly; they go
//! through [`System`] so the release and render flows run against
//! [`MockSystem`] in tests.

use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// One entry of a template directory walk
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
}

/// Environment, files and operator prompts seen by the operations
pub trait System: Send + Sync {
    /// Value of an environment variable such as `EDITOR`
    fn env_var(&self, key: &str) -> Result<String, VarError>;

    /// Directory relative command line paths resolve against
    fn current_dir(&self) -> io::Result<PathBuf>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or truncate `path`; the parent directory must exist
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Recursively walk a directory, returning all entries sorted by path
    ///
    /// The root itself is not part of the result.
    fn walk_dir(&self, path: &Path) -> io::Result<Vec<WalkEntry>>;

    /// Ask the operator a yes/no question; anything but `y`/`yes` declines
    fn confirm(&self, question: &str) -> io::Result<bool>;
}
