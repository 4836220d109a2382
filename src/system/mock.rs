//! Mock system implementation for testing

use super::{System, WalkEntry};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::env::VarError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem, environment and scripted
/// prompt answers, perfect for fast, isolated unit tests without side effects.
///
/// # Example
/// ```
/// use pkgsmith::system::{mock::MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_env("EDITOR", "vi").unwrap()
///     .with_file("/pkg/targets/debian", b"DIST = debian\n").unwrap()
///     .with_dir("/pkg/template").unwrap();
///
/// assert_eq!(system.env_var("EDITOR").unwrap(), "vi");
/// assert!(system.exists(Path::new("/pkg/targets/debian")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    env_vars: HashMap<String, String>,
    current_dir: PathBuf,
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    answers: VecDeque<bool>,
    questions: Vec<String>,
    failing_writes: BTreeSet<PathBuf>,
}

fn poisoned<E: ToString>(e: E) -> io::Error {
    io::Error::other(e.to_string())
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                env_vars: HashMap::new(),
                current_dir: PathBuf::from("/"),
                files: BTreeMap::new(),
                dirs: BTreeSet::from([PathBuf::from("/")]),
                answers: VecDeque::new(),
                questions: Vec::new(),
                failing_writes: BTreeSet::new(),
            })),
        }
    }

    /// Set an environment variable (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_env(self, key: &str, value: &str) -> io::Result<Self> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.env_vars.insert(key.to_owned(), value.to_owned());
        drop(state);
        Ok(self)
    }

    /// Set the current working directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_current_dir<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.current_dir = dir.as_ref().to_path_buf();
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.state.write().map_err(poisoned)?;

        // Ensure parent directories exist
        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.state.write().map_err(poisoned)?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Queue an answer for the next `confirm` call (builder pattern)
    ///
    /// Unanswered questions are declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_answer(self, answer: bool) -> io::Result<Self> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.answers.push_back(answer);
        drop(state);
        Ok(self)
    }

    /// Make every write to `path` fail (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_failing_write<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.failing_writes.insert(path.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Questions asked through `confirm`, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn questions(&self) -> io::Result<Vec<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.questions.clone())
    }

    #[inline]
    fn ensure_parent_dirs(dirs: &mut BTreeSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    #[expect(clippy::map_err_ignore, reason = "This is for VarError")]
    fn env_var(&self, key: &str) -> Result<String, VarError> {
        let state = self.state.read().map_err(|_| VarError::NotPresent)?;
        state.env_vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.current_dir.clone())
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.state.read().map_err(poisoned)?;
        let bytes = state.files.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )
        })?;
        let result = bytes.clone();
        drop(state);
        String::from_utf8(result)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        if state.failing_writes.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("Permission denied: {}", path.display()),
            ));
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !state.dirs.contains(parent)
        {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Parent directory does not exist: {}", parent.display()),
            ));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        drop(state);
        Ok(())
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Path exists but is not a directory: {}", path.display()),
            ));
        }
        Self::ensure_parent_dirs(&mut state.dirs, path);
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.state.write().map_err(poisoned)?;

        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", path.display()),
            ));
        }

        state.files.retain(|p, _| !p.starts_with(path));
        state.dirs.retain(|p| !p.starts_with(path));
        drop(state);
        Ok(())
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.state
            .read()
            .is_ok_and(|state| state.files.contains_key(path) || state.dirs.contains(path))
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.state
            .read()
            .is_ok_and(|state| state.files.contains_key(path))
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.state
            .read()
            .is_ok_and(|state| state.dirs.contains(path))
    }

    #[inline]
    fn walk_dir(&self, path: &Path) -> io::Result<Vec<WalkEntry>> {
        let state = self.state.read().map_err(poisoned)?;

        if !state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", path.display()),
            ));
        }

        let mut entries: Vec<WalkEntry> = state
            .dirs
            .iter()
            .filter(|p| p.starts_with(path) && p.as_path() != path)
            .map(|p| WalkEntry {
                path: p.clone(),
                is_file: false,
                is_dir: true,
            })
            .chain(
                state
                    .files
                    .keys()
                    .filter(|p| p.starts_with(path))
                    .map(|p| WalkEntry {
                        path: p.clone(),
                        is_file: true,
                        is_dir: false,
                    }),
            )
            .collect();
        drop(state);

        // Sort entries by path for deterministic output
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    #[inline]
    fn confirm(&self, question: &str) -> io::Result<bool> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.questions.push(question.to_owned());
        let answer = state.answers.pop_front().unwrap_or(false);
        drop(state);
        Ok(answer)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent_directory() {
        let system = MockSystem::new();
        assert!(system.write(Path::new("/missing/file"), b"x").is_err());

        system.create_dir_all(Path::new("/present")).unwrap();
        system.write(Path::new("/present/file"), b"x").unwrap();
        assert_eq!(
            system.read_to_string(Path::new("/present/file")).unwrap(),
            "x"
        );
    }

    #[test]
    fn remove_dir_all_drops_nested_entries() {
        let system = MockSystem::new()
            .with_file("/out/a", b"1")
            .unwrap()
            .with_file("/out/sub/b", b"2")
            .unwrap()
            .with_file("/keep", b"3")
            .unwrap();

        system.remove_dir_all(Path::new("/out")).unwrap();

        assert!(!system.exists(Path::new("/out")));
        assert!(!system.exists(Path::new("/out/sub/b")));
        assert!(system.exists(Path::new("/keep")));
    }

    #[test]
    fn walk_dir_is_sorted_and_excludes_root() {
        let system = MockSystem::new()
            .with_file("/t/b", b"")
            .unwrap()
            .with_file("/t/a/c", b"")
            .unwrap();

        let paths: Vec<PathBuf> = system
            .walk_dir(Path::new("/t"))
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("/t/a"),
                PathBuf::from("/t/a/c"),
                PathBuf::from("/t/b")
            ]
        );
    }

    #[test]
    fn confirm_consumes_answers_then_declines() {
        let system = MockSystem::new().with_answer(true).unwrap();
        assert!(system.confirm("first?").unwrap());
        assert!(!system.confirm("second?").unwrap());
        assert_eq!(system.questions().unwrap(), vec!["first?", "second?"]);
    }
}
