//! File system utilities

use crate::system::System;
use anyhow::{Context as _, Result};
use std::io;
use std::path::Path;

/// Safely remove directory and all its contents
///
/// A missing directory is not an error.
pub fn remove_dir_safe(system: &dyn System, dir_path: &Path) -> Result<()> {
    if system.is_dir(dir_path) {
        system
            .remove_dir_all(dir_path)
            .with_context(|| format!("Failed to remove directory: {}", dir_path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(system: &dyn System, dir_path: &Path) -> io::Result<()> {
    if !system.exists(dir_path) {
        system.create_dir_all(dir_path)?;
    } else if !system.is_dir(dir_path) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir_path.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::RealSystem;
    use tempfile::TempDir;

    #[test]
    fn test_remove_dir_safe_tolerates_missing() {
        let system = RealSystem::new();
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        remove_dir_safe(&system, &missing).unwrap();

        let present = temp_dir.path().join("present");
        system.create_dir_all(&present.join("nested")).unwrap();
        remove_dir_safe(&system, &present).unwrap();
        assert!(!present.exists());
    }

    #[test]
    fn test_ensure_dir_exists_rejects_files() {
        let system = RealSystem::new();
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        system.write(&file, b"x").unwrap();

        assert!(ensure_dir_exists(&system, &file).is_err());
        ensure_dir_exists(&system, &temp_dir.path().join("dir")).unwrap();
        ensure_dir_exists(&system, &temp_dir.path().join("dir")).unwrap();
    }
}
