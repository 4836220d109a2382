//! Path manipulation utilities

use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {
                // Skip '.' components
            }
            Component::ParentDir => {
                // Keep leading '..' components, pop otherwise
                match components.last() {
                    None | Some(Component::ParentDir) => components.push(component),
                    Some(Component::RootDir) => {}
                    Some(_) => {
                        components.pop();
                    }
                }
            }
            _ => {
                components.push(component);
            }
        }
    }

    components.iter().collect()
}

/// Resolve `relative` against the directory containing `file`
///
/// Absolute `relative` paths are returned unchanged.
#[must_use]
pub fn resolve_sibling(file: &Path, relative: &str) -> PathBuf {
    let base = file.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&base.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize_path(Path::new("./a/../b/./c")), PathBuf::from("b/c"));
        assert_eq!(normalize_path(Path::new("../a/b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn resolve_sibling_uses_file_directory() {
        assert_eq!(
            resolve_sibling(Path::new("/pkg/targets/ubuntu"), "common"),
            PathBuf::from("/pkg/targets/common")
        );
        assert_eq!(
            resolve_sibling(Path::new("/pkg/targets/ubuntu"), "../shared/base"),
            PathBuf::from("/pkg/shared/base")
        );
        assert_eq!(
            resolve_sibling(Path::new("ubuntu"), "common"),
            PathBuf::from("common")
        );
    }
}
