//! Lexical path normalization.
//!
//! Documents are identified by their normalized path. Normalization is
//! purely lexical: the file system is never touched, so documents that do
//! not exist on disk (tests, editors with unsaved buffers) behave the same.

use std::path::{Component, Path, PathBuf};

/// Remove `.` segments and fold `..` into the preceding segment.
///
/// A `..` that would climb above the root is dropped for absolute paths and
/// kept for relative ones.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Make `path` absolute against `base` (when relative) and normalize it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Resolve an import written in `from_file` to the path it designates.
///
/// Relative imports are resolved against the directory of `from_file`.
pub fn resolve_relative(from_file: &Path, raw: &str) -> PathBuf {
    let target = Path::new(raw.trim());
    if target.is_absolute() {
        return normalize_path(target);
    }
    let dir = from_file.parent().unwrap_or_else(|| Path::new(""));
    normalize_path(&dir.join(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_dots() {
        assert_eq!(normalize_path(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }

    #[test]
    fn test_normalize_does_not_climb_above_root() {
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_for_relative() {
        assert_eq!(normalize_path(Path::new("../a/b/..")), PathBuf::from("../a"));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize(Path::new("sub/a.feature"), Path::new("/spec")),
            PathBuf::from("/spec/sub/a.feature")
        );
        assert_eq!(
            absolutize(Path::new("/x/a.feature"), Path::new("/spec")),
            PathBuf::from("/x/a.feature")
        );
    }

    #[test]
    fn test_resolve_relative_same_dir() {
        let from = Path::new("/spec/b.feature");
        assert_eq!(resolve_relative(from, "a.feature"), PathBuf::from("/spec/a.feature"));
    }

    #[test]
    fn test_resolve_relative_parent_dir() {
        let from = Path::new("/spec/sub/b.feature");
        assert_eq!(resolve_relative(from, "../a.feature"), PathBuf::from("/spec/a.feature"));
    }

    #[test]
    fn test_resolve_relative_child_dir() {
        let from = Path::new("/spec/b.feature");
        assert_eq!(
            resolve_relative(from, "fake/a.feature"),
            PathBuf::from("/spec/fake/a.feature")
        );
    }
}
