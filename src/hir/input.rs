//! The registry of documents by normalized path.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::base::FileId;

/// Map from normalized document path to its [`FileId`].
///
/// Kept in registration order, so iterating yields documents the way they
/// were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceRoot {
    files: IndexMap<PathBuf, FileId>,
}

impl SourceRoot {
    /// Create a new empty source root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source root from paths in registration order.
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut root = Self::new();
        for (index, path) in paths.into_iter().enumerate() {
            root.insert(path.to_path_buf(), FileId::new(index as u32));
        }
        root
    }

    /// Register a path. Returns `false` if it was already present.
    pub fn insert(&mut self, path: PathBuf, file: FileId) -> bool {
        if self.files.contains_key(&path) {
            return false;
        }
        self.files.insert(path, file);
        true
    }

    /// Get the FileId for a path.
    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.files.get(path).copied()
    }

    /// Check if a path is registered.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Iterate over all files.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, FileId)> + '_ {
        self.files.iter().map(|(path, &id)| (path.as_path(), id))
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the source root is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_root_basic() {
        let mut root = SourceRoot::new();

        assert!(root.insert(PathBuf::from("/spec/a.feature"), FileId::new(0)));
        assert!(root.insert(PathBuf::from("/spec/b.feature"), FileId::new(1)));

        assert_eq!(root.len(), 2);
        assert!(root.contains(Path::new("/spec/a.feature")));
        assert_eq!(root.file_id(Path::new("/spec/b.feature")), Some(FileId::new(1)));
    }

    #[test]
    fn test_source_root_rejects_duplicate_path() {
        let mut root = SourceRoot::new();
        assert!(root.insert(PathBuf::from("/a.feature"), FileId::new(0)));
        assert!(!root.insert(PathBuf::from("/a.feature"), FileId::new(1)));
        assert_eq!(root.file_id(Path::new("/a.feature")), Some(FileId::new(0)));
    }

    #[test]
    fn test_source_root_from_paths() {
        let paths = [Path::new("/x.feature"), Path::new("/y.feature")];
        let root = SourceRoot::from_paths(paths);
        let ids: Vec<_> = root.iter().map(|(_, id)| id.index()).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
