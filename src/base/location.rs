//! Source positions attached to declarations and reference sites.

use std::fmt;
use std::path::{Path, PathBuf};

/// A line/column position in a source file.
///
/// Both line and column are 1-indexed, as produced by the parser and shown
/// to users. `file_path` may be absent on nodes the parser built before it
/// knew the owning document; [`Location::or_file`] fills it in.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub line: u32,
    pub column: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub file_path: Option<PathBuf>,
}

impl Location {
    /// Create a location without a file.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            file_path: None,
        }
    }

    /// Create a location inside a file.
    pub fn in_file(line: u32, column: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            line,
            column,
            file_path: Some(path.into()),
        }
    }

    /// The start of a file, used when nothing more precise is known.
    pub fn file_start(path: impl Into<PathBuf>) -> Self {
        Self::in_file(1, 1, path)
    }

    /// Return this location with `path` as the file if it has none.
    pub fn or_file(&self, path: &Path) -> Self {
        match self.file_path {
            Some(_) => self.clone(),
            None => Self::in_file(self.line, self.column, path),
        }
    }

    /// Render as `(line,column) path`, the form used in diagnostic messages.
    pub fn describe(&self) -> String {
        match &self.file_path {
            Some(path) => format!("({},{}) {}", self.line, self.column, path.display()),
            None => format!("({},{})", self.line, self.column),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_path {
            Some(path) => write!(f, "{}:{}:{}", path.display(), self.line, self.column),
            None => write!(f, "{}:{}", self.line, self.column),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
