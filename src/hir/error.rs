//! Errors for invariant violations in the specification.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that indicate a caller-ordering bug rather than a mistake in
/// the specification being analyzed.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A graph vertex or reference points at a path with no registered
    /// document.
    #[error("No document registered for \"{}\"", path.display())]
    DocumentNotFound { path: PathBuf },

    /// A declaration id does not designate a declaration.
    #[error("Unknown declaration {0}")]
    UnknownDeclaration(String),
}

impl SpecError {
    pub fn document_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DocumentNotFound { path: path.into() }
    }
}
