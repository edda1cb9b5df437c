//! Diagnostics: Semantic error reporting.
//!
//! Every analyzer reports through a [`ProblemCollector`], which buckets
//! diagnostics by source file so a reporting layer can group and sort them.
//! Domain problems are never raised as errors; they are collected here and
//! analysis carries on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::Location;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The file the diagnostic is reported against.
    pub file: PathBuf,
    /// Where in that file.
    pub location: Location,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    ///
    /// The reported file is the location's own file when it has one,
    /// `fallback` otherwise.
    pub fn error(fallback: &Path, location: &Location, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, fallback, location, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(fallback: &Path, location: &Location, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, fallback, location, message)
    }

    fn new(
        severity: Severity,
        fallback: &Path,
        location: &Location,
        message: impl Into<Arc<str>>,
    ) -> Self {
        let location = location.or_file(fallback);
        let file = location
            .file_path
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf());
        Self {
            file,
            location,
            severity,
            code: None,
            message: message.into(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for semantic errors.
pub mod codes {
    /// Referenced declaration not found.
    pub const UNDEFINED_REFERENCE: &str = "E0001";
    /// Duplicate declaration.
    pub const DUPLICATE_DEFINITION: &str = "E0004";
    /// Cyclic import.
    pub const CIRCULAR_DEPENDENCY: &str = "E0007";
    /// Imported file has no document.
    pub const MISSING_IMPORT: &str = "E0008";
    /// Precondition or called state is never produced.
    pub const MISSING_STATE: &str = "E0009";
    /// A pass found the specification in a state an earlier pass should
    /// have prevented.
    pub const SETUP: &str = "E0010";

    /// Database could not be reached.
    pub const DATABASE_UNREACHABLE: &str = "W0004";
}

// ============================================================================
// PROBLEM COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis, bucketed per file.
///
/// Files appear in the order their first diagnostic was reported; within a
/// file, diagnostics keep report order.
#[derive(Clone, Debug, Default)]
pub struct ProblemCollector {
    by_file: IndexMap<PathBuf, Vec<Diagnostic>>,
}

impl ProblemCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.by_file
            .entry(diagnostic.file.clone())
            .or_default()
            .push(diagnostic);
    }

    /// Add several diagnostics.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    /// Add an error for a reference that resolves to nothing.
    pub fn undefined_reference(&mut self, file: &Path, location: &Location, what: &str, name: &str) {
        self.add(
            Diagnostic::error(file, location, format!("Referenced {what} not found: \"{name}\""))
                .with_code(codes::UNDEFINED_REFERENCE),
        );
    }

    /// Add an error for a state that nothing produces.
    pub fn missing_state(&mut self, file: &Path, location: &Location, what: &str, name: &str) {
        self.add(
            Diagnostic::error(file, location, format!("{what} not found: \"{name}\""))
                .with_code(codes::MISSING_STATE),
        );
    }

    /// Add a warning.
    pub fn warning(&mut self, file: &Path, location: &Location, code: &str, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::warning(file, location, message).with_code(code));
    }

    /// Diagnostics reported against `file`.
    pub fn diagnostics_for_file(&self, file: &Path) -> &[Diagnostic] {
        self.by_file.get(file).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files that have at least one diagnostic.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.by_file.keys().map(PathBuf::as_path)
    }

    /// All diagnostics, file by file.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.by_file.values().flatten()
    }

    /// Get the total number of diagnostics.
    pub fn len(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.iter().any(Diagnostic::is_error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> IndexMap<PathBuf, Vec<Diagnostic>> {
        std::mem::take(&mut self.by_file)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.by_file.clear();
    }
}
