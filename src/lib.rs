//! # behave-base
//!
//! Semantic core for the behave specification language.
//!
//! Documents arrive already parsed. This crate links them into a whole
//! specification, resolves the symbolic references they make to each
//! other and runs the well-definedness checks in import order.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! analysis    → Analyzer pipeline (imports, UI elements, features, ...)
//!   ↓
//! graph       → Import graph, cycle enumeration, topological order
//!   ↓
//! hir         → Document model, augmented specification, diagnostics
//!   ↓
//! query       → `[name]` / `{variable}` extraction and safe replacement
//!   ↓
//! base        → Primitives (FileId, Location, path normalization)
//! ```
//!
//! `connection` sits beside `analysis` and describes what a database
//! connection provider must offer.

/// Foundation types: FileId, Location, path helpers
pub mod base;

/// Document model, symbol tables and diagnostics
pub mod hir;

/// Import dependency graph
pub mod graph;

/// Embedded-reference parsing and replacement inside query strings
pub mod query;

/// Database connection contract used by the database analyzer
pub mod connection;

/// Multi-pass semantic analyzer pipeline
pub mod analysis;

pub use analysis::{AnalysisOptions, AnalysisReport, Analyzer, ConnectionOutcome, Pipeline};
pub use base::{FileId, Location, Value};
pub use graph::ImportGraph;
pub use hir::{AugmentedSpec, Diagnostic, Document, ProblemCollector, Severity};
pub use query::{ReferenceReplacer, ReplaceMode};
