//! High-level IR: the linked specification.
//!
//! This module owns the semantic view of a specification:
//! - [`Document`] and its declarations, as handed over by the parser
//! - [`AugmentedSpec`] - all documents plus memoized symbol tables
//! - [`ValueResolver`] - resolution of property values to declarations
//! - [`ProblemCollector`] - per-file diagnostics
//!
//! ## Design
//!
//! Declarations are addressed by [`DefId`] (document + kind + position).
//! Symbol tables hold ids only, so documents can receive resolved
//! references without invalidating the tables.

mod cache;
mod diagnostics;
mod document;
mod error;
mod ids;
mod input;
mod resolve;
mod spec;

pub use cache::Memo;
pub use diagnostics::{Diagnostic, ProblemCollector, Severity, codes};
pub use document::{
    Constant, ConstantBlock, Database, DatabaseProperty, DatabasePropertyKind, Document,
    EntityValue, Feature, Import, NamedEntity, Scenario, StateRef, Table, UiElement, UiProperty,
    UiPropertyKind, UiValue, Variant, split_variable,
};
pub(crate) use document::name_key;
pub use error::SpecError;
pub use ids::{DefId, LocalDefId, NodeKind};
pub use input::SourceRoot;
pub use resolve::{Resolution, ResolveResult, Unresolved, ValueResolver, what};
pub use spec::{AugmentedSpec, Declared, NameIndex, UiElementIndex};
