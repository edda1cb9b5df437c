//! Name resolution: resolving property values to the declarations they use.
//!
//! A [`ValueResolver`] is bound to one specification and the document the
//! value was written in. It never mutates anything: it returns a
//! [`Resolution`], and the caller decides what to attach and what to report.
//!
//! # Lookup rules
//!
//! - `Constant(name)` → constants, by name (case-insensitive).
//! - `UiElementReference(variable)` → UI elements visible from the document
//!   (its own, then its direct imports).
//! - `Query(text)` → every `[name]` token, looked up as a constant, then a
//!   table, then a database; then every `{variable}` token, as a UI
//!   element reference. Tokens are taken in the order they appear and each
//!   distinct token is resolved once.
//! - `Literal` → nothing.

use super::document::EntityValue;
use super::ids::DefId;
use super::spec::AugmentedSpec;
use crate::base::FileId;
use crate::query::{extract_names, extract_variables};

// ============================================================================
// RESOLUTION RESULTS
// ============================================================================

/// Result of resolving a single token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    /// Resolved to a declaration.
    Found(DefId),
    /// Could not resolve the reference.
    NotFound,
}

impl ResolveResult {
    /// Get the resolved id.
    pub fn id(&self) -> Option<DefId> {
        match self {
            ResolveResult::Found(id) => Some(*id),
            ResolveResult::NotFound => None,
        }
    }

    /// Check if resolution was successful.
    pub fn is_found(&self) -> bool {
        matches!(self, ResolveResult::Found(_))
    }
}

impl From<Option<DefId>> for ResolveResult {
    fn from(id: Option<DefId>) -> Self {
        match id {
            Some(id) => ResolveResult::Found(id),
            None => ResolveResult::NotFound,
        }
    }
}

/// A token that did not resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unresolved {
    /// What the token was expected to designate, as shown in diagnostics.
    pub what: &'static str,
    pub name: String,
}

impl Unresolved {
    fn new(what: &'static str, name: impl Into<String>) -> Self {
        Self {
            what,
            name: name.into(),
        }
    }
}

/// Everything resolving one value produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved declarations, in token order, without repeats.
    pub references: Vec<DefId>,
    pub unresolved: Vec<Unresolved>,
}

impl Resolution {
    fn push(&mut self, result: ResolveResult, what: &'static str, name: &str) {
        match result {
            ResolveResult::Found(id) => {
                if !self.references.contains(&id) {
                    self.references.push(id);
                }
            }
            ResolveResult::NotFound => self.unresolved.push(Unresolved::new(what, name)),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Diagnostic wording for each kind of lookup.
pub mod what {
    pub const CONSTANT: &str = "constant";
    pub const UI_ELEMENT: &str = "UI Element";
    pub const QUERY_NAME: &str = "constant, table or database";
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolves property values as seen from one document.
#[derive(Clone, Copy, Debug)]
pub struct ValueResolver<'a> {
    spec: &'a AugmentedSpec,
    file: FileId,
}

impl<'a> ValueResolver<'a> {
    /// Create a resolver for values written in `file`.
    pub fn new(spec: &'a AugmentedSpec, file: FileId) -> Self {
        Self { spec, file }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// Resolve a constant by name.
    pub fn resolve_constant(&self, name: &str) -> ResolveResult {
        self.spec.constants().get(name).into()
    }

    /// Resolve a `feature:element` or `element` variable.
    pub fn resolve_ui_element(&self, variable: &str) -> ResolveResult {
        self.spec
            .ui_element_by_variable(variable, Some(self.file))
            .into()
    }

    /// Resolve a bracketed query name: a constant, a table or a database.
    pub fn resolve_name(&self, name: &str) -> ResolveResult {
        self.spec
            .constants()
            .get(name)
            .or_else(|| self.spec.tables().get(name))
            .or_else(|| self.spec.databases().get(name))
            .into()
    }

    /// Resolve every reference a classified value carries.
    pub fn resolve(&self, entity: &EntityValue) -> Resolution {
        let mut resolution = Resolution::default();
        match entity {
            EntityValue::Constant(name) => {
                resolution.push(self.resolve_constant(name), what::CONSTANT, name);
            }
            EntityValue::UiElementReference(variable) => {
                resolution.push(self.resolve_ui_element(variable), what::UI_ELEMENT, variable);
            }
            EntityValue::Query(text) => self.resolve_query(text, &mut resolution),
            EntityValue::Literal => {}
        }

        tracing::trace!(
            "Resolved {:?} in {}: {} found, {} missing",
            entity,
            self.file,
            resolution.references.len(),
            resolution.unresolved.len()
        );
        resolution
    }

    fn resolve_query(&self, text: &str, resolution: &mut Resolution) {
        for name in distinct(extract_names(text)) {
            resolution.push(self.resolve_name(&name), what::QUERY_NAME, &name);
        }
        for variable in distinct(extract_variables(text)) {
            resolution.push(self.resolve_ui_element(&variable), what::UI_ELEMENT, &variable);
        }
    }
}

/// Drop repeated tokens (case-insensitive), keeping first appearances.
fn distinct(tokens: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tokens.len());
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        let key = token.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Location;
    use crate::hir::document::{Constant, Database, Document, Feature, Table, UiElement};
    use crate::hir::ids::NodeKind;

    fn loc(line: u32) -> Location {
        Location::new(line, 1)
    }

    fn spec() -> AugmentedSpec {
        let mut spec = AugmentedSpec::new("/spec");
        spec.add_document(
            Document::new("/spec/a.feature")
                .with_feature(Feature::new("Feature1", loc(1)).with_ui_element(UiElement::new("zoo", loc(2))))
                .with_ui_element(UiElement::new("foo", loc(3)))
                .with_constant(Constant::new("ipsum", "lorem", loc(4)))
                .with_table(Table::new("users", loc(5)))
                .with_database(Database::new("mydb", loc(6))),
        );
        spec
    }

    #[test]
    fn test_resolve_constant() {
        let spec = spec();
        let resolver = ValueResolver::new(&spec, FileId::new(0));
        let result = resolver.resolve(&EntityValue::Constant("IPSUM".into()));
        assert!(result.is_complete());
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].kind, NodeKind::Constant);
    }

    #[test]
    fn test_resolve_missing_constant() {
        let spec = spec();
        let resolver = ValueResolver::new(&spec, FileId::new(0));
        let result = resolver.resolve(&EntityValue::Constant("nope".into()));
        assert!(result.references.is_empty());
        assert_eq!(result.unresolved, vec![Unresolved::new(what::CONSTANT, "nope")]);
    }

    #[test]
    fn test_resolve_name_prefers_constant_then_table_then_database() {
        let spec = spec();
        let resolver = ValueResolver::new(&spec, FileId::new(0));
        assert_eq!(resolver.resolve_name("ipsum").id().map(|id| id.kind), Some(NodeKind::Constant));
        assert_eq!(resolver.resolve_name("users").id().map(|id| id.kind), Some(NodeKind::Table));
        assert_eq!(resolver.resolve_name("mydb").id().map(|id| id.kind), Some(NodeKind::Database));
        assert!(!resolver.resolve_name("other").is_found());
    }

    #[test]
    fn test_resolve_query_keeps_token_order() {
        let spec = spec();
        let resolver = ValueResolver::new(&spec, FileId::new(0));
        let result = resolver.resolve(&EntityValue::Query(
            "SELECT * FROM [mydb].[ipsum] WHERE name = {foo} OR name = {Feature1:zoo}".into(),
        ));

        let kinds: Vec<_> = result.references.iter().map(|id| id.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Database, NodeKind::Constant, NodeKind::UiElement, NodeKind::UiElement]
        );
        assert!(result.is_complete());
    }

    #[test]
    fn test_resolve_query_repeated_tokens_once() {
        let spec = spec();
        let resolver = ValueResolver::new(&spec, FileId::new(0));
        let result = resolver.resolve(&EntityValue::Query("{foo} {FOO} [x] [X]".into()));
        assert_eq!(result.references.len(), 1);
        assert_eq!(result.unresolved, vec![Unresolved::new(what::QUERY_NAME, "x")]);
    }

    #[test]
    fn test_literal_resolves_to_nothing() {
        let spec = spec();
        let resolver = ValueResolver::new(&spec, FileId::new(0));
        assert_eq!(resolver.resolve(&EntityValue::Literal), Resolution::default());
    }
}
