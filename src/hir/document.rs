//! Document model: the parsed content of one specification file.
//!
//! Documents are produced by the parser collaborator. This crate only ever
//! mutates them to attach resolved references onto UI property values.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use super::ids::DefId;
use crate::base::{Location, Value, absolutize, resolve_relative};

// ============================================================================
// NAMED ENTITIES
// ============================================================================

/// A declaration with a stable name and a location.
///
/// Uniqueness of names is enforced by the analyzer pipeline, not here.
pub trait NamedEntity {
    fn name(&self) -> &str;
    fn location(&self) -> &Location;
}

macro_rules! impl_named_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NamedEntity for $ty {
                fn name(&self) -> &str {
                    &self.name
                }

                fn location(&self) -> &Location {
                    &self.location
                }
            }
        )*
    };
}

impl_named_entity!(Feature, Constant, Table, Database, UiElement);

// ============================================================================
// DOCUMENT
// ============================================================================

/// One source file's parsed content.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Document {
    pub file_path: PathBuf,
    pub imports: Vec<Import>,
    pub feature: Option<Feature>,
    pub constant_block: Option<ConstantBlock>,
    pub databases: Vec<Database>,
    pub tables: Vec<Table>,
    /// Module-level ("global") UI elements, visible without a feature prefix.
    pub ui_elements: Vec<UiElement>,
}

impl Document {
    /// Create an empty document for a file.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    pub fn with_import(mut self, value: impl Into<String>, location: Location) -> Self {
        self.imports.push(Import::new(value, location));
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_constant(mut self, constant: Constant) -> Self {
        self.constant_block
            .get_or_insert_with(ConstantBlock::default)
            .constants
            .push(constant);
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.databases.push(database);
        self
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Add a global UI element. Any owning feature name is cleared.
    pub fn with_ui_element(mut self, mut element: UiElement) -> Self {
        element.feature = None;
        self.ui_elements.push(element);
        self
    }

    /// Declared constants, in order.
    pub fn constants(&self) -> &[Constant] {
        self.constant_block
            .as_ref()
            .map(|b| b.constants.as_slice())
            .unwrap_or(&[])
    }

    /// UI elements declared inside the feature.
    pub fn feature_ui_elements(&self) -> &[UiElement] {
        self.feature
            .as_ref()
            .map(|f| f.ui_elements.as_slice())
            .unwrap_or(&[])
    }

    /// All UI elements: the feature's first, then the global ones.
    ///
    /// This is the order local ids for [`NodeKind::UiElement`](super::NodeKind)
    /// are assigned in.
    pub fn all_ui_elements(&self) -> impl Iterator<Item = &UiElement> {
        self.feature_ui_elements().iter().chain(self.ui_elements.iter())
    }

    /// Look up a UI element by its document-local index.
    pub fn ui_element(&self, local: usize) -> Option<&UiElement> {
        let feature_count = self.feature_ui_elements().len();
        if local < feature_count {
            self.feature_ui_elements().get(local)
        } else {
            self.ui_elements.get(local - feature_count)
        }
    }

    /// Mutable variant of [`Document::ui_element`].
    pub fn ui_element_mut(&mut self, local: usize) -> Option<&mut UiElement> {
        let feature_count = self.feature_ui_elements().len();
        if local < feature_count {
            self.feature.as_mut()?.ui_elements.get_mut(local)
        } else {
            self.ui_elements.get_mut(local - feature_count)
        }
    }

    /// Resolve every import to the path it designates.
    ///
    /// An explicit `resolved_path` wins (made absolute against this
    /// document's directory); otherwise the raw value is resolved relative
    /// to this document's own path.
    pub fn import_targets(&self) -> impl Iterator<Item = (&Import, PathBuf)> + '_ {
        self.imports.iter().map(move |import| {
            let target = match &import.resolved_path {
                Some(resolved) => {
                    let dir = self.file_path.parent().unwrap_or_else(|| Path::new(""));
                    absolutize(resolved, dir)
                }
                None => resolve_relative(&self.file_path, &import.value),
            };
            (import, target)
        })
    }
}

// ============================================================================
// IMPORTS
// ============================================================================

/// An import declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Import {
    /// The path exactly as written.
    pub value: String,
    /// The path as resolved by the parser, if it did so.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resolved_path: Option<PathBuf>,
    pub location: Location,
}

impl Import {
    pub fn new(value: impl Into<String>, location: Location) -> Self {
        Self {
            value: value.into(),
            resolved_path: None,
            location,
        }
    }
}

// ============================================================================
// FEATURES, SCENARIOS, VARIANTS
// ============================================================================

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    pub name: SmolStr,
    pub location: Location,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ui_elements: Vec<UiElement>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            ui_elements: Vec::new(),
            scenarios: Vec::new(),
        }
    }

    /// Add a UI element owned by this feature.
    pub fn with_ui_element(mut self, mut element: UiElement) -> Self {
        element.feature = Some(self.name.clone());
        self.ui_elements.push(element);
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn variants(&self) -> impl Iterator<Item = &Variant> {
        self.scenarios.iter().flat_map(|s| s.variants.iter())
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scenario {
    pub name: SmolStr,
    pub location: Location,
    #[cfg_attr(feature = "serde", serde(default))]
    pub variants: Vec<Variant>,
}

impl Scenario {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }
}

/// A concrete variant of a scenario.
///
/// Preconditions and state calls require states; postconditions produce them.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Variant {
    pub name: SmolStr,
    pub location: Location,
    pub preconditions: Vec<StateRef>,
    pub state_calls: Vec<StateRef>,
    pub postconditions: Vec<StateRef>,
}

impl Variant {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            ..Self::default()
        }
    }

    pub fn with_precondition(mut self, state: StateRef) -> Self {
        self.preconditions.push(state);
        self
    }

    pub fn with_state_call(mut self, state: StateRef) -> Self {
        self.state_calls.push(state);
        self
    }

    pub fn with_postcondition(mut self, state: StateRef) -> Self {
        self.postconditions.push(state);
        self
    }
}

/// A mention of a named state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateRef {
    pub name: SmolStr,
    pub location: Location,
}

impl StateRef {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

// ============================================================================
// CONSTANTS, DATABASES, TABLES
// ============================================================================

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConstantBlock {
    pub location: Location,
    pub constants: Vec<Constant>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constant {
    pub name: SmolStr,
    pub value: Value,
    pub location: Location,
}

impl Constant {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<Value>, location: Location) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            location,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Database {
    pub name: SmolStr,
    pub location: Location,
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<DatabaseProperty>,
}

impl Database {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            properties: Vec::new(),
        }
    }

    pub fn with_property(
        mut self,
        kind: DatabasePropertyKind,
        value: impl Into<String>,
        location: Location,
    ) -> Self {
        self.properties.push(DatabaseProperty {
            kind,
            value: value.into(),
            location,
        });
        self
    }

    /// Value of the first property of `kind`.
    pub fn property(&self, kind: DatabasePropertyKind) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.value.as_str())
    }

    /// The declared database type (`sqlite`, `mysql`, ...), lower-cased.
    pub fn database_type(&self) -> Option<String> {
        self.property(DatabasePropertyKind::Type)
            .map(|t| t.trim().to_lowercase())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DatabasePropertyKind {
    Type,
    Name,
    Path,
    Host,
    Port,
    Username,
    Password,
    Charset,
    Options,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatabaseProperty {
    pub kind: DatabasePropertyKind,
    pub value: String,
    pub location: Location,
}

/// An in-specification table. The first row holds the column names.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    pub name: SmolStr,
    pub location: Location,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            rows: Vec::new(),
        }
    }

    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }
}

// ============================================================================
// UI ELEMENTS
// ============================================================================

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UiElement {
    pub name: SmolStr,
    /// Owning feature; `None` for global elements.
    #[cfg_attr(feature = "serde", serde(default))]
    pub feature: Option<SmolStr>,
    pub location: Location,
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<UiProperty>,
}

impl UiElement {
    pub fn new(name: impl Into<SmolStr>, location: Location) -> Self {
        Self {
            name: name.into(),
            feature: None,
            location,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: UiProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn is_global(&self) -> bool {
        self.feature.is_none()
    }

    /// The variable that designates this element: `feature:name`, or just
    /// `name` for a global element.
    pub fn variable(&self) -> String {
        match &self.feature {
            Some(feature) => format!("{}:{}", feature, self.name),
            None => self.name.to_string(),
        }
    }

    /// Whether `variable` designates this element (case-insensitive).
    ///
    /// A qualified variable must match both the feature and the element
    /// name. An unqualified one matches any element with that name.
    pub fn matches_variable(&self, variable: &str) -> bool {
        let name = name_key(&self.name);
        match split_variable(variable) {
            (Some(feature), wanted) => {
                name == name_key(wanted)
                    && self
                        .feature
                        .as_deref()
                        .is_some_and(|f| name_key(f) == name_key(feature))
            }
            (None, wanted) => name == name_key(wanted),
        }
    }
}

/// Split `feature:element` into its parts. Whitespace around each part is
/// ignored.
pub fn split_variable(variable: &str) -> (Option<&str>, &str) {
    match variable.split_once(':') {
        Some((feature, name)) => (Some(feature.trim()), name.trim()),
        None => (None, variable.trim()),
    }
}

/// Lookup key of a name: trimmed and lowercased.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Lookup key of a variable, folding each part like [`name_key`].
pub(crate) fn variable_key(variable: &str) -> String {
    match split_variable(variable) {
        (Some(feature), name) => format!("{}:{}", name_key(feature), name_key(name)),
        (None, name) => name_key(name),
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UiProperty {
    pub kind: UiPropertyKind,
    pub value: UiValue,
    pub location: Location,
}

impl UiProperty {
    pub fn new(kind: UiPropertyKind, value: UiValue, location: Location) -> Self {
        Self {
            kind,
            value,
            location,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UiPropertyKind {
    Id,
    Type,
    Editable,
    DataType,
    Value,
    MinLength,
    MaxLength,
    MinValue,
    MaxValue,
    Format,
    Required,
}

/// The value of a UI property plus what resolution found for it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UiValue {
    /// The literal text as written.
    pub raw: String,
    /// What the entity classifier recognized the value as.
    pub entity: EntityValue,
    /// Declarations the value refers to, in the order their tokens appear.
    #[cfg_attr(feature = "serde", serde(default))]
    pub references: Vec<DefId>,
}

impl UiValue {
    pub fn literal(raw: impl Into<String>) -> Self {
        Self::classified(raw, EntityValue::Literal)
    }

    pub fn constant(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        Self::classified(format!("[{name}]"), EntityValue::Constant(name))
    }

    pub fn ui_element(variable: impl Into<SmolStr>) -> Self {
        let variable = variable.into();
        Self::classified(
            format!("{{{variable}}}"),
            EntityValue::UiElementReference(variable),
        )
    }

    pub fn query(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::classified(text.clone(), EntityValue::Query(text))
    }

    fn classified(raw: impl Into<String>, entity: EntityValue) -> Self {
        Self {
            raw: raw.into(),
            entity,
            references: Vec::new(),
        }
    }
}

/// The classification the entity recognizer assigned to a property value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "content", rename_all = "snake_case"))]
pub enum EntityValue {
    /// A reference to a constant by name.
    Constant(SmolStr),
    /// A reference to a UI element by variable (`feature:element` or `element`).
    UiElementReference(SmolStr),
    /// A query whose text may embed `[name]` and `{variable}` tokens.
    Query(String),
    /// A plain value, passed through unresolved.
    Literal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32) -> Location {
        Location::new(line, 1)
    }

    #[test]
    fn test_feature_sets_ui_element_owner() {
        let feature = Feature::new("Login", loc(1)).with_ui_element(UiElement::new("user", loc(2)));
        assert_eq!(feature.ui_elements[0].feature.as_deref(), Some("Login"));
        assert_eq!(feature.ui_elements[0].variable(), "Login:user");
    }

    #[test]
    fn test_document_global_ui_element_has_no_owner() {
        let mut element = UiElement::new("ok", loc(1));
        element.feature = Some("Stale".into());
        let doc = Document::new("/a.feature").with_ui_element(element);
        assert!(doc.ui_elements[0].is_global());
        assert_eq!(doc.ui_elements[0].variable(), "ok");
    }

    #[test]
    fn test_ui_element_local_indexing() {
        let doc = Document::new("/a.feature")
            .with_feature(
                Feature::new("F", loc(1))
                    .with_ui_element(UiElement::new("a", loc(2)))
                    .with_ui_element(UiElement::new("b", loc(3))),
            )
            .with_ui_element(UiElement::new("g", loc(4)));

        assert_eq!(doc.ui_element(0).map(|e| e.name.as_str()), Some("a"));
        assert_eq!(doc.ui_element(1).map(|e| e.name.as_str()), Some("b"));
        assert_eq!(doc.ui_element(2).map(|e| e.name.as_str()), Some("g"));
        assert!(doc.ui_element(3).is_none());
        assert_eq!(doc.all_ui_elements().count(), 3);
    }

    #[test]
    fn test_matches_variable() {
        let element = Feature::new("Foo", loc(1))
            .with_ui_element(UiElement::new("x1", loc(2)))
            .ui_elements
            .remove(0);

        assert!(element.matches_variable("foo:x1"));
        assert!(element.matches_variable("X1"));
        assert!(!element.matches_variable("bar:x1"));
        assert!(!element.matches_variable("foo:x2"));
    }

    #[test]
    fn test_matches_variable_folds_non_ascii_case() {
        let element = Feature::new("Ärger", loc(1))
            .with_ui_element(UiElement::new("Größe", loc(2)))
            .ui_elements
            .remove(0);

        assert!(element.matches_variable("ärger:größe"));
        assert!(element.matches_variable("GRÖßE"));
        assert_eq!(variable_key(" ÄRGER:GRÖßE "), "ärger:größe");
    }

    #[test]
    fn test_global_element_does_not_match_qualified_variable() {
        let element = UiElement::new("x1", loc(1));
        assert!(element.matches_variable("x1"));
        assert!(!element.matches_variable("foo:x1"));
    }

    #[test]
    fn test_import_targets() {
        let mut doc = Document::new("/spec/sub/b.feature")
            .with_import("../a.feature", loc(1))
            .with_import("c.feature", loc(2));
        doc.imports[1].resolved_path = Some(PathBuf::from("/other/c.feature"));

        let targets: Vec<_> = doc.import_targets().map(|(_, p)| p).collect();
        assert_eq!(
            targets,
            vec![PathBuf::from("/spec/a.feature"), PathBuf::from("/other/c.feature")]
        );
    }

    #[test]
    fn test_database_type_is_lowercased() {
        let db = Database::new("mydb", loc(1)).with_property(
            DatabasePropertyKind::Type,
            " SQLite ",
            loc(2),
        );
        assert_eq!(db.database_type().as_deref(), Some("sqlite"));
        assert!(db.property(DatabasePropertyKind::Host).is_none());
    }

    #[test]
    fn test_split_variable() {
        assert_eq!(split_variable("Feature1:zoo"), (Some("Feature1"), "zoo"));
        assert_eq!(split_variable(" foo "), (None, "foo"));
    }
}
