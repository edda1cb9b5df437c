//! The augmented specification: every document plus cached symbol tables.
//!
//! # Caches
//!
//! Symbol tables are built lazily on first query by scanning every document
//! once, then memoized until [`AugmentedSpec::clear_cache`] (or a targeted
//! [`AugmentedSpec::rebuild`]) drops them. Each cache is held in a
//! [`Memo`], so a cache is either absent or complete.
//!
//! The path index is the registry itself and is maintained eagerly by
//! [`AugmentedSpec::add_document`].
//!
//! # Identity
//!
//! Declarations are addressed by [`DefId`]. Caches store ids, never
//! borrows, so documents can be mutated (to attach resolved references)
//! without invalidating them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::cache::Memo;
use super::document::{
    Constant, Database, Document, Feature, NamedEntity, Table, UiElement, name_key, variable_key,
};
use super::error::SpecError;
use super::ids::{DefId, LocalDefId, NodeKind};
use super::input::SourceRoot;
use crate::base::{FileId, Location, Value, absolutize};

// ============================================================================
// INDICES
// ============================================================================

/// All declarations of one kind, plus a case-insensitive name lookup.
///
/// When a name is declared more than once, lookups return the first
/// declaration; the duplicate itself is reported by the analyzers.
#[derive(Clone, Debug, Default)]
pub struct NameIndex {
    ids: Vec<DefId>,
    by_name: FxHashMap<String, DefId>,
}

impl NameIndex {
    fn push(&mut self, id: DefId, name: &str) {
        self.by_name.entry(name_key(name)).or_insert(id);
        self.ids.push(id);
    }

    /// Every declaration, in document order.
    pub fn ids(&self) -> &[DefId] {
        &self.ids
    }

    /// Look up a declaration by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<DefId> {
        self.by_name.get(&name_key(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// All UI elements, plus a lookup by variable.
///
/// Feature-local elements are keyed as `feature:element`, global ones by
/// their bare name.
#[derive(Clone, Debug, Default)]
pub struct UiElementIndex {
    ids: Vec<DefId>,
    by_variable: FxHashMap<String, DefId>,
}

impl UiElementIndex {
    pub fn ids(&self) -> &[DefId] {
        &self.ids
    }

    /// Look up an element by its exact variable key (case-insensitive).
    pub fn get(&self, variable: &str) -> Option<DefId> {
        self.by_variable.get(&variable_key(variable)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A declaration together with its id and a location that always names a
/// file.
#[derive(Clone, Debug)]
pub struct Declared<'a, T> {
    pub id: DefId,
    pub item: &'a T,
    pub location: Location,
}

impl<T: NamedEntity> NamedEntity for Declared<'_, T> {
    fn name(&self) -> &str {
        self.item.name()
    }

    fn location(&self) -> &Location {
        &self.location
    }
}

// ============================================================================
// AUGMENTED SPECIFICATION
// ============================================================================

/// Every document of a specification plus derived symbol tables.
///
/// Not meant to be shared between concurrent compiles: cache invalidation
/// must not race with in-flight reads.
#[derive(Debug)]
pub struct AugmentedSpec {
    base_path: PathBuf,
    docs: Vec<Document>,
    paths: SourceRoot,
    features: Memo<NameIndex>,
    constants: Memo<NameIndex>,
    tables: Memo<NameIndex>,
    databases: Memo<NameIndex>,
    ui_elements: Memo<UiElementIndex>,
    /// (document, include_globals) → UI elements of the document and its
    /// direct imports.
    doc_ui_elements: RwLock<FxHashMap<(FileId, bool), Arc<Vec<DefId>>>>,
}

impl AugmentedSpec {
    /// Create an empty specification rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            docs: Vec::new(),
            paths: SourceRoot::new(),
            features: Memo::new(),
            constants: Memo::new(),
            tables: Memo::new(),
            databases: Memo::new(),
            ui_elements: Memo::new(),
            doc_ui_elements: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Register a document under its normalized path.
    ///
    /// Returns `false` (and drops `doc`) if a document with that path is
    /// already registered.
    pub fn add_document(&mut self, mut doc: Document) -> bool {
        doc.file_path = absolutize(&doc.file_path, &self.base_path);
        if self.paths.contains(&doc.file_path) {
            tracing::debug!("Ignoring already registered document {}", doc.file_path.display());
            return false;
        }

        assign_ui_element_owners(&mut doc);
        let id = FileId::new(self.docs.len() as u32);
        self.paths.insert(doc.file_path.clone(), id);
        self.docs.push(doc);
        self.clear_cache(false);
        true
    }

    /// Replace the document registered under the same path, or add it if
    /// there is none. Returns the replaced document.
    pub fn replace_document(&mut self, mut doc: Document) -> Option<Document> {
        doc.file_path = absolutize(&doc.file_path, &self.base_path);
        match self.paths.file_id(&doc.file_path) {
            Some(id) => {
                assign_ui_element_owners(&mut doc);
                let old = std::mem::replace(&mut self.docs[id.as_usize()], doc);
                self.clear_cache(false);
                Some(old)
            }
            None => {
                self.add_document(doc);
                None
            }
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Documents with their ids, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &Document)> {
        self.docs
            .iter()
            .enumerate()
            .map(|(index, doc)| (FileId::new(index as u32), doc))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn document(&self, file: FileId) -> Option<&Document> {
        self.docs.get(file.as_usize())
    }

    /// The id of the document registered under `path`.
    ///
    /// Relative paths are taken against the base path.
    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.paths.file_id(&absolutize(path, &self.base_path))
    }

    pub fn document_with_path(&self, path: &Path) -> Option<&Document> {
        self.file_id(path).and_then(|id| self.document(id))
    }

    /// Like [`AugmentedSpec::file_id`], for callers that require the
    /// document to exist.
    pub fn try_file_id(&self, path: &Path) -> Result<FileId, SpecError> {
        self.file_id(path)
            .ok_or_else(|| SpecError::document_not_found(path))
    }

    /// Documents that `file` imports directly.
    ///
    /// Imports without a registered target are skipped; reporting them is
    /// the import analyzer's job.
    pub fn imported_documents_of(&self, file: FileId) -> Vec<FileId> {
        let Some(doc) = self.document(file) else {
            return Vec::new();
        };
        let mut imported = Vec::new();
        for (_, target) in doc.import_targets() {
            if let Some(id) = self.paths.file_id(&target) {
                if !imported.contains(&id) {
                    imported.push(id);
                }
            }
        }
        imported
    }

    // ------------------------------------------------------------------
    // Caches
    // ------------------------------------------------------------------

    /// Drop every memoized table.
    ///
    /// The path index is kept unless `clear_path_index` is set, in which
    /// case it is rebuilt from the documents before returning.
    pub fn clear_cache(&mut self, clear_path_index: bool) {
        self.features.invalidate();
        self.constants.invalidate();
        self.tables.invalidate();
        self.databases.invalidate();
        self.ui_elements.invalidate();
        self.doc_ui_elements.write().clear();

        if clear_path_index {
            self.paths = SourceRoot::from_paths(self.docs.iter().map(|d| d.file_path.as_path()));
        }
    }

    /// Rebuild the cache for one kind of declaration right away.
    pub fn rebuild(&self, kind: NodeKind) {
        match kind {
            NodeKind::Feature => {
                self.features.rebuild(|| self.build_features());
            }
            NodeKind::Constant => {
                self.constants.rebuild(|| self.build_constants());
            }
            NodeKind::Table => {
                self.tables.rebuild(|| self.build_tables());
            }
            NodeKind::Database => {
                self.databases.rebuild(|| self.build_databases());
            }
            NodeKind::UiElement => {
                self.ui_elements.rebuild(|| self.build_ui_elements());
                self.doc_ui_elements.write().clear();
            }
        }
    }

    pub fn features(&self) -> Arc<NameIndex> {
        self.features.get_or_build(|| self.build_features())
    }

    pub fn constants(&self) -> Arc<NameIndex> {
        self.constants.get_or_build(|| self.build_constants())
    }

    pub fn tables(&self) -> Arc<NameIndex> {
        self.tables.get_or_build(|| self.build_tables())
    }

    pub fn databases(&self) -> Arc<NameIndex> {
        self.databases.get_or_build(|| self.build_databases())
    }

    pub fn ui_elements(&self) -> Arc<UiElementIndex> {
        self.ui_elements.get_or_build(|| self.build_ui_elements())
    }

    fn build_features(&self) -> NameIndex {
        let mut index = NameIndex::default();
        for (file, doc) in self.iter() {
            if let Some(feature) = &doc.feature {
                index.push(DefId::new(file, NodeKind::Feature, LocalDefId::new(0)), &feature.name);
            }
        }
        tracing::debug!("Built feature index with {} entries", index.len());
        index
    }

    fn build_constants(&self) -> NameIndex {
        let mut index = NameIndex::default();
        for (file, doc) in self.iter() {
            for (local, constant) in doc.constants().iter().enumerate() {
                index.push(DefId::new(file, NodeKind::Constant, local.into()), &constant.name);
            }
        }
        tracing::debug!("Built constant index with {} entries", index.len());
        index
    }

    fn build_tables(&self) -> NameIndex {
        let mut index = NameIndex::default();
        for (file, doc) in self.iter() {
            for (local, table) in doc.tables.iter().enumerate() {
                index.push(DefId::new(file, NodeKind::Table, local.into()), &table.name);
            }
        }
        tracing::debug!("Built table index with {} entries", index.len());
        index
    }

    fn build_databases(&self) -> NameIndex {
        let mut index = NameIndex::default();
        for (file, doc) in self.iter() {
            for (local, database) in doc.databases.iter().enumerate() {
                index.push(DefId::new(file, NodeKind::Database, local.into()), &database.name);
            }
        }
        tracing::debug!("Built database index with {} entries", index.len());
        index
    }

    fn build_ui_elements(&self) -> UiElementIndex {
        let mut index = UiElementIndex::default();
        for (file, doc) in self.iter() {
            for (local, element) in doc.all_ui_elements().enumerate() {
                let id = DefId::new(file, NodeKind::UiElement, local.into());
                index.by_variable.entry(variable_key(&element.variable())).or_insert(id);
                index.ids.push(id);
            }
        }
        tracing::debug!("Built UI element index with {} entries", index.len());
        index
    }

    // ------------------------------------------------------------------
    // Declarations by id
    // ------------------------------------------------------------------

    pub fn feature(&self, id: DefId) -> Option<&Feature> {
        if id.kind != NodeKind::Feature || id.local.index() != 0 {
            return None;
        }
        self.document(id.file)?.feature.as_ref()
    }

    pub fn constant(&self, id: DefId) -> Option<&Constant> {
        if id.kind != NodeKind::Constant {
            return None;
        }
        self.document(id.file)?
            .constants()
            .get(id.local.index() as usize)
    }

    pub fn table(&self, id: DefId) -> Option<&Table> {
        if id.kind != NodeKind::Table {
            return None;
        }
        self.document(id.file)?.tables.get(id.local.index() as usize)
    }

    pub fn database(&self, id: DefId) -> Option<&Database> {
        if id.kind != NodeKind::Database {
            return None;
        }
        self.document(id.file)?
            .databases
            .get(id.local.index() as usize)
    }

    pub fn ui_element(&self, id: DefId) -> Option<&UiElement> {
        if id.kind != NodeKind::UiElement {
            return None;
        }
        self.document(id.file)?.ui_element(id.local.index() as usize)
    }

    /// Any declaration by id.
    pub fn named(&self, id: DefId) -> Option<&dyn NamedEntity> {
        match id.kind {
            NodeKind::Feature => self.feature(id).map(|n| n as &dyn NamedEntity),
            NodeKind::Constant => self.constant(id).map(|n| n as &dyn NamedEntity),
            NodeKind::Table => self.table(id).map(|n| n as &dyn NamedEntity),
            NodeKind::Database => self.database(id).map(|n| n as &dyn NamedEntity),
            NodeKind::UiElement => self.ui_element(id).map(|n| n as &dyn NamedEntity),
        }
    }

    // ------------------------------------------------------------------
    // Declarations by name
    // ------------------------------------------------------------------

    pub fn feature_with_name(&self, name: &str) -> Option<&Feature> {
        self.features().get(name).and_then(|id| self.feature(id))
    }

    pub fn constant_with_name(&self, name: &str) -> Option<&Constant> {
        self.constants().get(name).and_then(|id| self.constant(id))
    }

    /// The value of the constant called `name`.
    pub fn constant_value(&self, name: &str) -> Option<&Value> {
        self.constant_with_name(name).map(|c| &c.value)
    }

    pub fn table_with_name(&self, name: &str) -> Option<&Table> {
        self.tables().get(name).and_then(|id| self.table(id))
    }

    pub fn database_with_name(&self, name: &str) -> Option<&Database> {
        self.databases().get(name).and_then(|id| self.database(id))
    }

    // ------------------------------------------------------------------
    // UI element resolution
    // ------------------------------------------------------------------

    /// Find the UI element that `variable` designates, as seen from `from`.
    ///
    /// `variable` is `feature:element` or a bare `element`. With a
    /// document, its own elements are searched first, then the elements of
    /// the documents it imports directly (imports of imports are not
    /// searched). Without one, the whole-specification variable index is
    /// used.
    pub fn ui_element_by_variable(&self, variable: &str, from: Option<FileId>) -> Option<DefId> {
        let Some(file) = from else {
            return self.ui_elements().get(variable);
        };

        if let Some(id) = self.find_ui_element_in(file, variable) {
            return Some(id);
        }

        self.imported_documents_of(file)
            .into_iter()
            .find_map(|imported| self.find_ui_element_in(imported, variable))
    }

    fn find_ui_element_in(&self, file: FileId, variable: &str) -> Option<DefId> {
        let doc = self.document(file)?;
        let local = doc
            .all_ui_elements()
            .position(|element| element.matches_variable(variable))?;
        tracing::trace!("Variable {{{}}} found in {}", variable, doc.file_path.display());
        Some(DefId::new(file, NodeKind::UiElement, local.into()))
    }

    /// UI elements of `file` and of the documents it imports directly.
    ///
    /// Feature-local elements are always included; global ones only when
    /// `include_globals` is set. The result is cached per document.
    pub fn extract_ui_elements_from_document_and_imports(
        &self,
        file: FileId,
        include_globals: bool,
    ) -> Arc<Vec<DefId>> {
        if let Some(cached) = self.doc_ui_elements.read().get(&(file, include_globals)) {
            return Arc::clone(cached);
        }

        let mut ids = self.ui_elements_of(file, include_globals);
        for imported in self.imported_documents_of(file) {
            ids.extend(self.ui_elements_of(imported, include_globals));
        }

        let ids = Arc::new(ids);
        self.doc_ui_elements
            .write()
            .entry((file, include_globals))
            .or_insert_with(|| Arc::clone(&ids))
            .clone()
    }

    /// Variables (`feature:element` or `element`) of the UI elements of
    /// `file` and its direct imports.
    pub fn extract_variables_from_document_and_imports(
        &self,
        file: FileId,
        include_globals: bool,
    ) -> Vec<String> {
        self.extract_ui_elements_from_document_and_imports(file, include_globals)
            .iter()
            .filter_map(|&id| self.ui_element(id))
            .map(UiElement::variable)
            .collect()
    }

    fn ui_elements_of(&self, file: FileId, include_globals: bool) -> Vec<DefId> {
        let Some(doc) = self.document(file) else {
            return Vec::new();
        };
        doc.all_ui_elements()
            .enumerate()
            .filter(|(_, element)| include_globals || !element.is_global())
            .map(|(local, _)| DefId::new(file, NodeKind::UiElement, local.into()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Declaration listings for the analyzers
    // ------------------------------------------------------------------

    pub fn declared_features(&self) -> Vec<Declared<'_, Feature>> {
        self.declared(&self.features(), |spec, id| spec.feature(id))
    }

    pub fn declared_constants(&self) -> Vec<Declared<'_, Constant>> {
        self.declared(&self.constants(), |spec, id| spec.constant(id))
    }

    pub fn declared_tables(&self) -> Vec<Declared<'_, Table>> {
        self.declared(&self.tables(), |spec, id| spec.table(id))
    }

    pub fn declared_databases(&self) -> Vec<Declared<'_, Database>> {
        self.declared(&self.databases(), |spec, id| spec.database(id))
    }

    /// UI elements declared outside any feature.
    pub fn declared_global_ui_elements(&self) -> Vec<Declared<'_, UiElement>> {
        self.ui_elements()
            .ids()
            .iter()
            .filter_map(|&id| self.declare(id, self.ui_element(id)?))
            .filter(|declared| declared.item.is_global())
            .collect()
    }

    /// UI elements declared inside the feature of `file`.
    pub fn declared_feature_ui_elements(&self, file: FileId) -> Vec<Declared<'_, UiElement>> {
        self.ui_elements_of(file, false)
            .into_iter()
            .filter_map(|id| self.declare(id, self.ui_element(id)?))
            .collect()
    }

    fn declared<'a, T: NamedEntity>(
        &'a self,
        index: &NameIndex,
        get: impl Fn(&'a Self, DefId) -> Option<&'a T>,
    ) -> Vec<Declared<'a, T>> {
        index
            .ids()
            .iter()
            .filter_map(|&id| self.declare(id, get(self, id)?))
            .collect()
    }

    fn declare<'a, T: NamedEntity>(&'a self, id: DefId, item: &'a T) -> Option<Declared<'a, T>> {
        let doc = self.document(id.file)?;
        Some(Declared {
            id,
            item,
            location: item.location().or_file(&doc.file_path),
        })
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append resolved references to a UI property value.
    ///
    /// References already present are not added twice, so re-running
    /// resolution is harmless.
    pub fn attach_references(
        &mut self,
        element: DefId,
        property: usize,
        references: &[DefId],
    ) -> Result<(), SpecError> {
        let unknown = || SpecError::UnknownDeclaration(format!("{element:?} property {property}"));
        if element.kind != NodeKind::UiElement {
            return Err(unknown());
        }
        let value = &mut self
            .docs
            .get_mut(element.file.as_usize())
            .and_then(|doc| doc.ui_element_mut(element.local.index() as usize))
            .and_then(|e| e.properties.get_mut(property))
            .ok_or_else(unknown)?
            .value;

        for reference in references {
            if !value.references.contains(reference) {
                value.references.push(*reference);
            }
        }
        Ok(())
    }
}

impl Default for AugmentedSpec {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

/// Feature-local elements name their feature; global ones name none.
fn assign_ui_element_owners(doc: &mut Document) {
    if let Some(feature) = doc.feature.as_mut() {
        let name = feature.name.clone();
        for element in &mut feature.ui_elements {
            element.feature = Some(name.clone());
        }
    }
    for element in &mut doc.ui_elements {
        element.feature = None;
    }
}
