//! Import graph: documents as vertices, imports as edges.
//!
//! An edge `a -> b` means document `a` imports `b`, i.e. `a` depends on
//! `b`. Vertices are keyed by normalized absolute path; an imported path
//! without a registered document still gets a vertex (with no document)
//! so every edge has both ends.
//!
//! The graph is a snapshot: it is rebuilt from the [`AugmentedSpec`]
//! whenever documents or imports change and is never mutated while it is
//! being walked.

mod components;
mod cycles;
mod order;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::base::FileId;
use crate::hir::AugmentedSpec;

/// Directed import graph over document paths.
#[derive(Clone, Debug, Default)]
pub struct ImportGraph {
    /// Vertex key → registered document, in insertion order.
    vertices: IndexMap<PathBuf, Option<FileId>>,
    /// Out-edges per vertex index, without repeats, in insertion order.
    edges: Vec<Vec<usize>>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every document of `spec`.
    ///
    /// Registered documents become vertices in registration order, followed
    /// by imported paths that have no document.
    pub fn build(spec: &AugmentedSpec) -> Self {
        let mut graph = Self::new();
        for (file, doc) in spec.iter() {
            let index = graph.ensure_vertex(&doc.file_path);
            graph.vertices[index] = Some(file);
        }
        for doc in spec.documents() {
            for (_, target) in doc.import_targets() {
                graph.add_edge(&doc.file_path, &target);
            }
        }

        tracing::debug!(
            "Built import graph with {} vertices and {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );
        graph
    }

    /// Return the index of the vertex for `path`, adding it if needed.
    pub fn ensure_vertex(&mut self, path: &Path) -> usize {
        if let Some(index) = self.vertices.get_index_of(path) {
            return index;
        }
        let (index, _) = self.vertices.insert_full(path.to_path_buf(), None);
        self.edges.push(Vec::new());
        index
    }

    /// Attach a document to the vertex for `path`.
    pub fn set_document(&mut self, path: &Path, file: FileId) {
        let index = self.ensure_vertex(path);
        self.vertices[index] = Some(file);
    }

    /// Add the edge `from -> to`, creating missing vertices.
    ///
    /// Returns `false` if the edge was already present.
    pub fn add_edge(&mut self, from: &Path, to: &Path) -> bool {
        let from = self.ensure_vertex(from);
        let to = self.ensure_vertex(to);
        if self.edges[from].contains(&to) {
            return false;
        }
        self.edges[from].push(to);
        true
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.vertices.contains_key(path)
    }

    /// The document registered for `path`, if any.
    pub fn document(&self, path: &Path) -> Option<FileId> {
        self.vertices.get(path).copied().flatten()
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (&Path, Option<FileId>)> {
        self.vertices
            .iter()
            .map(|(path, file)| (path.as_path(), *file))
    }

    /// Every edge as `(importer, imported)`.
    pub fn edges(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.edges.iter().enumerate().flat_map(move |(from, targets)| {
            targets
                .iter()
                .map(move |&to| (self.path_at(from), self.path_at(to)))
        })
    }

    /// Paths that `path` imports.
    pub fn successors(&self, path: &Path) -> Vec<&Path> {
        self.vertices
            .get_index_of(path)
            .map(|index| self.edges[index].iter().map(|&to| self.path_at(to)).collect())
            .unwrap_or_default()
    }

    /// Enumerate the elementary cycles of the graph.
    ///
    /// Each cycle lists the paths in edge order, starting from its
    /// earliest-inserted vertex; the edge from the last path back to the
    /// first closes it. A self-import is a cycle of length one.
    pub fn cycles(&self) -> Vec<Vec<PathBuf>> {
        cycles::elementary_cycles(&self.edges)
            .into_iter()
            .map(|cycle| {
                cycle
                    .into_iter()
                    .map(|index| self.path_at(index).to_path_buf())
                    .collect()
            })
            .collect()
    }

    /// Vertices such that every vertex comes after the vertices it imports.
    ///
    /// Vertices on a common cycle are yielded next to each other, by
    /// insertion order; everything else stays ordered around them.
    pub fn vertices_topologically(&self) -> Vec<(&Path, Option<FileId>)> {
        order::dependencies_first(&self.edges)
            .into_iter()
            .map(|index| (self.path_at(index), self.vertices[index]))
            .collect()
    }

    fn path_at(&self, index: usize) -> &Path {
        self.vertices
            .get_index(index)
            .map(|(path, _)| path.as_path())
            .unwrap_or_else(|| Path::new(""))
    }
}
