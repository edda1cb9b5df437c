//! Semantic identifiers for declarations.

use std::fmt;

use crate::base::FileId;

/// The kind of declaration a [`DefId`] points to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Feature,
    Constant,
    Table,
    Database,
    UiElement,
}

impl NodeKind {
    /// Human-readable name used in diagnostics.
    pub fn display(&self) -> &'static str {
        match self {
            NodeKind::Feature => "feature",
            NodeKind::Constant => "constant",
            NodeKind::Table => "table",
            NodeKind::Database => "database",
            NodeKind::UiElement => "UI Element",
        }
    }
}

/// A globally unique identifier for a declaration.
///
/// Combines the document where the declaration lives, its kind and a
/// document-local position. Resolved references are stored as `DefId`s, so
/// two references are the same node exactly when their ids are equal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefId {
    /// The document containing this declaration
    pub file: FileId,
    /// What is declared
    pub kind: NodeKind,
    /// Position among the declarations of `kind` in the document
    pub local: LocalDefId,
}

impl DefId {
    /// Create a new DefId.
    #[inline]
    pub const fn new(file: FileId, kind: NodeKind, local: LocalDefId) -> Self {
        Self { file, kind, local }
    }
}

impl fmt::Debug for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefId({:?}:{:?}:{})", self.file, self.kind, self.local.0)
    }
}

/// A document-local declaration index.
///
/// Assigned in declaration order per kind. For UI elements, the elements of
/// the document's feature come first, followed by the global ones.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalDefId(pub u32);

impl LocalDefId {
    /// Create a new LocalDefId.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LocalDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalDefId({})", self.0)
    }
}

impl From<usize> for LocalDefId {
    #[inline]
    fn from(id: usize) -> Self {
        Self(id as u32)
    }
}
