//! Database connections: what the database analyzer needs from a driver.
//!
//! No driver lives in this crate. The surrounding application supplies a
//! [`ConnectionProvider`] that hands out a [`DatabaseConnection`] for each
//! declared [`Database`]; the analyzer only tells "connected" from "failed".

mod error;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;

pub use error::ConnectionError;

use crate::base::{Value, absolutize};
use crate::hir::{Database, DatabasePropertyKind};

/// One result row, column name → value, in column order.
pub type Row = IndexMap<String, Value>;

/// Database types whose `path` property names a file.
pub const FILE_BASED_TYPES: &[&str] = &["sqlite", "json", "csv", "xlsx", "ini", "alasql"];

/// An open (or openable) connection to one database.
#[async_trait]
pub trait DatabaseConnection: Send {
    /// Connect to `database`. File paths resolve against `base_path`.
    async fn connect(&mut self, database: &Database, base_path: &Path) -> Result<(), ConnectionError>;

    fn is_connected(&self) -> bool;

    async fn disconnect(&mut self) -> Result<(), ConnectionError>;

    /// Run `query` with positional `params`.
    async fn query(&mut self, query: &str, params: &[Value]) -> Result<Vec<Row>, ConnectionError>;
}

/// Hands out connections by database declaration.
pub trait ConnectionProvider: Send + Sync {
    fn connection_for(&self, database: &Database) -> Result<Box<dyn DatabaseConnection>, ConnectionError>;
}

/// Whether `database` is stored in a file.
pub fn is_file_based(database: &Database) -> bool {
    database
        .database_type()
        .is_some_and(|kind| FILE_BASED_TYPES.contains(&kind.as_str()))
}

/// The file a file-based database lives in, resolved against `base_path`.
///
/// `None` for server databases and for file-based ones without a `path`.
pub fn resolve_database_path(database: &Database, base_path: &Path) -> Option<PathBuf> {
    if !is_file_based(database) {
        return None;
    }
    let path = database.property(DatabasePropertyKind::Path)?.trim();
    if path.is_empty() {
        return None;
    }
    Some(absolutize(Path::new(path), base_path))
}
