//! Foundation types for the behave toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`FileId`] - Identifier of a registered document
//! - [`Location`] - Line/column position, optionally tied to a file
//! - [`Value`] - Typed literal carried by constants and substituted into queries
//! - [`normalize_path`], [`resolve_relative`], [`absolutize`] - Lexical path handling
//!
//! This module has NO dependencies on other behave modules.

mod file_id;
mod location;
mod path;
mod value;

pub use file_id::FileId;
pub use location::Location;
pub use path::{absolutize, normalize_path, resolve_relative};
pub use value::Value;
