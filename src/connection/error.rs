//! Errors reported by database connections.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The provider cannot handle this database type.
    #[error("Unsupported database type: {0}")]
    Unsupported(String),

    #[error("Could not connect to \"{name}\": {message}")]
    Connect { name: String, message: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Could not disconnect: {0}")]
    Disconnect(String),
}

impl ConnectionError {
    pub fn connect(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The failure without the database name, for messages that already
    /// name it.
    pub fn reason(&self) -> String {
        match self {
            Self::Connect { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
