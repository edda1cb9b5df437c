//! Pipeline configuration.

/// Options for a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisOptions {
    /// Open a connection to every declared database.
    pub check_connections: bool,
    /// Close each connection as soon as it has been opened.
    pub disconnect_after_check: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_connections: true,
            disconnect_after_check: true,
        }
    }
}

impl AnalysisOptions {
    /// Options for a purely static run: no database is contacted.
    pub fn offline() -> Self {
        Self {
            check_connections: false,
            ..Self::default()
        }
    }
}
