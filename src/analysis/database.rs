//! Database checks: duplicate names and reachability.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{AnalysisOptions, Analyzer};
use super::duplication::check_duplicate_named_entities;
use crate::connection::{ConnectionError, ConnectionProvider};
use crate::graph::ImportGraph;
use crate::hir::{AugmentedSpec, Database, NodeKind, ProblemCollector, codes, name_key};

/// What happened when the analyzer tried to reach a database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Connected,
    Failed(String),
    /// No connection was attempted.
    Skipped,
}

/// Outcomes by lowercased database name, in declaration order.
pub type ConnectionOutcomes = Arc<Mutex<IndexMap<String, ConnectionOutcome>>>;

/// Checks database names, then tries to connect to each database.
///
/// Databases are contacted one at a time, in declaration order. A
/// database that cannot be reached is a warning, not an error: static
/// analysis may well run without live databases.
pub struct DatabaseAnalyzer {
    options: AnalysisOptions,
    provider: Option<Arc<dyn ConnectionProvider>>,
    outcomes: ConnectionOutcomes,
}

impl DatabaseAnalyzer {
    pub fn new(options: AnalysisOptions, provider: Option<Arc<dyn ConnectionProvider>>) -> Self {
        Self {
            options,
            provider,
            outcomes: ConnectionOutcomes::default(),
        }
    }

    /// Shared handle to the outcomes of the last run.
    pub fn outcomes(&self) -> ConnectionOutcomes {
        Arc::clone(&self.outcomes)
    }

    async fn check_connection(
        &self,
        provider: &dyn ConnectionProvider,
        database: &Database,
        base_path: &Path,
    ) -> Result<(), ConnectionError> {
        let mut connection = provider.connection_for(database)?;
        connection.connect(database, base_path).await?;
        if !connection.is_connected() {
            return Err(ConnectionError::connect(
                database.name.as_str(),
                "connection was not established",
            ));
        }

        if self.options.disconnect_after_check {
            if let Err(err) = connection.disconnect().await {
                tracing::warn!("Could not disconnect from database \"{}\": {}", database.name, err);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for DatabaseAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseAnalyzer")
            .field("options", &self.options)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

#[async_trait]
impl Analyzer for DatabaseAnalyzer {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        _graph: &ImportGraph,
    ) -> bool {
        let spec: &AugmentedSpec = spec;
        let databases = spec.declared_databases();

        let duplicates = check_duplicate_named_entities(&databases, NodeKind::Database.display());
        let ok = duplicates.is_empty();
        problems.extend(duplicates);

        self.outcomes.lock().clear();
        for declared in &databases {
            let database = declared.item;
            let key = name_key(&database.name);
            if self.outcomes.lock().contains_key(&key) {
                continue;
            }

            let provider = match &self.provider {
                Some(provider) if self.options.check_connections => Arc::clone(provider),
                _ => {
                    self.outcomes.lock().insert(key, ConnectionOutcome::Skipped);
                    continue;
                }
            };

            let result = self
                .check_connection(provider.as_ref(), database, spec.base_path())
                .await;
            let outcome = match result {
                Ok(()) => {
                    tracing::debug!("Connected to database \"{}\"", database.name);
                    ConnectionOutcome::Connected
                }
                Err(err) => {
                    let reason = err.reason();
                    tracing::warn!("Could not connect to database \"{}\": {}", database.name, reason);
                    problems.warning(
                        &declared.location.file_path.clone().unwrap_or_default(),
                        &declared.location,
                        codes::DATABASE_UNREACHABLE,
                        format!("Could not connect to the database \"{}\": {}", database.name, reason),
                    );
                    ConnectionOutcome::Failed(reason)
                }
            };
            self.outcomes.lock().insert(key, outcome);
        }

        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::base::{Location, Value};
    use crate::connection::{DatabaseConnection, Row};
    use crate::hir::Document;

    /// Counts connection attempts; every attempt succeeds.
    #[derive(Default)]
    struct CountingProvider {
        attempts: AtomicUsize,
    }

    struct Connection(bool);

    #[async_trait]
    impl DatabaseConnection for Connection {
        async fn connect(&mut self, _database: &Database, _base_path: &Path) -> Result<(), ConnectionError> {
            self.0 = true;
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.0
        }

        async fn disconnect(&mut self) -> Result<(), ConnectionError> {
            self.0 = false;
            Ok(())
        }

        async fn query(&mut self, _query: &str, _params: &[Value]) -> Result<Vec<Row>, ConnectionError> {
            Ok(Vec::new())
        }
    }

    impl ConnectionProvider for CountingProvider {
        fn connection_for(&self, _database: &Database) -> Result<Box<dyn DatabaseConnection>, ConnectionError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Connection(false)))
        }
    }

    fn spec_with(databases: Vec<Database>) -> AugmentedSpec {
        let mut spec = AugmentedSpec::new("/spec");
        let mut doc = Document::new("/spec/db.feature");
        for database in databases {
            doc = doc.with_database(database);
        }
        spec.add_document(doc);
        spec
    }

    #[tokio::test]
    async fn test_duplicate_databases() {
        let mut spec = spec_with(vec![
            Database::new("MyDB", Location::new(1, 1)),
            Database::new("mydb", Location::new(5, 1)),
        ]);
        let graph = ImportGraph::build(&spec);
        let mut problems = ProblemCollector::new();
        let analyzer = DatabaseAnalyzer::new(AnalysisOptions::offline(), None);

        assert!(!analyzer.analyze(&mut problems, &mut spec, &graph).await);
        assert_eq!(problems.len(), 1);
        let diag = problems.iter().next().unwrap();
        assert_eq!(
            diag.message.as_ref(),
            "Duplicated database \"MyDB\" in: \n  (1,1) /spec/db.feature\n  (5,1) /spec/db.feature"
        );
        assert_eq!(diag.code.as_deref(), Some(codes::DUPLICATE_DEFINITION));
    }

    #[tokio::test]
    async fn test_names_differing_in_case_share_one_outcome() {
        let mut spec = spec_with(vec![
            Database::new("MyDB", Location::new(1, 1)),
            Database::new("mydb", Location::new(5, 1)),
        ]);
        let graph = ImportGraph::build(&spec);
        let mut problems = ProblemCollector::new();
        let provider = Arc::new(CountingProvider::default());
        let shared: Arc<dyn ConnectionProvider> = provider.clone();
        let analyzer = DatabaseAnalyzer::new(AnalysisOptions::default(), Some(shared));

        analyzer.analyze(&mut problems, &mut spec, &graph).await;

        let outcomes = analyzer.outcomes();
        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes.get("mydb"), Some(&ConnectionOutcome::Connected));
        assert_eq!(provider.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_offline_outcomes_are_skipped() {
        let mut spec = spec_with(vec![Database::new("Sales", Location::new(1, 1))]);
        let graph = ImportGraph::build(&spec);
        let mut problems = ProblemCollector::new();
        let shared: Arc<dyn ConnectionProvider> = Arc::new(CountingProvider::default());
        let analyzer = DatabaseAnalyzer::new(AnalysisOptions::offline(), Some(shared));

        assert!(analyzer.analyze(&mut problems, &mut spec, &graph).await);
        assert!(problems.is_empty());
        assert_eq!(analyzer.outcomes().lock().get("sales"), Some(&ConnectionOutcome::Skipped));
    }
}
