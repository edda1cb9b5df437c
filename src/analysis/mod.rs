//! Semantic analysis: the ordered analyzer pipeline.
//!
//! Each [`Analyzer`] is a single-purpose pass over the whole specification.
//! The [`Pipeline`] runs them in a fixed order, because later passes rely
//! on what earlier ones resolved:
//!
//! 1. [`ImportAnalyzer`] - missing import targets, import cycles
//! 2. [`UiElementAnalyzer`] - UI element names, property value references
//! 3. [`FeatureAnalyzer`] - feature names, variant states
//! 4. [`ConstantAnalyzer`] - constant names
//! 5. [`DatabaseAnalyzer`] - database names, reachability
//! 6. [`TableAnalyzer`] - table names
//!
//! Every pass always runs. Problems go to a shared [`ProblemCollector`];
//! the pipeline result is the conjunction of the passes' results.

mod constant;
mod database;
mod duplication;
mod feature;
mod import;
mod options;
mod table;
mod ui_element;

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

pub use constant::ConstantAnalyzer;
pub use database::{ConnectionOutcome, ConnectionOutcomes, DatabaseAnalyzer};
pub use duplication::{check_duplicate_named_entities, group_duplicates};
pub use feature::FeatureAnalyzer;
pub use import::ImportAnalyzer;
pub use options::AnalysisOptions;
pub use table::TableAnalyzer;
pub use ui_element::UiElementAnalyzer;

use crate::connection::ConnectionProvider;
use crate::graph::ImportGraph;
use crate::hir::{AugmentedSpec, ProblemCollector};

/// A single analysis pass.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short name of the pass, used in logs.
    fn name(&self) -> &'static str;

    /// Run the pass. Returns `false` if it reported any error.
    ///
    /// Problems are reported through `problems`, never returned as errors.
    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        graph: &ImportGraph,
    ) -> bool;
}

/// Result of analyzing a whole specification.
#[derive(Debug)]
pub struct AnalysisReport {
    /// `true` when no pass reported an error.
    pub ok: bool,
    pub problems: ProblemCollector,
    /// The graph the passes walked.
    pub graph: ImportGraph,
}

/// Ordered list of analyzers.
pub struct Pipeline {
    analyzers: Vec<Box<dyn Analyzer>>,
    outcomes: ConnectionOutcomes,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AnalysisOptions::default(), None)
    }
}

impl Pipeline {
    /// Create a pipeline with the standard passes.
    ///
    /// Without a connection provider, no database is contacted.
    pub fn new(options: AnalysisOptions, provider: Option<Arc<dyn ConnectionProvider>>) -> Self {
        let database = DatabaseAnalyzer::new(options, provider);
        let outcomes = database.outcomes();

        let mut pipeline = Self {
            analyzers: Vec::new(),
            outcomes,
        };

        // Passes in dependency order
        pipeline.register(Box::new(ImportAnalyzer));
        pipeline.register(Box::new(UiElementAnalyzer));
        pipeline.register(Box::new(FeatureAnalyzer));
        pipeline.register(Box::new(ConstantAnalyzer));
        pipeline.register(Box::new(database));
        pipeline.register(Box::new(TableAnalyzer));

        pipeline
    }

    /// Append a pass; it runs after every pass registered before it.
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Names of the registered passes, in run order.
    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Outcome of each database connection attempt made by the last run.
    pub fn connection_outcomes(&self) -> IndexMap<String, ConnectionOutcome> {
        self.outcomes.lock().clone()
    }

    /// Run every pass over `spec` and `graph`.
    ///
    /// Never stops early: a failing pass does not prevent later ones from
    /// running.
    pub async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        graph: &ImportGraph,
    ) -> bool {
        let mut ok = true;
        for analyzer in &self.analyzers {
            tracing::debug!("Running {} analyzer", analyzer.name());
            let before = problems.len();
            let passed = analyzer.analyze(problems, spec, graph).await;
            tracing::debug!(
                "Finished {} analyzer: ok={}, {} new problems",
                analyzer.name(),
                passed,
                problems.len() - before
            );
            ok &= passed;
        }
        ok
    }

    /// Build the import graph for `spec` and run every pass over it.
    pub async fn analyze_spec(&self, spec: &mut AugmentedSpec) -> AnalysisReport {
        let graph = ImportGraph::build(spec);
        let mut problems = ProblemCollector::new();
        let ok = self.analyze(&mut problems, spec, &graph).await;
        AnalysisReport { ok, problems, graph }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("analyzers", &self.analyzer_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Location;
    use crate::hir::{Constant, Document, Table};

    #[test]
    fn test_standard_pass_order() {
        let pipeline = Pipeline::default();
        assert_eq!(
            pipeline.analyzer_names(),
            vec!["import", "ui-element", "feature", "constant", "database", "table"]
        );
    }

    #[tokio::test]
    async fn test_all_passes_run_after_a_failure() {
        let mut spec = AugmentedSpec::new("/spec");
        spec.add_document(
            Document::new("/spec/a.feature")
                .with_import("a.feature", Location::new(1, 1))
                .with_constant(Constant::new("c", 1, Location::new(2, 1)))
                .with_constant(Constant::new("c", 2, Location::new(3, 1)))
                .with_table(Table::new("t", Location::new(4, 1)))
                .with_table(Table::new("t", Location::new(5, 1))),
        );

        let report = Pipeline::new(AnalysisOptions::offline(), None)
            .analyze_spec(&mut spec)
            .await;
        assert!(!report.ok);
        // cycle, duplicate constant, duplicate table
        assert_eq!(report.problems.error_count(), 3);
    }

    #[tokio::test]
    async fn test_registered_pass_runs_last() {
        struct Failing;

        #[async_trait]
        impl Analyzer for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }

            async fn analyze(
                &self,
                _problems: &mut ProblemCollector,
                _spec: &mut AugmentedSpec,
                _graph: &ImportGraph,
            ) -> bool {
                false
            }
        }

        let mut pipeline = Pipeline::default();
        pipeline.register(Box::new(Failing));
        assert_eq!(pipeline.analyzer_names().last(), Some(&"failing"));

        let mut spec = AugmentedSpec::new("/spec");
        let report = pipeline.analyze_spec(&mut spec).await;
        assert!(!report.ok);
        assert!(report.problems.is_empty());
    }
}
