//! Table checks.

use async_trait::async_trait;

use super::Analyzer;
use super::duplication::check_duplicate_named_entities;
use crate::graph::ImportGraph;
use crate::hir::{AugmentedSpec, NodeKind, ProblemCollector};

/// Checks that no table name is declared twice in the specification.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableAnalyzer;

#[async_trait]
impl Analyzer for TableAnalyzer {
    fn name(&self) -> &'static str {
        "table"
    }

    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        _graph: &ImportGraph,
    ) -> bool {
        let duplicates =
            check_duplicate_named_entities(&spec.declared_tables(), NodeKind::Table.display());
        let ok = duplicates.is_empty();
        problems.extend(duplicates);
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Location;
    use crate::hir::{Document, Table};

    #[tokio::test]
    async fn test_duplicate_tables_in_one_file() {
        let mut spec = AugmentedSpec::new("/spec");
        spec.add_document(
            Document::new("/spec/a.feature")
                .with_table(Table::new("users", Location::new(1, 1)).with_row(["id", "name"]))
                .with_table(Table::new("users", Location::new(5, 1))),
        );
        let graph = ImportGraph::build(&spec);
        let mut problems = ProblemCollector::new();

        assert!(!TableAnalyzer.analyze(&mut problems, &mut spec, &graph).await);
        assert_eq!(problems.diagnostics_for_file(std::path::Path::new("/spec/a.feature")).len(), 1);
    }
}
