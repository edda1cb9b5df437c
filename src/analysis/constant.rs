//! Constant checks.

use async_trait::async_trait;

use super::Analyzer;
use super::duplication::check_duplicate_named_entities;
use crate::graph::ImportGraph;
use crate::hir::{AugmentedSpec, NodeKind, ProblemCollector};

/// Checks that no constant name is declared twice in the specification.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantAnalyzer;

#[async_trait]
impl Analyzer for ConstantAnalyzer {
    fn name(&self) -> &'static str {
        "constant"
    }

    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        _graph: &ImportGraph,
    ) -> bool {
        let duplicates =
            check_duplicate_named_entities(&spec.declared_constants(), NodeKind::Constant.display());
        let ok = duplicates.is_empty();
        problems.extend(duplicates);
        ok
    }
}
