//! Import checks: missing targets and cyclic imports.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::Analyzer;
use crate::base::Location;
use crate::graph::ImportGraph;
use crate::hir::{AugmentedSpec, Diagnostic, ProblemCollector, SpecError, codes};

/// Reports imports without a document and every import cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportAnalyzer;

#[async_trait]
impl Analyzer for ImportAnalyzer {
    fn name(&self) -> &'static str {
        "import"
    }

    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        graph: &ImportGraph,
    ) -> bool {
        let errors_before = problems.error_count();
        check_missing_imports(problems, spec);
        check_cycles(problems, spec, graph);
        problems.error_count() == errors_before
    }
}

fn check_missing_imports(problems: &mut ProblemCollector, spec: &AugmentedSpec) {
    for doc in spec.documents() {
        for (import, target) in doc.import_targets() {
            if spec.file_id(&target).is_none() {
                problems.add(
                    Diagnostic::error(
                        &doc.file_path,
                        &import.location,
                        format!("Imported file not found: \"{}\"", import.value),
                    )
                    .with_code(codes::MISSING_IMPORT),
                );
            }
        }
    }
}

fn check_cycles(problems: &mut ProblemCollector, spec: &AugmentedSpec, graph: &ImportGraph) {
    for cycle in graph.cycles() {
        let (Some(first), Some(last)) = (cycle.first(), cycle.last()) else {
            continue;
        };
        let message = cycle_message(&cycle);
        tracing::trace!("{}", message);

        match closing_import(spec, graph, last, first) {
            Ok((file, location)) => problems.add(
                Diagnostic::error(&file, &location, message).with_code(codes::CIRCULAR_DEPENDENCY),
            ),
            Err(err) => problems.add(
                Diagnostic::error(last, &Location::file_start(last), err.to_string())
                    .with_code(codes::SETUP),
            ),
        }
    }
}

/// `Cyclic reference: "a" => "b" => "a".`
fn cycle_message(cycle: &[PathBuf]) -> String {
    let mut chain: Vec<String> = cycle
        .iter()
        .map(|path| format!("\"{}\"", path.display()))
        .collect();
    if let Some(first) = chain.first().cloned() {
        chain.push(first);
    }
    format!("Cyclic reference: {}.", chain.join(" => "))
}

/// The document closing the cycle and the location of its import of
/// `first`, or the start of that document when the import is not found.
fn closing_import(
    spec: &AugmentedSpec,
    graph: &ImportGraph,
    last: &Path,
    first: &Path,
) -> Result<(PathBuf, Location), SpecError> {
    let doc = graph
        .document(last)
        .and_then(|file| spec.document(file))
        .ok_or_else(|| SpecError::document_not_found(last))?;

    let location = doc
        .import_targets()
        .find(|(_, target)| target == first)
        .map(|(import, _)| import.location.clone())
        .unwrap_or_else(|| Location::new(1, 1));
    Ok((doc.file_path.clone(), location))
}
