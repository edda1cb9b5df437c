//! UI element checks and reference resolution for UI property values.

use std::path::PathBuf;

use async_trait::async_trait;

use super::Analyzer;
use super::duplication::check_duplicate_named_entities;
use crate::base::{FileId, Location};
use crate::graph::ImportGraph;
use crate::hir::{
    AugmentedSpec, DefId, Diagnostic, LocalDefId, NodeKind, ProblemCollector, ValueResolver, codes,
};

/// Checks UI element names and resolves what their property values refer to.
///
/// Documents are visited dependencies first. Resolved references are
/// appended to each property value; anything that does not resolve is
/// reported at the property.
#[derive(Clone, Copy, Debug, Default)]
pub struct UiElementAnalyzer;

/// References found for one property, waiting to be attached.
struct PendingReferences {
    element: DefId,
    property: usize,
    references: Vec<DefId>,
}

#[async_trait]
impl Analyzer for UiElementAnalyzer {
    fn name(&self) -> &'static str {
        "ui-element"
    }

    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        graph: &ImportGraph,
    ) -> bool {
        let errors_before = problems.error_count();

        problems.extend(check_duplicate_named_entities(
            &spec.declared_global_ui_elements(),
            NodeKind::UiElement.display(),
        ));
        for file in spec.iter().map(|(file, _)| file).collect::<Vec<_>>() {
            problems.extend(check_duplicate_named_entities(
                &spec.declared_feature_ui_elements(file),
                NodeKind::UiElement.display(),
            ));
        }

        let files: Vec<FileId> = graph
            .vertices_topologically()
            .into_iter()
            .filter_map(|(_, file)| file)
            .collect();

        for file in files {
            let (path, pending) = resolve_document(problems, spec, file);
            for entry in pending {
                if let Err(err) = spec.attach_references(entry.element, entry.property, &entry.references) {
                    problems.add(
                        Diagnostic::error(&path, &Location::file_start(&path), err.to_string())
                            .with_code(codes::SETUP),
                    );
                }
            }
        }

        problems.error_count() == errors_before
    }
}

/// Resolve every property value of one document.
fn resolve_document(
    problems: &mut ProblemCollector,
    spec: &AugmentedSpec,
    file: FileId,
) -> (PathBuf, Vec<PendingReferences>) {
    let Some(doc) = spec.document(file) else {
        return (PathBuf::new(), Vec::new());
    };
    let resolver = ValueResolver::new(spec, file);
    let mut pending = Vec::new();

    for (local, element) in doc.all_ui_elements().enumerate() {
        let id = DefId::new(file, NodeKind::UiElement, LocalDefId::from(local));
        for (index, property) in element.properties.iter().enumerate() {
            let resolution = resolver.resolve(&property.value.entity);
            for missing in &resolution.unresolved {
                problems.undefined_reference(&doc.file_path, &property.location, missing.what, &missing.name);
            }
            if !resolution.references.is_empty() {
                pending.push(PendingReferences {
                    element: id,
                    property: index,
                    references: resolution.references,
                });
            }
        }
    }

    (doc.file_path.clone(), pending)
}
