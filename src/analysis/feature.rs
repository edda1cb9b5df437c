//! Feature checks: duplicate names and state availability.

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};

use super::Analyzer;
use super::duplication::check_duplicate_named_entities;
use crate::base::FileId;
use crate::graph::ImportGraph;
use crate::hir::{AugmentedSpec, NodeKind, ProblemCollector, StateRef, name_key};

/// Checks feature and global UI element names, and that every state a
/// variant requires is produced somewhere it can see.
///
/// A state is visible to a variant when a postcondition produces it
/// earlier in the same document, or anywhere in a document imported
/// directly. Documents are visited dependencies first.
#[derive(Clone, Copy, Debug, Default)]
pub struct FeatureAnalyzer;

#[async_trait]
impl Analyzer for FeatureAnalyzer {
    fn name(&self) -> &'static str {
        "feature"
    }

    async fn analyze(
        &self,
        problems: &mut ProblemCollector,
        spec: &mut AugmentedSpec,
        graph: &ImportGraph,
    ) -> bool {
        let errors_before = problems.error_count();

        problems.extend(check_duplicate_named_entities(
            &spec.declared_features(),
            NodeKind::Feature.display(),
        ));
        problems.extend(check_duplicate_named_entities(
            &spec.declared_global_ui_elements(),
            NodeKind::UiElement.display(),
        ));

        check_states(problems, spec, graph);

        problems.error_count() == errors_before
    }
}

fn state_key(state: &StateRef) -> String {
    name_key(&state.name)
}

fn check_states(problems: &mut ProblemCollector, spec: &AugmentedSpec, graph: &ImportGraph) {
    let mut produced: FxHashMap<FileId, FxHashSet<String>> = FxHashMap::default();

    for (_, file) in graph.vertices_topologically() {
        let Some(file) = file else {
            continue;
        };
        let Some(doc) = spec.document(file) else {
            continue;
        };
        let imports = spec.imported_documents_of(file);
        let mut own: FxHashSet<String> = FxHashSet::default();

        let Some(feature) = &doc.feature else {
            produced.insert(file, own);
            continue;
        };

        for variant in feature.variants() {
            let visible = |state: &StateRef| {
                let key = state_key(state);
                own.contains(&key)
                    || imports
                        .iter()
                        .any(|imported| produced.get(imported).is_some_and(|states| states.contains(&key)))
            };

            let missing_preconditions: Vec<&StateRef> =
                variant.preconditions.iter().filter(|s| !visible(*s)).collect();
            let missing_calls: Vec<&StateRef> =
                variant.state_calls.iter().filter(|s| !visible(*s)).collect();

            for state in missing_preconditions {
                problems.missing_state(&doc.file_path, &state.location, "Precondition", &state.name);
            }
            for state in missing_calls {
                problems.missing_state(&doc.file_path, &state.location, "State", &state.name);
            }

            own.extend(variant.postconditions.iter().map(state_key));
        }

        tracing::trace!("{} produces {} states", doc.file_path.display(), own.len());
        produced.insert(file, own);
    }
}
