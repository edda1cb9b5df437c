//! Duplicate declaration detection.

use std::hash::Hash;
use std::path::Path;

use indexmap::IndexMap;

use crate::hir::{Diagnostic, NamedEntity, codes};

/// Group `items` by `key`, keeping only keys shared by two or more items.
///
/// Groups are ordered by the first appearance of their key; items keep
/// their input order inside a group.
pub fn group_duplicates<'a, T, K, F>(items: &'a [T], key: F) -> IndexMap<K, Vec<&'a T>>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<&'a T>> = IndexMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups.retain(|_, group| group.len() > 1);
    groups
}

/// One error per name declared more than once (names compare
/// case-insensitively).
///
/// The message lists every declaration's location in declaration order,
/// and the error itself sits on the first declaration.
pub fn check_duplicate_named_entities<T: NamedEntity>(items: &[T], kind: &str) -> Vec<Diagnostic> {
    group_duplicates(items, |item| item.name().trim().to_lowercase())
        .into_values()
        .filter_map(|group| {
            let first = *group.first()?;
            let mut message = format!("Duplicated {kind} \"{}\" in: ", first.name());
            for item in &group {
                message.push_str("\n  ");
                message.push_str(&item.location().describe());
            }

            let fallback = first
                .location()
                .file_path
                .as_deref()
                .unwrap_or_else(|| Path::new(""));
            Some(
                Diagnostic::error(fallback, first.location(), message)
                    .with_code(codes::DUPLICATE_DEFINITION),
            )
        })
        .collect()
}
