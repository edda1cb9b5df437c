//! Substitution of resolved values into query strings and sentences.
//!
//! Replacement runs in two phases: `{variable}` tokens first, then
//! `[name]` tokens. Text inserted by the first phase is never scanned by
//! the second, so a substituted value that happens to contain `[x]` stays
//! inside its literal.

use indexmap::IndexMap;
use regex::{Captures, NoExpand, Regex};

use super::escape::{ReplaceMode, wrap_identifier, wrap_value};
use super::parser::{NAME_PATTERN, VARIABLE_PATTERN, name_regex, qualifier_regex, variable_regex};
use crate::base::Value;

/// Rewrites text by substituting resolved references.
#[derive(Copy, Clone, Debug, Default)]
pub struct ReferenceReplacer {
    mode: ReplaceMode,
}

impl ReferenceReplacer {
    pub fn new(mode: ReplaceMode) -> Self {
        Self { mode }
    }

    /// A replacer producing query text.
    pub fn query() -> Self {
        Self::new(ReplaceMode::Query)
    }

    /// A replacer producing human-readable text.
    pub fn sentence() -> Self {
        Self::new(ReplaceMode::Sentence)
    }

    pub fn mode(&self) -> ReplaceMode {
        self.mode
    }

    /// Replace every known `{variable}` and `[name]` in `text`.
    ///
    /// - `fields`: variable → value, written as a literal;
    /// - `databases`, `tables`: name → actual name, written as an identifier;
    /// - `constants`: name → value, written as a literal.
    ///
    /// When a name appears in several maps, constants win over tables and
    /// tables over databases. Keys match case-insensitively. Unknown tokens
    /// are left as they are.
    pub fn replace(
        &self,
        text: &str,
        databases: &IndexMap<String, String>,
        tables: &IndexMap<String, String>,
        fields: &IndexMap<String, Value>,
        constants: &IndexMap<String, Value>,
    ) -> String {
        let variables: IndexMap<String, String> = fields
            .iter()
            .map(|(variable, value)| (token_key(variable), wrap_value(value, self.mode)))
            .collect();

        let mut names: IndexMap<String, String> = IndexMap::new();
        for (name, actual) in databases.iter().chain(tables) {
            names.insert(token_key(name), wrap_identifier(actual, self.mode));
        }
        for (name, value) in constants {
            names.insert(token_key(name), wrap_value(value, self.mode));
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in VARIABLE_PATTERN.captures_iter(text) {
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(replacement) = variables.get(&token_key(token.as_str())) else {
                continue;
            };
            out.push_str(&replace_names(&text[last..whole.start()], &names));
            out.push_str(replacement);
            last = whole.end();
        }
        out.push_str(&replace_names(&text[last..], &names));
        out
    }
}

fn token_key(token: &str) -> String {
    token.trim().to_lowercase()
}

fn replace_names(segment: &str, names: &IndexMap<String, String>) -> String {
    NAME_PATTERN
        .replace_all(segment, |caps: &Captures<'_>| match names.get(&token_key(&caps[1])) {
            Some(replacement) => replacement.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

// ============================================================================
// SINGLE SUBSTITUTIONS (query mode)
// ============================================================================

/// Replace `{variable}` with `value` written as a literal.
pub fn replace_ui_element_in_query(query: &str, variable: &str, value: &Value) -> String {
    substitute(query, variable_regex(variable), &wrap_value(value, ReplaceMode::Query))
}

/// Replace `[name]` with the constant's `value` written as a literal.
pub fn replace_constant_in_query(query: &str, name: &str, value: &Value) -> String {
    substitute(query, name_regex(name), &wrap_value(value, ReplaceMode::Query))
}

/// Replace `[name]` with the table name written as an identifier.
pub fn replace_table_in_query(query: &str, name: &str) -> String {
    substitute(query, name_regex(name), &wrap_identifier(name.trim(), ReplaceMode::Query))
}

/// Remove `[name]` and the `.` that may follow it.
///
/// The database is selected when the connection is opened, so the query
/// no longer needs to name it.
pub fn replace_database_in_query(query: &str, name: &str) -> String {
    substitute(query, qualifier_regex(name), "")
}

/// `replacement` is inserted verbatim; `$` in it is not a group reference.
fn substitute(query: &str, pattern: Result<Regex, regex::Error>, replacement: &str) -> String {
    match pattern {
        Ok(pattern) => pattern.replace_all(query, NoExpand(replacement)).into_owned(),
        Err(err) => {
            tracing::warn!("Could not build token pattern: {}", err);
            query.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn values(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_replace_field() {
        let out = ReferenceReplacer::query().replace(
            "SELECT * FROM t WHERE name = {fieldB}",
            &IndexMap::new(),
            &IndexMap::new(),
            &values(&[("fieldB", Value::from("Jane"))]),
            &IndexMap::new(),
        );
        assert_eq!(out, "SELECT * FROM t WHERE name = 'Jane'");
    }

    #[test]
    fn test_replace_all_kinds() {
        let out = ReferenceReplacer::query().replace(
            "SELECT * FROM [db].[users] WHERE age > [minAge] AND name = {Login:user}",
            &strings(&[("db", "prod")]),
            &strings(&[("users", "app_users")]),
            &values(&[("login:user", Value::from("bob"))]),
            &values(&[("MINAGE", Value::Integer(18))]),
        );
        assert_eq!(
            out,
            "SELECT * FROM `prod`.`app_users` WHERE age > 18 AND name = 'bob'"
        );
    }

    #[test]
    fn test_constant_wins_over_table() {
        let out = ReferenceReplacer::query().replace(
            "[x]",
            &IndexMap::new(),
            &strings(&[("x", "tbl")]),
            &IndexMap::new(),
            &values(&[("x", Value::from("const"))]),
        );
        assert_eq!(out, "'const'");
    }

    #[test]
    fn test_unknown_tokens_are_kept() {
        let out = ReferenceReplacer::query().replace(
            "{a} [b] [$1]",
            &IndexMap::new(),
            &IndexMap::new(),
            &IndexMap::new(),
            &IndexMap::new(),
        );
        assert_eq!(out, "{a} [b] [$1]");
    }

    #[test]
    fn test_substituted_value_is_not_rescanned() {
        let out = ReferenceReplacer::query().replace(
            "{v} [c]",
            &IndexMap::new(),
            &IndexMap::new(),
            &values(&[("v", Value::from("[c]"))]),
            &values(&[("c", Value::Integer(1))]),
        );
        assert_eq!(out, "'[c]' 1");
    }

    #[test]
    fn test_sentence_mode() {
        let out = ReferenceReplacer::sentence().replace(
            "I fill {name} with [greeting] in [users]",
            &IndexMap::new(),
            &strings(&[("users", "users")]),
            &values(&[("name", Value::from("Jane"))]),
            &values(&[("greeting", Value::from("hi"))]),
        );
        assert_eq!(out, "I fill \"Jane\" with \"hi\" in \"users\"");
    }

    #[test]
    fn test_replace_ui_element_in_query() {
        let out = replace_ui_element_in_query("a = {Foo:x} OR b = {y}", "foo:X", &Value::from("v"));
        assert_eq!(out, "a = 'v' OR b = {y}");
    }

    #[test]
    fn test_replace_constant_in_query() {
        let out = replace_constant_in_query("LIMIT [max]", "MAX", &Value::Integer(10));
        assert_eq!(out, "LIMIT 10");
    }

    #[test]
    fn test_dollar_in_value_is_not_a_group_reference() {
        let out = replace_constant_in_query("x = [price]", "price", &Value::from("$1 or $0"));
        assert_eq!(out, "x = '$1 or $0'");
    }

    #[test]
    fn test_single_substitution_allows_inner_whitespace() {
        let out = replace_ui_element_in_query("{ Foo:X }", "foo:x", &Value::Integer(3));
        assert_eq!(out, "3");
    }

    #[test]
    fn test_replace_table_in_query() {
        assert_eq!(replace_table_in_query("FROM [users]", "users"), "FROM `users`");
    }

    #[test]
    fn test_replace_database_in_query() {
        assert_eq!(
            replace_database_in_query("SELECT * FROM [mydb].[users]", "mydb"),
            "SELECT * FROM [users]"
        );
        assert_eq!(replace_database_in_query("USE [other]", "mydb"), "USE [other]");
    }
}
