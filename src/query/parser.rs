//! Extraction of `[name]` and `{variable}` tokens from free-form text.
//!
//! The patterns are compiled once and shared; every function here is pure
//! and safe to call from any thread.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// `{variable}`: anything between braces that is not itself a brace.
pub(crate) static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("variable pattern is valid"));

/// `[name]`: anything between brackets without brackets or `$`.
///
/// `[$1]`-style database parameter placeholders are therefore not names.
pub(crate) static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]$]+)\]").expect("name pattern is valid"));

/// Contents of every `{...}` in `text`, in order of appearance.
///
/// Surrounding whitespace is trimmed. Repeats are kept.
pub fn extract_variables(text: &str) -> Vec<String> {
    captured(&VARIABLE_PATTERN, text)
}

/// Contents of every `[...]` in `text` that does not contain `$`, in order
/// of appearance.
///
/// Surrounding whitespace is trimmed. Repeats are kept.
pub fn extract_names(text: &str) -> Vec<String> {
    captured(&NAME_PATTERN, text)
}

fn captured(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

/// A case-insensitive pattern matching `[name]`, whitespace allowed inside
/// the brackets.
pub fn name_regex(name: &str) -> Result<Regex, regex::Error> {
    token_regex(r"\[", name, r"\]")
}

/// A case-insensitive pattern matching `{variable}`, whitespace allowed
/// inside the braces.
pub fn variable_regex(variable: &str) -> Result<Regex, regex::Error> {
    token_regex(r"\{", variable, r"\}")
}

/// Like [`name_regex`], also taking the `.` that may follow the brackets.
pub(crate) fn qualifier_regex(name: &str) -> Result<Regex, regex::Error> {
    token_regex(r"\[", name, r"\]\.?")
}

fn token_regex(open: &str, token: &str, close: &str) -> Result<Regex, regex::Error> {
    let pattern = format!(r"{open}\s*{}\s*{close}", regex::escape(token.trim()));
    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_variables() {
        assert_eq!(extract_variables("a {x} b {y}"), vec!["x", "y"]);
        assert_eq!(extract_variables("{Feature1:zoo} and { foo }"), vec!["Feature1:zoo", "foo"]);
        assert!(extract_variables("no variables").is_empty());
    }

    #[test]
    fn test_extract_variables_keeps_repeats() {
        assert_eq!(extract_variables("{x} {x}"), vec!["x", "x"]);
    }

    #[test]
    fn test_extract_names_skips_placeholders() {
        assert_eq!(extract_names("[a] and [b$c]"), vec!["a"]);
        assert_eq!(extract_names("SELECT * FROM [mydb].[ipsum]"), vec!["mydb", "ipsum"]);
    }

    #[test]
    fn test_nested_brackets_take_innermost() {
        assert_eq!(extract_names("[[a]]"), vec!["a"]);
        assert_eq!(extract_variables("{{a}}"), vec!["a"]);
    }

    #[test]
    fn test_empty_tokens_are_ignored() {
        assert!(extract_names("[ ]").is_empty());
        assert!(extract_variables("{}").is_empty());
    }

    #[test]
    fn test_name_regex_is_case_insensitive() {
        let re = name_regex("MyDb").unwrap();
        assert!(re.is_match("FROM [mydb]"));
        assert!(re.is_match("FROM [ MYDB ]"));
        assert!(!re.is_match("FROM mydb"));
    }

    #[test]
    fn test_variable_regex_escapes_metacharacters() {
        let re = variable_regex("a.b").unwrap();
        assert!(re.is_match("{a.b}"));
        assert!(!re.is_match("{axb}"));
    }

    #[test]
    fn test_qualifier_regex_takes_the_dot() {
        let re = qualifier_regex("mydb").unwrap();
        assert_eq!(re.replace("FROM [MyDB].[t]", ""), "FROM [t]");
        assert_eq!(re.replace("USE [ mydb ]", ""), "USE ");
    }
}
