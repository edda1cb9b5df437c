//! Quoting of substituted values.
//!
//! In query mode, identifiers are backtick-quoted (inner backticks
//! doubled) and text literals are single-quoted with backslash escapes for
//! every character that could end the literal or confuse a client. In
//! sentence mode, both are double-quoted for display.

use crate::base::Value;

/// How substituted values are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReplaceMode {
    /// Text meant to be executed as a database query.
    #[default]
    Query,
    /// Text meant to be read by a person.
    Sentence,
}

/// Quote `name` as an identifier (database, table).
pub fn wrap_identifier(name: &str, mode: ReplaceMode) -> String {
    match mode {
        ReplaceMode::Query => format!("`{}`", name.replace('`', "``")),
        ReplaceMode::Sentence => double_quoted(name),
    }
}

/// Write `value` as a literal. Numbers and booleans are written bare.
pub fn wrap_value(value: &Value, mode: ReplaceMode) -> String {
    match value {
        Value::Null => match mode {
            ReplaceMode::Query => "NULL".to_string(),
            ReplaceMode::Sentence => "null".to_string(),
        },
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Float(f) => wrap_text(&f.to_string(), mode),
        Value::Text(text) => wrap_text(text, mode),
    }
}

fn wrap_text(text: &str, mode: ReplaceMode) -> String {
    match mode {
        ReplaceMode::Query => format!("'{}'", escape_literal(text)),
        ReplaceMode::Sentence => double_quoted(text),
    }
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escape the body of a single-quoted query literal.
///
/// The result never contains an unescaped `'`, so it cannot terminate the
/// surrounding literal.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_identifier_query() {
        assert_eq!(wrap_identifier("users", ReplaceMode::Query), "`users`");
        assert_eq!(wrap_identifier("we`ird", ReplaceMode::Query), "`we``ird`");
    }

    #[test]
    fn test_wrap_identifier_sentence() {
        assert_eq!(wrap_identifier("users", ReplaceMode::Sentence), "\"users\"");
    }

    #[test]
    fn test_wrap_value_numbers_are_bare() {
        assert_eq!(wrap_value(&Value::Integer(42), ReplaceMode::Query), "42");
        assert_eq!(wrap_value(&Value::Float(1.5), ReplaceMode::Query), "1.5");
        assert_eq!(wrap_value(&Value::Integer(-3), ReplaceMode::Sentence), "-3");
        assert_eq!(wrap_value(&Value::Boolean(true), ReplaceMode::Query), "true");
        assert_eq!(wrap_value(&Value::Null, ReplaceMode::Query), "NULL");
    }

    #[test]
    fn test_non_finite_float_is_quoted() {
        assert_eq!(wrap_value(&Value::Float(f64::NAN), ReplaceMode::Query), "'NaN'");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_value(&Value::from("Jane"), ReplaceMode::Query), "'Jane'");
        assert_eq!(wrap_value(&Value::from("Jane"), ReplaceMode::Sentence), "\"Jane\"");
        assert_eq!(
            wrap_value(&Value::from("say \"hi\""), ReplaceMode::Sentence),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_escape_literal_quotes() {
        assert_eq!(escape_literal("'''"), "\\'\\'\\'");
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("line\nbreak\0"), "line\\nbreak\\0");
    }
}
