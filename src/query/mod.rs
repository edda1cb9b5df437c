//! Embedded references inside query strings.
//!
//! Property values and scenario steps may embed two kinds of tokens:
//! - `[name]` - a constant, table or database
//! - `{variable}` - a UI element, `feature:element` or `element`
//!
//! [`extract_names`] and [`extract_variables`] find them;
//! [`ReferenceReplacer`] substitutes resolved values back in, quoting each
//! one so that no value can escape its literal.

mod escape;
mod parser;
mod replacer;

pub use escape::{ReplaceMode, escape_literal, wrap_identifier, wrap_value};
pub use parser::{extract_names, extract_variables, name_regex, variable_regex};
pub use replacer::{
    ReferenceReplacer, replace_constant_in_query, replace_database_in_query,
    replace_table_in_query, replace_ui_element_in_query,
};
