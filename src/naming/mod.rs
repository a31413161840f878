//! Naming strategy: table, class and property names
//!
//! Converts arbitrary identifiers into names usable by generated code and
//! resolves collisions between them.
//!
//! ```ignore
//! assert_eq!(class_name("order_item"), "OrderItem");
//! assert_eq!(class_name("2fa codes"), "_2faCodes");
//! assert_eq!(pluralize("Category"), "Categories");
//! ```

mod collision;
mod formatter;

pub use collision::{NameCollisionResolver, NamingCollisionStrategy};
pub use formatter::{
    ColumnPropertyName, EchoNameFormatter, EchoTableNameProvider, NameFormatter, SchemaNameMap,
    SchemaNameMapFormatter, TableClassName, TableNameProvider,
};

use crate::util::{alpha_numeric_only, pascal_case};

const WORD_SEPARATORS: &[char] = &[' ', '_'];

/// Class name for a table name: Pascal cased, alphanumeric only, prefixed
/// with `_` when it would start with a digit.
pub fn class_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let pascal = alpha_numeric_only(&pascal_case(name, true, WORD_SEPARATORS));
    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", pascal)
    } else {
        pascal
    }
}

/// English plural of `word`, good enough for collection property names.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with('y')
        && !lower.ends_with("ay")
        && !lower.ends_with("ey")
        && !lower.ends_with("oy")
        && !lower.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}
