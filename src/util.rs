//! Shared utility helpers.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("valid regex"));

/// Removes every whitespace character, including interior ones.
pub fn strip_whitespace(value: &str) -> String {
    WHITESPACE.replace_all(value, "").into_owned()
}

/// Keeps alphabetic characters only.
pub fn letters_only(value: &str) -> String {
    value.chars().filter(|c| c.is_alphabetic()).collect()
}

/// Keeps alphanumeric characters only.
pub fn alpha_numeric_only(value: &str) -> String {
    value.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Pascal cases `value`, treating each of `separators` as a word boundary.
///
/// With `preserve_inner` the casing inside each word is kept, so `orderItem`
/// becomes `OrderItem` rather than `Orderitem`.
pub fn pascal_case(value: &str, preserve_inner: bool, separators: &[char]) -> String {
    let mut result = String::with_capacity(value.len());
    for word in value.split(|c| separators.contains(&c)) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            if preserve_inner {
                result.extend(chars);
            } else {
                result.extend(chars.flat_map(|c| c.to_lowercase()));
            }
        }
    }
    result
}

/// Julian date for `instant`, as used in default schema and backup names.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 86_400_000.0 + 2_440_587.5
}
