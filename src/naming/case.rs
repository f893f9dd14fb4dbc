//! Identifier case detection and conversion.

use regex::Regex;
use std::sync::LazyLock;

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));
static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-.\s]+").expect("valid regex"));
static PASCAL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z0-9]*([A-Z][a-z0-9]*)*$").expect("valid regex"));
static CAMEL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*([A-Z][a-z0-9]*)*$").expect("valid regex"));
static SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)+$").expect("valid regex"));
static SCREAMING_SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$").expect("valid regex"));
static KEBAB_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)+$").expect("valid regex"));

/// Identifier casing styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFormat {
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
    Kebab,
    Unknown,
}

impl CaseFormat {
    /// Detects the style of an identifier.
    ///
    /// A single lowercase word reads as camel case and a single capitalized
    /// word as Pascal case.
    pub fn detect(identifier: &str) -> Self {
        if CAMEL_CASE.is_match(identifier) {
            CaseFormat::Camel
        } else if PASCAL_CASE.is_match(identifier) {
            CaseFormat::Pascal
        } else if SNAKE_CASE.is_match(identifier) {
            CaseFormat::Snake
        } else if SCREAMING_SNAKE_CASE.is_match(identifier) {
            CaseFormat::ScreamingSnake
        } else if KEBAB_CASE.is_match(identifier) {
            CaseFormat::Kebab
        } else {
            CaseFormat::Unknown
        }
    }
}

/// Splits an identifier into words on case changes and `_`, `-`, `.` delimiters.
pub fn split_words(identifier: &str) -> Vec<String> {
    let spaced = CAMEL_BOUNDARY.replace_all(identifier, "$1 $2");
    DELIMITERS
        .split(&spaced)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercases the first character (`OrderItem` -> `orderItem`).
pub fn pascal_to_camel(identifier: &str) -> String {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercases the first character (`orderItem` -> `OrderItem`).
pub fn camel_to_pascal(identifier: &str) -> String {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Byte offset where the last word of an identifier starts.
pub(crate) fn last_word_start(identifier: &str) -> usize {
    let mut start = 0;
    let mut previous: Option<char> = None;
    for (index, c) in identifier.char_indices() {
        if matches!(c, '_' | '-' | '.') {
            start = index + c.len_utf8();
        } else if c.is_uppercase()
            && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            start = index;
        }
        previous = Some(c);
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(CaseFormat::detect("orderItem"), CaseFormat::Camel);
        assert_eq!(CaseFormat::detect("order"), CaseFormat::Camel);
        assert_eq!(CaseFormat::detect("OrderItem"), CaseFormat::Pascal);
        assert_eq!(CaseFormat::detect("order_item"), CaseFormat::Snake);
        assert_eq!(CaseFormat::detect("MAX_SIZE"), CaseFormat::ScreamingSnake);
        assert_eq!(CaseFormat::detect("order-item"), CaseFormat::Kebab);
        assert_eq!(CaseFormat::detect("_weird__"), CaseFormat::Unknown);
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("orderItemId"), vec!["order", "Item", "Id"]);
        assert_eq!(split_words("MAX_SIZE"), vec!["MAX", "SIZE"]);
        assert_eq!(split_words("kebab-case.name"), vec!["kebab", "case", "name"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_first_letter_conversion() {
        assert_eq!(pascal_to_camel("OrderItem"), "orderItem");
        assert_eq!(camel_to_pascal("orderItem"), "OrderItem");
        assert_eq!(pascal_to_camel(""), "");
    }

    #[test]
    fn test_last_word_start() {
        assert_eq!(last_word_start("orderItem"), 5);
        assert_eq!(last_word_start("order_item"), 6);
        assert_eq!(last_word_start("URL"), 0);
        assert_eq!(last_word_start("item"), 0);
    }
}
