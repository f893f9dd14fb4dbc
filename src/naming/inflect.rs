//! English noun inflection for identifier suggestions.
//!
//! A small rule table rather than a dictionary: irregular and uncountable
//! nouns common in code, then suffix rules. Only the last word of an
//! identifier is inflected, and its original casing style is kept.

use super::case::last_word_start;

const UNCOUNTABLE: &[&str] = &[
    "advice",
    "data",
    "equipment",
    "feedback",
    "fish",
    "furniture",
    "hardware",
    "information",
    "luggage",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "software",
    "species",
    "staff",
];

/// (singular, plural) pairs the suffix rules get wrong.
const IRREGULAR: &[(&str, &str)] = &[
    ("alias", "aliases"),
    ("analysis", "analyses"),
    ("axis", "axes"),
    ("bus", "buses"),
    ("cactus", "cacti"),
    ("child", "children"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("echo", "echoes"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("hero", "heroes"),
    ("index", "indices"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("man", "men"),
    ("matrix", "matrices"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("phenomenon", "phenomena"),
    ("potato", "potatoes"),
    ("self", "selves"),
    ("shelf", "shelves"),
    ("status", "statuses"),
    ("thesis", "theses"),
    ("thief", "thieves"),
    ("tomato", "tomatoes"),
    ("tooth", "teeth"),
    ("vertex", "vertices"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// Pluralizes the last word of an identifier (`orderItem` -> `orderItems`).
pub fn pluralize(identifier: &str) -> String {
    inflect_last_word(identifier, plural_of)
}

/// Singularizes the last word of an identifier (`orderItems` -> `orderItem`).
pub fn singularize(identifier: &str) -> String {
    inflect_last_word(identifier, singular_of)
}

/// Returns true if the identifier's last word is a plural noun.
///
/// Uncountable nouns count as plural.
pub fn is_plural(identifier: &str) -> bool {
    let start = last_word_start(identifier);
    let word = identifier[start..].to_lowercase();
    if word.is_empty() {
        return false;
    }
    if UNCOUNTABLE.contains(&word.as_str()) {
        return true;
    }
    let singular = singular_of(&word);
    singular != word && plural_of(&singular) == word
}

fn inflect_last_word(identifier: &str, inflect: fn(&str) -> String) -> String {
    let start = last_word_start(identifier);
    let (head, word) = identifier.split_at(start);
    if word.is_empty() {
        return identifier.to_string();
    }
    let inflected = inflect(&word.to_lowercase());
    format!("{head}{}", match_case(word, &inflected))
}

/// Applies the casing of `original` to a lowercase word.
fn match_case(original: &str, word: &str) -> String {
    let all_upper = original.chars().any(char::is_uppercase)
        && !original.chars().any(char::is_lowercase);
    if all_upper {
        return word.to_uppercase();
    }
    match original.chars().find(|c| c.is_alphabetic()) {
        Some(first) if first.is_uppercase() => {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => word.to_string(),
    }
}

fn plural_of(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }

    if word.ends_with('z') && word.chars().rev().nth(1).is_some_and(is_vowel) {
        return format!("{word}zes");
    }
    if ["s", "sh", "ch", "x", "z"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

fn singular_of(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return singular.to_string();
    }
    if IRREGULAR.iter().any(|(singular, _)| *singular == word) {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("zzes") {
        if ends_with_vowel(stem) {
            return format!("{stem}z");
        }
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "shes", "ches", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn ends_with_vowel(word: &str) -> bool {
    word.chars().last().is_some_and(is_vowel)
}
