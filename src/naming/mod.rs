//! Naming conventions for suggested identifiers.
//!
//! Advisory only: class rename uses these to decide which variables were
//! named after the type (`Order order`, `List<Order> orders`). Nothing in
//! usage finding or rename mechanics depends on them.

mod case;
mod inflect;

pub use case::{camel_to_pascal, pascal_to_camel, split_words, CaseFormat};
pub use inflect::{is_plural, pluralize, singularize};

const COLLECTION_TYPES: &[&str] = &[
    "List",
    "Set",
    "ArrayList",
    "LinkedList",
    "HashSet",
    "LinkedHashSet",
    "TreeSet",
    "Collection",
];

/// Returns true if a declared type text is a generic collection (`List<Order>`).
pub fn is_collection_type(type_text: &str) -> bool {
    type_text
        .split_once('<')
        .is_some_and(|(base, _)| COLLECTION_TYPES.contains(&base.trim()))
}

/// The conventional variable name for a type: `orderItem`, or `orderItems` for a collection.
pub fn suggest_variable_name(type_name: &str, collection: bool) -> String {
    if collection {
        pascal_to_camel(&pluralize(type_name))
    } else {
        pascal_to_camel(type_name)
    }
}

/// Returns true if `variable` carries the conventional name for `type_name`.
pub fn should_rename_variable(variable: &str, type_name: &str, collection: bool) -> bool {
    !variable.is_empty() && variable == suggest_variable_name(type_name, collection)
}

/// The variable's name after its type is renamed from `old_type` to `new_type`.
///
/// Variables that do not follow the convention keep their name.
pub fn new_variable_name(variable: &str, old_type: &str, new_type: &str, collection: bool) -> String {
    if should_rename_variable(variable, old_type, collection) {
        suggest_variable_name(new_type, collection)
    } else {
        variable.to_string()
    }
}
