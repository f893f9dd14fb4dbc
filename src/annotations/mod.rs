//! Annotation lookup and argument access.
//!
//! Both `@Override` (a marker annotation) and `@Table(name = "users")` are
//! captured as an [`AnnotationCapture`]. A single unkeyed argument, as in
//! `@SuppressWarnings("unused")`, is reported under the `value` key the way
//! Java reads it.
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("@Table(name = \"users\") class User {}")?;
//! let table = annotations::find_annotation(&file, file.root(), "Table").unwrap();
//! let value = annotations::argument_value(&file, &table, "name").unwrap();
//! assert_eq!(file.text_of(value), "\"users\"");
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

use crate::locator::{strip_whitespace, AnnotationArgument, AnnotationCapture};
use crate::query::PatternQuery;
use crate::source::SourceFile;
use std::collections::BTreeMap;
use tracing::trace;
use tree_sitter::Node;

/// The element an unkeyed annotation argument sets.
pub const DEFAULT_ELEMENT: &str = "value";

const ANNOTATION_PATTERN: &str = r#"
[
  (annotation name: (_) @name arguments: (annotation_argument_list) @arguments)
  (marker_annotation name: (_) @name)
] @annotation
"#;

/// Returns every annotation inside `scope`, including those on nested
/// members, in source order.
pub fn all_annotations<'tree>(
    file: &'tree SourceFile,
    scope: Node<'tree>,
) -> Vec<AnnotationCapture<'tree>> {
    let mut found: Vec<AnnotationCapture<'tree>> = PatternQuery::new(ANNOTATION_PATTERN)
        .run_or_empty(file, scope)
        .into_iter()
        .filter_map(|m| {
            Some(AnnotationCapture {
                annotation: m.get("annotation")?,
                name: m.get("name")?,
                arguments: m.get("arguments"),
            })
        })
        .collect();
    found.sort_by_key(|capture| capture.annotation.start_byte());
    found.dedup_by_key(|capture| capture.annotation.id());
    trace!(count = found.len(), "collected annotations");
    found
}

/// Returns the annotations applied directly to `declaration`, leaving out
/// those on its members and parameters.
pub fn annotations_of<'tree>(
    file: &'tree SourceFile,
    declaration: Node<'tree>,
) -> Vec<AnnotationCapture<'tree>> {
    let Some(modifiers) = modifiers_of(declaration) else {
        return Vec::new();
    };
    all_annotations(file, modifiers)
        .into_iter()
        .filter(|capture| capture.annotation.parent() == Some(modifiers))
        .collect()
}

/// Finds the first annotation in `scope` applied by `name`.
///
/// A simple name also matches the last segment of a qualified use, so
/// `Table` finds `@javax.persistence.Table`.
pub fn find_annotation<'tree>(
    file: &'tree SourceFile,
    scope: Node<'tree>,
    name: &str,
) -> Option<AnnotationCapture<'tree>> {
    all_annotations(file, scope)
        .into_iter()
        .find(|capture| name_matches(file, capture, name))
}

/// Returns true if `declaration` carries an annotation applied by `name`.
pub fn is_annotated(file: &SourceFile, declaration: Node<'_>, name: &str) -> bool {
    annotations_of(file, declaration)
        .iter()
        .any(|capture| name_matches(file, capture, name))
}

/// The annotation's name as written, without whitespace (`Table`, `javax.persistence.Table`).
pub fn annotation_name(file: &SourceFile, annotation: &AnnotationCapture<'_>) -> String {
    strip_whitespace(file.text_of(annotation.name))
}

/// The last segment of the annotation's name.
pub fn simple_name<'a>(file: &'a SourceFile, annotation: &AnnotationCapture<'_>) -> &'a str {
    let name = match annotation.name.kind() {
        "scoped_identifier" => annotation.name.child_by_field_name("name").unwrap_or(annotation.name),
        _ => annotation.name,
    };
    file.text_of(name)
}

/// Returns the arguments of an annotation in source order; empty for a marker.
pub fn arguments<'tree>(annotation: &AnnotationCapture<'tree>) -> Vec<AnnotationArgument<'tree>> {
    let Some(list) = annotation.arguments else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|child| !matches!(child.kind(), "line_comment" | "block_comment"))
        .filter_map(|child| {
            if child.kind() != "element_value_pair" {
                return Some(AnnotationArgument {
                    pair: None,
                    key: None,
                    value: child,
                });
            }
            Some(AnnotationArgument {
                pair: Some(child),
                key: child.child_by_field_name("key"),
                value: child.child_by_field_name("value")?,
            })
        })
        .collect()
}

/// Returns the arguments keyed by element name.
pub fn arguments_by_key<'tree>(
    file: &'tree SourceFile,
    annotation: &AnnotationCapture<'tree>,
) -> BTreeMap<&'tree str, AnnotationArgument<'tree>> {
    arguments(annotation)
        .into_iter()
        .map(|argument| (argument_key(file, &argument), argument))
        .collect()
}

/// Returns the value node of the argument setting element `key`.
pub fn argument_value<'tree>(
    file: &'tree SourceFile,
    annotation: &AnnotationCapture<'tree>,
    key: &str,
) -> Option<Node<'tree>> {
    if key.is_empty() {
        return None;
    }
    arguments(annotation)
        .into_iter()
        .find(|argument| argument_key(file, argument) == key)
        .map(|argument| argument.value)
}

/// The element an argument sets; [`DEFAULT_ELEMENT`] when it has no key.
pub fn argument_key<'tree>(file: &'tree SourceFile, argument: &AnnotationArgument<'tree>) -> &'tree str {
    argument.key.map_or(DEFAULT_ELEMENT, |key| file.text_of(key))
}

/// Returns the `modifiers` child holding a declaration's annotations.
pub fn modifiers_of(declaration: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = declaration.walk();
    let modifiers = declaration
        .children(&mut cursor)
        .find(|child| child.kind() == "modifiers");
    modifiers
}

fn name_matches(file: &SourceFile, capture: &AnnotationCapture<'_>, name: &str) -> bool {
    let name = name.trim().trim_start_matches('@');
    if name.is_empty() {
        return false;
    }
    if name.contains('.') {
        return annotation_name(file, capture) == name;
    }
    simple_name(file, capture) == name
}
