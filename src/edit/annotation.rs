//! Annotations added to a declaration.

use super::{line_indent, line_start};
use crate::annotations::{annotations_of, is_annotated};
use crate::error::{RefactorError, Result};
use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use tree_sitter::Node;

const ANNOTATABLE_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
    "field_declaration",
    "constant_declaration",
    "method_declaration",
    "constructor_declaration",
];

/// Where among a declaration's annotations a new one goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPlacement {
    /// After any existing annotations, directly above the declaration itself.
    #[default]
    AboveDeclaration,
    BeforeFirstAnnotation,
}

impl AnnotationPlacement {
    pub const ALL: [AnnotationPlacement; 2] = [
        AnnotationPlacement::AboveDeclaration,
        AnnotationPlacement::BeforeFirstAnnotation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnnotationPlacement::AboveDeclaration => "above-declaration",
            AnnotationPlacement::BeforeFirstAnnotation => "before-first-annotation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|placement| placement.name() == name)
    }
}

impl fmt::Display for AnnotationPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A position at which an annotation can be added to one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInsertionPoint {
    pub offset: usize,
    pub placement: AnnotationPlacement,
    pub leading_separator: String,
    pub trailing_separator: String,
    pub revision: u64,
}

impl AnnotationInsertionPoint {
    pub fn render(&self, annotation: &str) -> String {
        format!(
            "{}{}{}",
            self.leading_separator,
            annotation.trim(),
            self.trailing_separator
        )
    }
}

/// Computes where a new annotation goes on `declaration`.
///
/// Returns `None` for nodes that are not type, field, method or constructor
/// declarations. Annotations go on their own line unless the declaration
/// shares its line with other code, in which case they are written inline.
pub fn compute_annotation_point(
    file: &SourceFile,
    declaration: Node<'_>,
    placement: AnnotationPlacement,
) -> Option<AnnotationInsertionPoint> {
    if !ANNOTATABLE_KINDS.contains(&declaration.kind()) {
        return None;
    }
    let text = file.text();
    let start = declaration.start_byte();
    let own_line = text[line_start(text, start)..start].trim().is_empty();
    let indent = line_indent(text, start);
    let existing = annotations_of(file, declaration);

    let point = match (placement, existing.last()) {
        (AnnotationPlacement::AboveDeclaration, Some(last)) => {
            let after_last = &text[last.annotation.end_byte()..];
            let on_own_line = after_last
                .split('\n')
                .next()
                .is_some_and(|rest| rest.trim().is_empty() && after_last.contains('\n'));
            AnnotationInsertionPoint {
                offset: last.annotation.end_byte(),
                placement,
                leading_separator: if on_own_line && own_line {
                    format!("\n{indent}")
                } else {
                    " ".to_string()
                },
                trailing_separator: String::new(),
                revision: file.revision(),
            }
        }
        _ => {
            let offset = existing.first().map_or(start, |first| first.annotation.start_byte());
            AnnotationInsertionPoint {
                offset,
                placement,
                leading_separator: String::new(),
                trailing_separator: if own_line {
                    format!("\n{indent}")
                } else {
                    " ".to_string()
                },
                revision: file.revision(),
            }
        }
    };
    Some(point)
}

/// Inserts annotation text at a point computed against this revision.
pub fn insert_annotation(
    file: &SourceFile,
    point: &AnnotationInsertionPoint,
    annotation: &str,
) -> Result<SourceFile> {
    if point.revision != file.revision() {
        return Err(RefactorError::StaleInsertionPoint {
            computed: point.revision,
            current: file.revision(),
        });
    }
    debug!(offset = point.offset, placement = %point.placement, "inserting annotation");
    file.insert(point.offset, &point.render(annotation))
}

/// Adds `annotation` (for example `@Table(name = "users")`) to `declaration`.
///
/// Returns `Ok(None)` when the declaration already carries an annotation of
/// the same name. Text that is not an annotation, or a node that cannot be
/// annotated, is an invalid argument.
pub fn add_annotation(
    file: &SourceFile,
    declaration: Node<'_>,
    annotation: &str,
    placement: AnnotationPlacement,
) -> Result<Option<SourceFile>> {
    let annotation = annotation.trim();
    let name = annotation_text_name(annotation)?;

    if is_annotated(file, declaration, name) {
        debug!(name, "annotation already present");
        return Ok(None);
    }
    let Some(point) = compute_annotation_point(file, declaration, placement) else {
        return Err(RefactorError::invalid_argument(format!(
            "cannot annotate a {}",
            declaration.kind()
        )));
    };
    insert_annotation(file, &point, annotation).map(Some)
}

/// The name an annotation is applied by: `@Table(name = "x")` gives `Table`.
fn annotation_text_name(annotation: &str) -> Result<&str> {
    let invalid = || {
        RefactorError::invalid_argument(format!(
            "invalid annotation {annotation:?}: expected @Name or @Name(arguments)"
        ))
    };
    let body = annotation.strip_prefix('@').ok_or_else(invalid)?;
    let name = body.split('(').next().unwrap_or_default().trim();
    let valid = !name.is_empty()
        && name
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$'));
    if !valid || (body.contains('(') && !body.ends_with(')')) {
        return Err(invalid());
    }
    Ok(name)
}
