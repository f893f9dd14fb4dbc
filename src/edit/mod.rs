//! Insertion points for new members of a type body, and annotations
//! added to declarations.
//!
//! An [`InsertionPoint`] is a byte offset plus the separators and indent
//! that make inserted text sit naturally next to its neighbours. It is only
//! valid against the revision it was computed from: after any insertion the
//! caller must compute a fresh point, and [`insert_member`] refuses a stale
//! one.
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("class C {\n    int a;\n}\n")?;
//! let class = locator::find_class_by_name(&file, "C").unwrap();
//! let point = edit::compute_insertion_point(&file, class, AnchorKind::AfterLastField).unwrap();
//! let file = edit::insert_member(&file, &point, "int b;")?;
//! assert_eq!(file.text(), "class C {\n    int a;\n    int b;\n}\n");
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

mod annotation;
mod field;

pub use annotation::{
    add_annotation, compute_annotation_point, insert_annotation, AnnotationInsertionPoint,
    AnnotationPlacement,
};
pub use field::{add_field, add_field_with, FieldSpec, Visibility};

use crate::error::{RefactorError, Result};
use crate::locator::{member_container, members, type_body};
use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use tree_sitter::Node;

/// Indent used for members of a body that has none to copy from.
pub const DEFAULT_INDENT: &str = "    ";

const FIELD_KINDS: &[&str] = &["field_declaration", "constant_declaration"];
const METHOD_KINDS: &[&str] = &["method_declaration", "constructor_declaration"];

/// Where in a type body a new member goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorKind {
    /// Right after the opening brace, before any existing member.
    BeginningOfBody,
    BeforeFirstField,
    AfterLastField,
    BeforeFirstMember,
    AfterLastMember,
    BeforeFirstMethod,
    AfterLastMethod,
}

impl AnchorKind {
    pub const ALL: [AnchorKind; 7] = [
        AnchorKind::BeginningOfBody,
        AnchorKind::BeforeFirstField,
        AnchorKind::AfterLastField,
        AnchorKind::BeforeFirstMember,
        AnchorKind::AfterLastMember,
        AnchorKind::BeforeFirstMethod,
        AnchorKind::AfterLastMethod,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnchorKind::BeginningOfBody => "beginning-of-body",
            AnchorKind::BeforeFirstField => "before-first-field",
            AnchorKind::AfterLastField => "after-last-field",
            AnchorKind::BeforeFirstMember => "before-first-member",
            AnchorKind::AfterLastMember => "after-last-member",
            AnchorKind::BeforeFirstMethod => "before-first-method",
            AnchorKind::AfterLastMethod => "after-last-method",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|anchor| anchor.name() == name)
    }

    fn is_after(&self) -> bool {
        matches!(
            self,
            AnchorKind::AfterLastField | AnchorKind::AfterLastMember | AnchorKind::AfterLastMethod
        )
    }

    /// Member node kinds this anchor positions against; `None` for any member.
    fn member_kinds(&self) -> Option<&'static [&'static str]> {
        match self {
            AnchorKind::BeforeFirstField | AnchorKind::AfterLastField => Some(FIELD_KINDS),
            AnchorKind::BeforeFirstMethod | AnchorKind::AfterLastMethod => Some(METHOD_KINDS),
            _ => None,
        }
    }
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A position in a type body at which a member can be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPoint {
    /// Byte offset in the text of [`revision`](Self::revision).
    pub offset: usize,
    /// The anchor actually used; differs from the requested one after a fallback.
    pub anchor: AnchorKind,
    pub leading_separator: String,
    pub trailing_separator: String,
    /// Indent for every line of the inserted member.
    pub indent: String,
    /// Revision of the file the point was computed against.
    pub revision: u64,
}

impl InsertionPoint {
    /// The text to insert for `member`: separators around it and the indent
    /// applied to its continuation lines.
    pub fn render(&self, member: &str) -> String {
        let mut rendered = String::with_capacity(member.len() + 16);
        rendered.push_str(&self.leading_separator);
        for (index, line) in member.trim_end().lines().enumerate() {
            if index > 0 {
                rendered.push('\n');
                if !line.trim().is_empty() {
                    rendered.push_str(&self.indent);
                }
            }
            rendered.push_str(line);
        }
        rendered.push_str(&self.trailing_separator);
        rendered
    }
}

/// Computes where a new member goes in a type body.
///
/// `body` may be the type declaration or its body. Field and method anchors
/// fall back to [`AnchorKind::BeginningOfBody`] when the type has no member
/// of that kind. Returns `None` for a node that is not a type, for an enum
/// without a `;` after its constants, and for a body whose braces are
/// missing from the source.
pub fn compute_insertion_point(
    file: &SourceFile,
    body: Node<'_>,
    anchor: AnchorKind,
) -> Option<InsertionPoint> {
    compute_insertion_point_with(file, body, anchor, DEFAULT_INDENT)
}

/// [`compute_insertion_point`] with an explicit indent unit for bodies that
/// have no member to copy indentation from.
pub fn compute_insertion_point_with(
    file: &SourceFile,
    body: Node<'_>,
    anchor: AnchorKind,
    indent_unit: &str,
) -> Option<InsertionPoint> {
    let body = type_body(body)?;
    let container = member_container(file, body)?;
    let all_members = members(file, body);

    let candidates: Vec<Node<'_>> = match anchor.member_kinds() {
        Some(kinds) => all_members
            .iter()
            .copied()
            .filter(|member| kinds.contains(&member.kind()))
            .collect(),
        None => all_members.clone(),
    };

    let target = if anchor.is_after() {
        candidates.last()
    } else {
        candidates.first()
    };

    let point = match (anchor, target) {
        (AnchorKind::BeginningOfBody, _) | (_, None) => {
            beginning_of_body(file, body, container, &all_members, indent_unit)?
        }
        (_, Some(member)) => {
            let indent = member_indent(file, *member, indent_unit);
            if anchor.is_after() {
                InsertionPoint {
                    offset: member.end_byte(),
                    anchor,
                    leading_separator: format!("\n{indent}"),
                    trailing_separator: String::new(),
                    indent,
                    revision: file.revision(),
                }
            } else {
                InsertionPoint {
                    offset: member.start_byte(),
                    anchor,
                    leading_separator: String::new(),
                    trailing_separator: format!("\n{indent}"),
                    indent,
                    revision: file.revision(),
                }
            }
        }
    };

    if point.anchor != anchor {
        debug!(requested = %anchor, "no matching member, inserting at beginning of body");
    }
    Some(point)
}

/// Inserts rendered member text at a point computed against this revision.
pub fn insert_member(file: &SourceFile, point: &InsertionPoint, member: &str) -> Result<SourceFile> {
    if point.revision != file.revision() {
        return Err(RefactorError::StaleInsertionPoint {
            computed: point.revision,
            current: file.revision(),
        });
    }
    debug!(offset = point.offset, anchor = %point.anchor, "inserting member");
    file.insert(point.offset, &point.render(member))
}

fn beginning_of_body(
    file: &SourceFile,
    body: Node<'_>,
    container: Node<'_>,
    all_members: &[Node<'_>],
    indent_unit: &str,
) -> Option<InsertionPoint> {
    let text = file.text();
    // Both `{` and the `;` opening enum body declarations are one byte.
    if !matches!(text.as_bytes().get(container.start_byte()), Some(b'{' | b';')) {
        return None;
    }
    let open = container.start_byte() + 1;
    let indent = match all_members.first() {
        Some(first) => member_indent(file, *first, indent_unit),
        None => format!("{}{indent_unit}", line_indent(text, body.start_byte())),
    };

    let empty_braces = all_members.is_empty() && container.kind() != "enum_body_declarations";
    if !empty_braces {
        return Some(InsertionPoint {
            offset: open,
            anchor: AnchorKind::BeginningOfBody,
            leading_separator: format!("\n{indent}"),
            trailing_separator: String::new(),
            indent,
            revision: file.revision(),
        });
    }

    // An unterminated body ends in a zero-width recovered brace.
    let close = container.end_byte().checked_sub(1)?;
    if close < open || text.as_bytes().get(close) != Some(&b'}') {
        return None;
    }
    let between = &text[open..close];
    let point = match between.rfind('\n') {
        // The closing brace already sits on its own line.
        Some(newline) if between[newline + 1..].trim().is_empty() => InsertionPoint {
            offset: open + newline + 1,
            anchor: AnchorKind::BeginningOfBody,
            leading_separator: indent.clone(),
            trailing_separator: "\n".to_string(),
            indent,
            revision: file.revision(),
        },
        _ => InsertionPoint {
            offset: close,
            anchor: AnchorKind::BeginningOfBody,
            leading_separator: format!("\n{indent}"),
            trailing_separator: format!("\n{}", line_indent(text, close)),
            indent,
            revision: file.revision(),
        },
    };
    Some(point)
}

/// Indent of a member: its line's leading whitespace when it starts the
/// line, else one unit deeper than that line.
fn member_indent(file: &SourceFile, member: Node<'_>, indent_unit: &str) -> String {
    let text = file.text();
    let line_start = line_start(text, member.start_byte());
    let before = &text[line_start..member.start_byte()];
    if before.trim().is_empty() {
        before.to_string()
    } else {
        format!("{}{indent_unit}", line_indent(text, member.start_byte()))
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |newline| newline + 1)
}

/// Leading whitespace of the line holding `offset`.
fn line_indent(text: &str, offset: usize) -> &str {
    let start = line_start(text, offset);
    let line = &text[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::find_class_by_name;

    const ABC: &str = "public class C {\n    private int a;\n    private int b;\n    private int c;\n\n    void run() {}\n}\n";

    fn point(file: &SourceFile, anchor: AnchorKind) -> InsertionPoint {
        let class = find_class_by_name(file, "C").unwrap();
        compute_insertion_point(file, class, anchor).unwrap()
    }

    fn field_order(file: &SourceFile) -> Vec<String> {
        let class = find_class_by_name(file, "C").unwrap();
        crate::locator::fields_of(file, class)
            .iter()
            .map(|decl| decl.name_text(file).to_string())
            .collect()
    }

    #[test]
    fn test_before_first_then_after_last_field() {
        let file = SourceFile::parse(ABC).unwrap();
        let first = point(&file, AnchorKind::BeforeFirstField);
        let file = insert_member(&file, &first, "private int d;").unwrap();
        assert_eq!(field_order(&file), ["d", "a", "b", "c"]);

        let last = point(&file, AnchorKind::AfterLastField);
        let file = insert_member(&file, &last, "private int e;").unwrap();
        assert_eq!(field_order(&file), ["d", "a", "b", "c", "e"]);
        assert_eq!(
            file.text(),
            "public class C {\n    private int d;\n    private int a;\n    private int b;\n    private int c;\n    private int e;\n\n    void run() {}\n}\n"
        );
    }

    #[test]
    fn test_stale_point_is_rejected() {
        let file = SourceFile::parse(ABC).unwrap();
        let first = point(&file, AnchorKind::BeforeFirstField);
        let last = point(&file, AnchorKind::AfterLastField);
        let file = insert_member(&file, &first, "private int d;").unwrap();

        let err = insert_member(&file, &last, "private int e;").unwrap_err();
        assert!(matches!(
            err,
            RefactorError::StaleInsertionPoint { computed: 0, current: 1 }
        ));
    }

    #[test]
    fn test_methods_and_members() {
        let file = SourceFile::parse(ABC).unwrap();
        let after_method = point(&file, AnchorKind::AfterLastMethod);
        let file = insert_member(&file, &after_method, "void stop() {\n    halt();\n}").unwrap();
        assert!(file
            .text()
            .ends_with("    void run() {}\n    void stop() {\n        halt();\n    }\n}\n"));

        let before_member = point(&file, AnchorKind::BeforeFirstMember);
        assert_eq!(before_member.offset, file.text().find("private int a").unwrap());
    }

    #[test]
    fn test_fallback_to_beginning_of_body() {
        let file = SourceFile::parse("class C {\n    void run() {}\n}").unwrap();
        let point = point(&file, AnchorKind::AfterLastField);
        assert_eq!(point.anchor, AnchorKind::BeginningOfBody);

        let file = insert_member(&file, &point, "int count;").unwrap();
        assert_eq!(file.text(), "class C {\n    int count;\n    void run() {}\n}");
    }

    #[test]
    fn test_empty_bodies() {
        let inline = SourceFile::parse("class C {}").unwrap();
        let file = insert_member(&inline, &point(&inline, AnchorKind::BeforeFirstField), "int x;").unwrap();
        assert_eq!(file.text(), "class C {\n    int x;\n}");

        let multiline = SourceFile::parse("class C {\n}\n").unwrap();
        let file =
            insert_member(&multiline, &point(&multiline, AnchorKind::BeginningOfBody), "int x;").unwrap();
        assert_eq!(file.text(), "class C {\n    int x;\n}\n");
    }

    #[test]
    fn test_nested_type_indent() {
        let source = "class Outer {\n    static class C {\n    }\n}";
        let file = SourceFile::parse(source).unwrap();
        let point = point(&file, AnchorKind::BeginningOfBody);
        assert_eq!(point.indent, "        ");
    }

    #[test]
    fn test_enum_bodies() {
        let bare = SourceFile::parse("enum E { A, B }").unwrap();
        let body = crate::locator::find_type_by_name(&bare, "E").unwrap().node;
        assert!(compute_insertion_point(&bare, body, AnchorKind::BeginningOfBody).is_none());

        let with_members = SourceFile::parse("enum E {\n    A, B;\n\n    int code;\n}").unwrap();
        let body = crate::locator::find_type_by_name(&with_members, "E").unwrap().node;
        let point = compute_insertion_point(&with_members, body, AnchorKind::AfterLastField).unwrap();
        let file = insert_member(&with_members, &point, "int weight;").unwrap();
        assert_eq!(file.text(), "enum E {\n    A, B;\n\n    int code;\n    int weight;\n}");
    }

    #[test]
    fn test_unterminated_body_degrades() {
        let file = SourceFile::parse("class C { // café").unwrap();
        assert!(file.has_syntax_errors());
        let classes = crate::query::PatternQuery::new("(class_declaration) @class")
            .nodes_or_empty(&file, file.root(), "class");

        for class in classes {
            assert!(compute_insertion_point(&file, class, AnchorKind::BeginningOfBody).is_none());
            for anchor in AnchorKind::ALL {
                if let Some(point) = compute_insertion_point(&file, class, anchor) {
                    assert!(file.text().is_char_boundary(point.offset));
                }
            }
        }
    }

    #[test]
    fn test_unterminated_body_with_members() {
        let file = SourceFile::parse("class C {\n    int a;\n    // naïve").unwrap();
        let classes = crate::query::PatternQuery::new("(class_declaration) @class")
            .nodes_or_empty(&file, file.root(), "class");

        for class in classes {
            for anchor in AnchorKind::ALL {
                if let Some(point) = compute_insertion_point(&file, class, anchor) {
                    let updated = insert_member(&file, &point, "int b;").unwrap();
                    assert!(updated.text().contains("int b;"));
                }
            }
        }
    }

    #[test]
    fn test_not_a_type() {
        let file = SourceFile::parse("class C { void run() {} }").unwrap();
        let method = crate::locator::methods_of(&file, find_class_by_name(&file, "C").unwrap())[0];
        assert!(compute_insertion_point(&file, method.node, AnchorKind::BeginningOfBody).is_none());
    }

    #[test]
    fn test_anchor_names() {
        for anchor in AnchorKind::ALL {
            assert_eq!(AnchorKind::from_name(anchor.name()), Some(anchor));
        }
        assert_eq!(AnchorKind::from_name("middle"), None);
    }
}
