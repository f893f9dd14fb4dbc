//! Type declaration lookup: classes, interfaces, enums, records and annotation types.

use super::{find_all_declarations, find_declaration, Declaration, DeclarationKind};
use crate::query::PatternQuery;
use crate::source::{self, SourceFile};
use tree_sitter::Node;

/// Node kinds that declare a type.
pub const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Node kinds that hold a type's members.
pub const TYPE_BODY_KINDS: &[&str] = &[
    "class_body",
    "interface_body",
    "enum_body",
    "annotation_type_body",
];

const JAVA_LANG_CLASSES: &[&str] = &[
    "Object",
    "String",
    "Integer",
    "Long",
    "Double",
    "Float",
    "Boolean",
    "Character",
    "Byte",
    "Short",
];

/// Finds a class declaration by exact name, at any nesting depth.
pub fn find_class_by_name<'tree>(file: &'tree SourceFile, name: &str) -> Option<Node<'tree>> {
    find_declaration(file, file.root(), DeclarationKind::Class, name).map(|decl| decl.node)
}

/// Finds a record declaration by exact name.
pub fn find_record_by_name<'tree>(file: &'tree SourceFile, name: &str) -> Option<Declaration<'tree>> {
    find_declaration(file, file.root(), DeclarationKind::Record, name)
}

/// Finds an `@interface` declaration by exact name.
pub fn find_annotation_type_by_name<'tree>(
    file: &'tree SourceFile,
    name: &str,
) -> Option<Declaration<'tree>> {
    find_declaration(file, file.root(), DeclarationKind::Annotation, name)
}

/// Finds a type declaration of any kind by exact name; the earliest in source wins.
pub fn find_type_by_name<'tree>(file: &'tree SourceFile, name: &str) -> Option<Declaration<'tree>> {
    DeclarationKind::ALL
        .into_iter()
        .filter(|kind| kind.is_type())
    .filter_map(|kind| find_declaration(file, file.root(), kind, name))
    .min_by_key(|decl| decl.node.start_byte())
}

/// Returns the public top-level type of `kind`.
///
/// A type named after the file wins; otherwise the first top-level type of
/// that kind marked `public`.
pub fn public_type<'tree>(
    file: &'tree SourceFile,
    kind: DeclarationKind,
) -> Option<Declaration<'tree>> {
    if !kind.is_type() {
        return None;
    }

    let top_level: Vec<Declaration<'tree>> = find_all_declarations(file, file.root(), kind)
        .into_iter()
        .filter(|decl| decl.scope == file.root())
        .collect();

    let named = file
        .file_stem()
        .and_then(|stem| top_level.iter().find(|decl| decl.name_text(file) == stem));
    if let Some(named) = named {
        return Some(*named);
    }

    top_level
        .into_iter()
        .find(|decl| decl.has_modifier(file, "public"))
}

/// Returns the component parameters of a record declaration in order.
pub fn record_components<'tree>(record: Node<'tree>) -> Vec<Node<'tree>> {
    if record.kind() != "record_declaration" {
        return Vec::new();
    }
    let Some(params) = record.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|child| matches!(child.kind(), "formal_parameter" | "spread_parameter"))
        .collect()
}

/// Returns the member body of a type declaration, or the node itself if it already is one.
pub fn type_body(node: Node<'_>) -> Option<Node<'_>> {
    if TYPE_BODY_KINDS.contains(&node.kind()) {
        return Some(node);
    }
    if TYPE_DECLARATION_KINDS.contains(&node.kind()) {
        return node.child_by_field_name("body");
    }
    None
}

/// Returns the node whose children are the body's member declarations.
///
/// Enum members follow the constant list inside `enum_body_declarations`;
/// an enum without one has no member container.
pub fn member_container<'tree>(file: &'tree SourceFile, body: Node<'tree>) -> Option<Node<'tree>> {
    if body.kind() != "enum_body" {
        return Some(body);
    }
    PatternQuery::new("(enum_body (enum_body_declarations) @members)")
        .anchored()
        .nodes_or_empty(file, body, "members")
        .into_iter()
        .next()
}

/// Returns the member declarations of a type body in source order.
pub fn members<'tree>(file: &'tree SourceFile, body: Node<'tree>) -> Vec<Node<'tree>> {
    let Some(container) = member_container(file, body) else {
        return Vec::new();
    };
    let mut cursor = container.walk();
    container
        .named_children(&mut cursor)
        .filter(|child| !matches!(child.kind(), "line_comment" | "block_comment" | "enum_constant"))
        .collect()
}

/// Returns the nearest type declaration enclosing `node`.
pub fn enclosing_type(node: Node<'_>) -> Option<Node<'_>> {
    source::enclosing(node, TYPE_DECLARATION_KINDS)
}

/// Returns the name of the class a class declaration extends.
pub fn superclass_name<'tree>(file: &'tree SourceFile, class: Node<'tree>) -> Option<&'tree str> {
    PatternQuery::new("(class_declaration superclass: (superclass (_) @type))")
        .anchored()
        .nodes_or_empty(file, class, "type")
        .first()
        .map(|node| file.text_of(*node))
}

/// Returns true for the `java.lang` classes that never need an import.
pub fn is_java_lang_class(name: &str) -> bool {
    JAVA_LANG_CLASSES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_type_by_file_name() {
        let source = "class Helper {} public class Other {} class Account {}";
        let file = SourceFile::parse(source).unwrap().with_path("Account.java");
        let decl = public_type(&file, DeclarationKind::Class).unwrap();
        assert_eq!(decl.name_text(&file), "Account");
    }

    #[test]
    fn test_public_type_fallback() {
        let source = "class Helper {} public class Other {}";
        let file = SourceFile::parse(source).unwrap();
        let decl = public_type(&file, DeclarationKind::Class).unwrap();
        assert_eq!(decl.name_text(&file), "Other");

        let file = SourceFile::parse("class Helper {}").unwrap();
        assert!(public_type(&file, DeclarationKind::Class).is_none());
        assert!(public_type(&file, DeclarationKind::Field).is_none());
    }

    #[test]
    fn test_public_interface() {
        let file = SourceFile::parse("public interface Shape { double area(); }").unwrap();
        let decl = public_type(&file, DeclarationKind::Interface).unwrap();
        assert_eq!(decl.name_text(&file), "Shape");
        assert!(public_type(&file, DeclarationKind::Class).is_none());
    }

    #[test]
    fn test_find_class_nested() {
        let file = SourceFile::parse("class Outer { static class Inner {} }").unwrap();
        let inner = find_class_by_name(&file, "Inner").unwrap();
        assert_eq!(file.text_of(inner), "static class Inner {}");
        assert_eq!(enclosing_type(inner).map(|n| n.kind()), Some("class_declaration"));
        assert!(find_class_by_name(&file, "inner").is_none());
    }

    #[test]
    fn test_members_and_bodies() {
        let source = "enum Color { RED, GREEN; private int rgb; int rgb() { return rgb; } }";
        let file = SourceFile::parse(source).unwrap();
        let color = find_type_by_name(&file, "Color").unwrap();
        let body = type_body(color.node).unwrap();
        assert_eq!(body.kind(), "enum_body");

        let members = members(&file, body);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].kind(), "field_declaration");
        assert_eq!(members[1].kind(), "method_declaration");
    }

    #[test]
    fn test_superclass_name() {
        let file = SourceFile::parse("class Dog extends Animal {}").unwrap();
        let dog = find_class_by_name(&file, "Dog").unwrap();
        assert_eq!(superclass_name(&file, dog), Some("Animal"));
    }

    #[test]
    fn test_records() {
        let source = "public record Point(int x, int y) {\n    Point {\n        if (x < 0) throw new IllegalArgumentException();\n    }\n}\nclass Helper {}\n";
        let file = SourceFile::parse(source).unwrap().with_path("Point.java");
        let point = public_type(&file, DeclarationKind::Record).unwrap();
        assert_eq!(point.name_text(&file), "Point");
        assert_eq!(point.kind, DeclarationKind::Record);
        assert_eq!(find_type_by_name(&file, "Point").map(|d| d.kind), Some(DeclarationKind::Record));
        assert_eq!(find_record_by_name(&file, "Point").map(|d| d.node), Some(point.node));
        assert!(find_record_by_name(&file, "Helper").is_none());

        let components = record_components(point.node);
        let names: Vec<&str> = components
            .iter()
            .filter_map(|c| c.child_by_field_name("name"))
            .map(|n| file.text_of(n))
            .collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(type_body(point.node).map(|b| b.kind()), Some("class_body"));
    }

    #[test]
    fn test_annotation_types() {
        let source = "public @interface Audited {\n    String value() default \"\";\n    int level() default 1;\n}\n";
        let file = SourceFile::parse(source).unwrap();
        let audited = public_type(&file, DeclarationKind::Annotation).unwrap();
        assert_eq!(audited.name_text(&file), "Audited");
        assert_eq!(find_annotation_type_by_name(&file, "Audited").map(|d| d.node), Some(audited.node));
        assert_eq!(find_type_by_name(&file, "Audited").map(|d| d.kind), Some(DeclarationKind::Annotation));
        assert!(public_type(&file, DeclarationKind::Interface).is_none());

        let body = type_body(audited.node).unwrap();
        assert_eq!(body.kind(), "annotation_type_body");
        let elements = members(&file, body);
        assert_eq!(elements.len(), 2);
        assert!(elements.iter().all(|e| e.kind() == "annotation_type_element_declaration"));
        assert!(record_components(audited.node).is_empty());
    }

    #[test]
    fn test_java_lang() {
        assert!(is_java_lang_class("String"));
        assert!(!is_java_lang_class("List"));
    }
}
