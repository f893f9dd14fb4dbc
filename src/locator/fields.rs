//! Field lookup within a type.

use super::{find_all_declarations, type_body, Declaration, DeclarationKind};
use crate::query::PatternQuery;
use crate::source::SourceFile;
use tree_sitter::Node;

/// Returns the fields declared directly in a type, one per declarator.
///
/// `type_node` may be the type declaration or its body.
pub fn fields_of<'tree>(file: &'tree SourceFile, type_node: Node<'tree>) -> Vec<Declaration<'tree>> {
    let Some(body) = type_body(type_node) else {
        return Vec::new();
    };
    find_all_declarations(file, body, DeclarationKind::Field)
        .into_iter()
        .filter(|decl| decl.scope == body)
        .collect()
}

/// Finds the `field_declaration` that declares `name` directly in a type.
///
/// The whole declaration is returned, so for `private String name;` the
/// node text covers both the type and the name.
pub fn find_field_by_name<'tree>(
    file: &'tree SourceFile,
    name: &str,
    type_node: Node<'tree>,
) -> Option<Node<'tree>> {
    fields_of(file, type_node)
        .into_iter()
        .find(|decl| decl.name_text(file) == name)
        .map(|decl| decl.node)
}

/// Finds the field declarations whose declared type mentions `type_name`.
///
/// Matches the type as written, any simple type name inside it, or a
/// generic argument (`List<Order>` matches `Order`). A declaration with
/// several declarators is reported once.
pub fn find_fields_by_type<'tree>(
    file: &'tree SourceFile,
    type_name: &str,
    type_node: Node<'tree>,
) -> Vec<Node<'tree>> {
    if type_name.is_empty() {
        return Vec::new();
    }

    let mut nodes: Vec<Node<'tree>> = Vec::new();
    for decl in fields_of(file, type_node) {
        let Some(declared) = decl.type_node else {
            continue;
        };
        if nodes.contains(&decl.node) {
            continue;
        }

        let mentions = file.text_of(declared) == type_name
            || PatternQuery::new("(type_identifier) @type")
                .nodes_or_empty(file, declared, "type")
                .into_iter()
                .any(|t| file.text_of(t) == type_name);

        if mentions {
            nodes.push(decl.node);
        }
    }
    nodes
}
