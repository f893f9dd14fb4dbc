//! Parameter and local variable lookup.

use super::{find_all_declarations, parameters_of, Declaration, DeclarationKind};
use crate::source::SourceFile;
use tree_sitter::Node;

/// Finds a parameter of a method, constructor, lambda or catch clause by name.
pub fn find_parameter<'tree>(
    file: &'tree SourceFile,
    callable: Node<'tree>,
    name: &str,
) -> Option<Declaration<'tree>> {
    parameters_of(file, callable)
        .into_iter()
        .find(|decl| decl.name_text(file) == name)
}

/// Returns the local variables declared anywhere inside `scope`, in source order.
pub fn locals_in<'tree>(file: &'tree SourceFile, scope: Node<'tree>) -> Vec<Declaration<'tree>> {
    find_all_declarations(file, scope, DeclarationKind::LocalVariable)
}

/// Finds the first local variable named `name` inside `scope`.
pub fn find_local_variable<'tree>(
    file: &'tree SourceFile,
    scope: Node<'tree>,
    name: &str,
) -> Option<Declaration<'tree>> {
    locals_in(file, scope)
        .into_iter()
        .find(|decl| decl.name_text(file) == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{find_class_by_name, find_methods_by_name};

    #[test]
    fn test_find_parameter_and_local() {
        let source = "class A { int sum(int a, int b) { int total = a + b; return total; } }";
        let file = SourceFile::parse(source).unwrap();
        let class = find_class_by_name(&file, "A").unwrap();
        let method = find_methods_by_name(&file, class, "sum")[0];

        let b = find_parameter(&file, method.node, "b").unwrap();
        assert_eq!(b.type_text(&file), Some("int"));
        assert!(find_parameter(&file, method.node, "c").is_none());

        let total = find_local_variable(&file, method.node, "total").unwrap();
        assert_eq!(file.text_of(total.value.unwrap()), "a + b");
        assert_eq!(total.scope.kind(), "block");
    }
}
