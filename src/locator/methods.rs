//! Methods, constructors, their parameters and invocations.

use super::{
    declarations_of, find_all_declarations, type_body, Declaration, DeclarationKind,
    InvocationCapture,
};
use crate::query::PatternQuery;
use crate::source::SourceFile;
use tree_sitter::Node;

const INVOCATION_PATTERN: &str = r#"
(method_invocation
  object: (_)? @object
  name: (identifier) @name
  arguments: (argument_list) @arguments) @invocation
"#;

/// Returns the methods and constructors declared directly in a type.
pub fn methods_of<'tree>(file: &'tree SourceFile, type_node: Node<'tree>) -> Vec<Declaration<'tree>> {
    let Some(body) = type_body(type_node) else {
        return Vec::new();
    };
    find_all_declarations(file, body, DeclarationKind::Method)
        .into_iter()
        .filter(|decl| decl.scope == body)
        .collect()
}

/// Finds the methods of a type named exactly `name`; overloads are all returned.
pub fn find_methods_by_name<'tree>(
    file: &'tree SourceFile,
    type_node: Node<'tree>,
    name: &str,
) -> Vec<Declaration<'tree>> {
    methods_of(file, type_node)
        .into_iter()
        .filter(|decl| decl.node.kind() == "method_declaration" && decl.name_text(file) == name)
        .collect()
}

/// Returns the constructors declared directly in a type.
pub fn find_constructors<'tree>(
    file: &'tree SourceFile,
    type_node: Node<'tree>,
) -> Vec<Declaration<'tree>> {
    methods_of(file, type_node)
        .into_iter()
        .filter(|decl| decl.node.kind() == "constructor_declaration")
        .collect()
}

/// Returns the parameters of a method, constructor, lambda or catch clause.
pub fn parameters_of<'tree>(
    file: &'tree SourceFile,
    callable: Node<'tree>,
) -> Vec<Declaration<'tree>> {
    match callable.kind() {
        "method_declaration" | "constructor_declaration" | "lambda_expression"
        | "catch_clause" => {
            let mut params: Vec<Declaration<'tree>> =
                find_all_declarations(file, callable, DeclarationKind::Parameter)
                    .into_iter()
                    .filter(|decl| decl.scope == callable)
                    .collect();
            if callable.kind() == "lambda_expression" {
                for inferred in declarations_of(file, callable) {
                    if !params.iter().any(|p| p.is_same(&inferred)) {
                        params.push(inferred);
                    }
                }
            }
            params.sort_by_key(|decl| decl.name.start_byte());
            params
        }
        _ => Vec::new(),
    }
}

/// Returns true for `public static void main(String[] args)`.
pub fn is_main_method(file: &SourceFile, method: &Declaration<'_>) -> bool {
    if method.kind != DeclarationKind::Method || method.name_text(file) != "main" {
        return false;
    }
    if !method.has_modifier(file, "public") || !method.has_modifier(file, "static") {
        return false;
    }
    if method.type_text(file) != Some("void") {
        return false;
    }

    let params = parameters_of(file, method.node);
    params.len() == 1
        && params[0]
            .type_text(file)
            .is_some_and(|t| t.replace(' ', "") == "String[]")
}

/// Decomposes a `method_invocation` node.
pub fn decompose_invocation<'tree>(
    file: &'tree SourceFile,
    node: Node<'tree>,
) -> Option<InvocationCapture<'tree>> {
    if node.kind() != "method_invocation" {
        return None;
    }
    PatternQuery::new(INVOCATION_PATTERN)
        .anchored()
        .run_or_empty(file, node)
        .into_iter()
        .filter_map(|m| {
            Some(InvocationCapture {
                invocation: m.get("invocation")?,
                object: m.get("object"),
                name: m.get("name")?,
                arguments: m.get("arguments"),
                type_arguments: node.child_by_field_name("type_arguments"),
            })
        })
        .filter(|capture| capture.invocation == node)
        .max_by_key(|capture| capture.object.is_some())
}

/// Finds every invocation of a method named `name` within `scope`.
pub fn invocations_named<'tree>(
    file: &'tree SourceFile,
    scope: Node<'tree>,
    name: &str,
) -> Vec<InvocationCapture<'tree>> {
    let mut found: Vec<InvocationCapture<'tree>> =
        PatternQuery::new("(method_invocation name: (identifier) @name) @invocation")
            .run_or_empty(file, scope)
            .into_iter()
            .filter(|m| m.get("name").is_some_and(|n| file.text_of(n) == name))
            .filter_map(|m| m.get("invocation"))
            .filter_map(|node| decompose_invocation(file, node))
            .collect();
    found.sort_by_key(|capture| capture.name.start_byte());
    found.dedup_by_key(|capture| capture.invocation.id());
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::find_class_by_name;

    const SOURCE: &str = r#"
public class App {
    public App() {}
    public App(int port) {}

    public static void main(String[] args) {
        new App().run(1);
        helper();
        this.helper();
    }

    void run(int times) {}
    void run(String name) {}
    static void helper() {}
}
"#;

    #[test]
    fn test_methods_and_constructors() {
        let file = SourceFile::parse(SOURCE).unwrap();
        let app = find_class_by_name(&file, "App").unwrap();

        assert_eq!(methods_of(&file, app).len(), 6);
        assert_eq!(find_constructors(&file, app).len(), 2);
        assert_eq!(find_methods_by_name(&file, app, "run").len(), 2);
        assert!(find_methods_by_name(&file, app, "Run").is_empty());
    }

    #[test]
    fn test_main_method() {
        let file = SourceFile::parse(SOURCE).unwrap();
        let app = find_class_by_name(&file, "App").unwrap();
        let main = &find_methods_by_name(&file, app, "main")[0];
        assert!(is_main_method(&file, main));

        let helper = &find_methods_by_name(&file, app, "helper")[0];
        assert!(!is_main_method(&file, helper));
    }

    #[test]
    fn test_parameters_of() {
        let file = SourceFile::parse(SOURCE).unwrap();
        let app = find_class_by_name(&file, "App").unwrap();
        let ctor = find_constructors(&file, app)[1];
        let params = parameters_of(&file, ctor.node);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name_text(&file), "port");

        assert!(parameters_of(&file, app).is_empty());
    }

    #[test]
    fn test_lambda_parameters() {
        let file = SourceFile::parse("class A { void m() { f((a, b) -> a); g((int c) -> c); } }").unwrap();
        let lambdas = PatternQuery::new("(lambda_expression) @l")
            .nodes(&file, file.root(), "l")
            .unwrap();
        assert_eq!(lambdas.len(), 2);

        let inferred: Vec<&str> = parameters_of(&file, lambdas[0])
            .iter()
            .map(|d| d.name_text(&file))
            .collect();
        assert_eq!(inferred, vec!["a", "b"]);

        let typed = parameters_of(&file, lambdas[1]);
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].type_text(&file), Some("int"));
    }

    #[test]
    fn test_invocations() {
        let file = SourceFile::parse(SOURCE).unwrap();
        let helper = invocations_named(&file, file.root(), "helper");
        assert_eq!(helper.len(), 2);
        assert!(helper[0].object.is_none());
        assert!(helper[1].is_this_call());

        let run = invocations_named(&file, file.root(), "run");
        assert_eq!(run.len(), 1);
        assert_eq!(file.text_of(run[0].object.unwrap()), "new App()");
        assert_eq!(file.text_of(run[0].arguments.unwrap()), "(1)");
        assert!(!run[0].is_chained());
    }

    #[test]
    fn test_chained_generic_invocation() {
        let file = SourceFile::parse("class A { void m() { a.b.<String>get(x); } }").unwrap();
        let get = invocations_named(&file, file.root(), "get");
        assert_eq!(get.len(), 1);
        assert!(get[0].is_chained());
        assert_eq!(file.text_of(get[0].type_arguments.unwrap()), "<String>");
        assert_eq!(file.text_of(get[0].object.unwrap()), "a.b");
    }
}
