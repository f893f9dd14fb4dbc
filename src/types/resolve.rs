//! Type resolution for type nodes, declarations, names and receivers.

use super::ResolvedType;
use crate::imports::{self, ImportEntry};
use crate::lang::Java;
use crate::locator::{self, strip_whitespace, Declaration};
use crate::query::PatternQuery;
use crate::scope::{ScopeChain, ScopeIndex};
use crate::source::SourceFile;
use tracing::trace;
use tree_sitter::Node;

const GENERIC_PATTERN: &str = r#"
(generic_type [(type_identifier) (scoped_type_identifier)] @base (type_arguments) @arguments)
"#;

const ARRAY_PATTERN: &str = r#"
(array_type element: (_) @element dimensions: (dimensions) @dimensions)
"#;

/// Builds a [`ResolvedType`] from a type node as written.
///
/// Wildcards and anything that is not a type node are kept as opaque,
/// unresolved text.
pub fn resolve_type_node(file: &SourceFile, node: Node<'_>) -> ResolvedType {
    let text = file.text_of(node);
    match node.kind() {
        kind if Java::is_primitive_kind(kind) => ResolvedType::primitive(text),
        "type_identifier" => ResolvedType::named(text),
        "scoped_type_identifier" => ResolvedType::named(strip_whitespace(text)),
        "generic_type" => {
            let Some(parts) = PatternQuery::new(GENERIC_PATTERN)
                .anchored()
                .run_or_empty(file, node)
                .into_iter()
                .next()
            else {
                return ResolvedType::unresolved(text);
            };
            let base = parts
                .get("base")
                .map(|b| strip_whitespace(file.text_of(b)))
                .unwrap_or_else(|| strip_whitespace(text));
            let arguments = parts
                .get("arguments")
                .map(|args| type_arguments(file, args))
                .unwrap_or_default();
            ResolvedType::named(base).with_arguments(arguments)
        }
        "array_type" => {
            let Some(parts) = PatternQuery::new(ARRAY_PATTERN)
                .anchored()
                .run_or_empty(file, node)
                .into_iter()
                .next()
            else {
                return ResolvedType::unresolved(text);
            };
            let rank = parts
                .get("dimensions")
                .map(|d| bracket_pairs(file.text_of(d)))
                .unwrap_or(1);
            match parts.get("element") {
                Some(element) => {
                    let element = resolve_type_node(file, element);
                    let total = element.array_rank + rank;
                    element.with_array_rank(total)
                }
                None => ResolvedType::unresolved(text),
            }
        }
        "catch_type" | "annotated_type" => {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node
                .named_children(&mut cursor)
                .filter(|c| !matches!(c.kind(), "annotation" | "marker_annotation"))
                .collect();
            match children.as_slice() {
                [single] => resolve_type_node(file, *single),
                _ => ResolvedType::unresolved(strip_whitespace(text)),
            }
        }
        _ => ResolvedType::unresolved(text),
    }
}

fn type_arguments(file: &SourceFile, arguments: Node<'_>) -> Vec<ResolvedType> {
    let mut nodes = PatternQuery::new("(type_arguments (_) @argument)")
        .anchored()
        .nodes_or_empty(file, arguments, "argument");
    nodes.sort_by_key(|n| n.start_byte());
    nodes
        .into_iter()
        .filter(|n| !matches!(n.kind(), "line_comment" | "block_comment"))
        .map(|n| resolve_type_node(file, n))
        .collect()
}

fn bracket_pairs(text: &str) -> usize {
    text.matches('[').count()
}

/// Returns the declared type of a declaration.
///
/// C-style array declarators (`int x[]`) and varargs add to the rank, and
/// `var` takes the type of a `new T(...)` initializer. Returns `None` when
/// nothing declares a type (constructors, classes, inferred lambda parameters).
pub fn resolve_declaration_type(file: &SourceFile, decl: &Declaration<'_>) -> Option<ResolvedType> {
    let type_node = decl.type_node?;
    let mut resolved = resolve_type_node(file, type_node);

    if resolved.base_name == "var" && resolved.array_rank == 0 {
        resolved = decl
            .value
            .filter(|value| value.kind() == "object_creation_expression")
            .and_then(|value| value.child_by_field_name("type"))
            .map(|created| resolve_type_node(file, created))
            .unwrap_or_else(|| ResolvedType::unresolved("var"));
    }

    let dimensions = decl
        .declarator
        .and_then(|d| d.child_by_field_name("dimensions"))
        .or_else(|| {
            matches!(decl.node.kind(), "formal_parameter" | "catch_formal_parameter")
                .then(|| decl.node.child_by_field_name("dimensions"))
                .flatten()
        });
    if let Some(dimensions) = dimensions {
        resolved.array_rank += bracket_pairs(file.text_of(dimensions));
    }
    if decl.node.kind() == "spread_parameter" {
        resolved.array_rank += 1;
    }

    Some(resolved)
}

/// Resolves the type of `name` as seen through `chain`.
///
/// Nearest local, then parameter, then field of the enclosing type; `this`
/// is the enclosing type itself. Anything else comes back unresolved with
/// the identifier as its base name.
pub fn resolve_object_type(
    file: &SourceFile,
    chain: &ScopeChain<'_>,
    name: &str,
    imports: &[ImportEntry<'_>],
) -> ResolvedType {
    if name == "this" {
        return match chain.enclosing_type_name(file) {
            Some(owner) => qualify(ResolvedType::named(owner), imports),
            None => ResolvedType::unresolved(name),
        };
    }

    let resolved = chain
        .resolve(file, name)
        .and_then(|decl| resolve_declaration_type(file, &decl))
        .map(|resolved| qualify(resolved, imports))
        .unwrap_or_else(|| ResolvedType::unresolved(name));

    trace!(name, resolved = %resolved, "resolved object type");
    resolved
}

/// Resolves the static type of a receiver expression such as `calc`,
/// `this.calc` or `new Calculator()`.
///
/// Builds a one-off [`TypeResolver`]; prefer the resolver when resolving
/// many sites in the same file.
pub fn resolve_receiver_type<'t>(file: &'t SourceFile, expr: Node<'t>) -> ResolvedType {
    TypeResolver::new(file).receiver_type(expr)
}

/// Attaches the package of an explicit import naming the type's simple name.
fn qualify(mut resolved: ResolvedType, imports: &[ImportEntry<'_>]) -> ResolvedType {
    if resolved.is_resolved() && !resolved.is_primitive() && resolved.package.is_none() {
        let simple = resolved.simple_name().to_string();
        resolved.package = imports
            .iter()
            .find(|entry| !entry.is_static && entry.class_name.as_deref() == Some(simple.as_str()))
            .map(|entry| entry.package.clone());
    }
    resolved.type_arguments = std::mem::take(&mut resolved.type_arguments)
        .into_iter()
        .map(|argument| qualify(argument, imports))
        .collect();
    resolved
}

/// Resolves names and receiver expressions across one file.
///
/// Holds the file's scope index and imports so that many sites can be
/// resolved against the same (tree, text) pair without re-querying.
pub struct TypeResolver<'tree> {
    file: &'tree SourceFile,
    index: ScopeIndex<'tree>,
    imports: Vec<ImportEntry<'tree>>,
}

impl<'tree> TypeResolver<'tree> {
    pub fn new(file: &'tree SourceFile) -> Self {
        Self {
            file,
            index: ScopeIndex::build(file),
            imports: imports::imports(file),
        }
    }

    pub fn index(&self) -> &ScopeIndex<'tree> {
        &self.index
    }

    /// Returns the scope chain visible from `node`.
    pub fn chain_at(&self, node: Node<'tree>) -> ScopeChain<'tree> {
        self.index.chain_at(node)
    }

    /// Resolves the type of `name` as seen from `node`.
    pub fn object_type_at(&self, node: Node<'tree>, name: &str) -> ResolvedType {
        resolve_object_type(self.file, &self.chain_at(node), name, &self.imports)
    }

    /// Resolves the declared type of a declaration.
    pub fn declaration_type(&self, decl: &Declaration<'_>) -> Option<ResolvedType> {
        resolve_declaration_type(self.file, decl).map(|resolved| qualify(resolved, &self.imports))
    }

    /// `super.name`, when the superclass is declared in the same file.
    fn inherited_field_type(&self, node: Node<'tree>, name: &str) -> Option<ResolvedType> {
        let file = self.file;
        let class = self.chain_at(node).enclosing_type()?;
        let parent = locator::superclass_name(file, class)?;
        let parent = locator::find_type_by_name(file, parent)?;
        let field = locator::fields_of(file, parent.node)
            .into_iter()
            .find(|decl| decl.name_text(file) == name)?;
        self.declaration_type(&field)
    }

    /// Resolves the static type of a receiver expression.
    pub fn receiver_type(&self, expr: Node<'tree>) -> ResolvedType {
        let file = self.file;
        let text = file.text_of(expr);

        match expr.kind() {
            "identifier" => self.object_type_at(expr, text),
            "this" => self.object_type_at(expr, "this"),
            "field_access" => {
                let object = expr.child_by_field_name("object");
                let field = expr.child_by_field_name("field");
                match (object, field) {
                    (Some(object), Some(field)) if object.kind() == "this" => self
                        .chain_at(expr)
                        .resolve_field(file, file.text_of(field))
                        .and_then(|decl| self.declaration_type(&decl))
                        .unwrap_or_else(|| ResolvedType::unresolved(strip_whitespace(text))),
                    (Some(object), Some(field)) if object.kind() == "super" => self
                        .inherited_field_type(expr, file.text_of(field))
                        .unwrap_or_else(|| ResolvedType::unresolved(strip_whitespace(text))),
                    _ => ResolvedType::unresolved(strip_whitespace(text)),
                }
            }
            "object_creation_expression" => expr
                .child_by_field_name("type")
                .map(|created| qualify(resolve_type_node(file, created), &self.imports))
                .unwrap_or_else(|| ResolvedType::unresolved(text)),
            "cast_expression" => expr
                .child_by_field_name("type")
                .map(|cast| qualify(resolve_type_node(file, cast), &self.imports))
                .unwrap_or_else(|| ResolvedType::unresolved(text)),
            "parenthesized_expression" => {
                let mut cursor = expr.walk();
                let inner = expr.named_children(&mut cursor).next();
                match inner {
                    Some(inner) => self.receiver_type(inner),
                    None => ResolvedType::unresolved(text),
                }
            }
            "array_access" => {
                let array = expr
                    .child_by_field_name("array")
                    .map(|array| self.receiver_type(array));
                match array {
                    Some(array) if array.is_array() => {
                        let rank = array.array_rank - 1;
                        array.with_array_rank(rank)
                    }
                    _ => ResolvedType::unresolved(text),
                }
            }
            "method_invocation" => self.invocation_type(expr),
            "string_literal" => ResolvedType::named("String").with_package("java.lang"),
            _ => ResolvedType::unresolved(strip_whitespace(text)),
        }
    }

    /// Return type of an unqualified or `this.` call to a method of an enclosing type.
    fn invocation_type(&self, expr: Node<'tree>) -> ResolvedType {
        let file = self.file;
        let text = file.text_of(expr);
        let own_call = expr
            .child_by_field_name("object")
            .is_none_or(|object| object.kind() == "this");
        if !own_call {
            return ResolvedType::unresolved(strip_whitespace(text));
        }

        expr.child_by_field_name("name")
            .and_then(|name| self.chain_at(expr).resolve_method(file, file.text_of(name)))
            .and_then(|method| method.type_node)
            .map(|returned| qualify(resolve_type_node(file, returned), &self.imports))
            .unwrap_or_else(|| ResolvedType::unresolved(strip_whitespace(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{find_declaration, DeclarationKind};
    use crate::types::ResolutionKind;

    fn field_type(source: &str, name: &str) -> ResolvedType {
        let file = SourceFile::parse(source).unwrap();
        let decl = find_declaration(&file, file.root(), DeclarationKind::Field, name).unwrap();
        resolve_declaration_type(&file, &decl).unwrap()
    }

    #[test]
    fn test_primitive_and_named() {
        let source = "class A { int count; String name; java.util.Date when; }";
        assert_eq!(field_type(source, "count"), ResolvedType::primitive("int"));
        assert_eq!(field_type(source, "name"), ResolvedType::named("String"));
        assert_eq!(field_type(source, "when").base_name, "java.util.Date");
    }

    #[test]
    fn test_generic_arguments() {
        let resolved = field_type(
            "class A { Map<String, List<Order>> index; }",
            "index",
        );
        assert_eq!(resolved.base_name, "Map");
        assert_eq!(resolved.type_arguments.len(), 2);
        assert_eq!(resolved.type_arguments[1].base_name, "List");
        assert_eq!(resolved.type_arguments[1].type_arguments[0].base_name, "Order");
        assert_eq!(resolved.to_string(), "Map<String, List<Order>>");
    }

    #[test]
    fn test_wildcards_are_opaque() {
        let resolved = field_type("class A { List<? extends Shape> shapes; }", "shapes");
        assert_eq!(resolved.type_arguments.len(), 1);
        assert_eq!(resolved.type_arguments[0].base_name, "? extends Shape");
        assert_eq!(resolved.type_arguments[0].kind, ResolutionKind::Unresolved);
    }

    #[test]
    fn test_array_rank() {
        let source = "class A { int[][] grid; String names[]; List<String>[] buckets; }";
        let grid = field_type(source, "grid");
        assert_eq!(grid.base_name, "int");
        assert_eq!(grid.array_rank, 2);
        assert!(grid.is_primitive());

        assert_eq!(field_type(source, "names").array_rank, 1);

        let buckets = field_type(source, "buckets");
        assert_eq!(buckets.array_rank, 1);
        assert_eq!(buckets.type_arguments.len(), 1);
    }

    #[test]
    fn test_var_inference() {
        let file = SourceFile::parse("class A { void m() { var calc = new Calculator(); var n = 1; } }").unwrap();
        let calc = find_declaration(&file, file.root(), DeclarationKind::LocalVariable, "calc").unwrap();
        assert_eq!(resolve_declaration_type(&file, &calc).unwrap().base_name, "Calculator");

        let n = find_declaration(&file, file.root(), DeclarationKind::LocalVariable, "n").unwrap();
        assert!(!resolve_declaration_type(&file, &n).unwrap().is_resolved());
    }

    #[test]
    fn test_object_type_shadowing() {
        let source = r#"
import com.acme.Calculator;

class Service {
    private Calculator calc;
    private Printer out;

    void run(Printer calc) {
        calc.print();
        out.print();
        unknown.call();
        this.toString();
    }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let resolver = TypeResolver::new(&file);
        let calls = PatternQuery::new("(method_invocation object: (_) @object)")
            .nodes(&file, file.root(), "object")
            .unwrap();

        let param = resolver.receiver_type(calls[0]);
        assert_eq!(param.base_name, "Printer");

        let field = resolver.receiver_type(calls[1]);
        assert_eq!(field.base_name, "Printer");

        let unknown = resolver.receiver_type(calls[2]);
        assert_eq!(unknown, ResolvedType::unresolved("unknown"));

        let this = resolver.receiver_type(calls[3]);
        assert_eq!(this.base_name, "Service");
    }

    #[test]
    fn test_imported_package() {
        let source = "import com.acme.Calculator;\nclass A { Calculator calc; void m() { calc.add(); } }";
        let file = SourceFile::parse(source).unwrap();
        let resolver = TypeResolver::new(&file);
        let object = PatternQuery::new("(method_invocation object: (_) @object)")
            .nodes(&file, file.root(), "object")
            .unwrap()[0];

        let resolved = resolver.receiver_type(object);
        assert_eq!(resolved.package.as_deref(), Some("com.acme"));
        assert_eq!(resolved.qualified_name(), "com.acme.Calculator");
    }

    #[test]
    fn test_receiver_expressions() {
        let source = r#"
class Shop {
    private Cart cart;
    Cart current() { return cart; }
    void m(Object o) {
        this.cart.clear();
        new Cart().clear();
        ((Cart) o).clear();
        current().clear();
        "x".length();
        other.cart.clear();
    }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let resolver = TypeResolver::new(&file);
        let objects = PatternQuery::new("(method_invocation object: (_) @object)")
            .nodes(&file, file.root(), "object")
            .unwrap();
        let types: Vec<String> = objects
            .iter()
            .map(|o| resolver.receiver_type(*o).base_name)
            .collect();

        assert_eq!(
            types,
            vec!["Cart", "Cart", "Cart", "Cart", "String", "other.cart"]
        );
    }

    #[test]
    fn test_super_field_receiver() {
        let source = r#"
class Base { protected Cart cart; }
class Shop extends Base {
    void m() { super.cart.clear(); super.missing.clear(); }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let resolver = TypeResolver::new(&file);
        let objects = PatternQuery::new("(method_invocation object: (_) @object)")
            .nodes(&file, file.root(), "object")
            .unwrap();

        assert_eq!(resolver.receiver_type(objects[0]).base_name, "Cart");
        assert!(!resolver.receiver_type(objects[1]).is_resolved());
    }

    #[test]
    fn test_resolve_object_type_contract() {
        let file = SourceFile::parse("class A { long total; void m() { int total = 0; f(total); } }").unwrap();
        let usage = file.node_at(0, 50).unwrap();
        assert_eq!(file.text_of(usage), "total");

        let chain = crate::scope::scope_chain_at(&file, usage);
        let resolved = resolve_object_type(&file, &chain, "total", &[]);
        assert_eq!(resolved, ResolvedType::primitive("int"));

        let missing = resolve_object_type(&file, &chain, "nothing", &[]);
        assert_eq!(missing, ResolvedType::unresolved("nothing"));
    }
}
