//! Reference matching over one file.

use super::{ReferenceKind, UsageOptions, UsageSite};
use crate::locator::{invocations_named, Declaration, DeclarationKind, TYPE_DECLARATION_KINDS};
use crate::query::PatternQuery;
use crate::source::SourceFile;
use crate::types::{ResolvedType, TypeResolver};
use tracing::debug;
use tree_sitter::Node;

const IDENTIFIER_PATTERN: &str = "(identifier) @id";
const TYPE_IDENTIFIER_PATTERN: &str = "(type_identifier) @type";
const METHOD_REFERENCE_PATTERN: &str = "(method_reference) @reference";

/// Parents whose `name` field introduces a new name rather than using one.
const DECLARING_PARENTS: &[&str] = &[
    "variable_declarator",
    "formal_parameter",
    "catch_formal_parameter",
    "method_declaration",
    "constructor_declaration",
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "enhanced_for_statement",
    "resource",
    "enum_constant",
    "annotation_type_declaration",
    "annotation_type_element_declaration",
    "record_declaration",
    "instanceof_expression",
];

/// Finds usage sites in one file.
///
/// Building a finder indexes the file's declarations and imports once, so
/// reuse one finder for several searches over the same revision.
pub struct UsageFinder<'tree> {
    file: &'tree SourceFile,
    resolver: TypeResolver<'tree>,
    options: UsageOptions,
}

impl<'tree> UsageFinder<'tree> {
    pub fn new(file: &'tree SourceFile) -> Self {
        Self {
            file,
            resolver: TypeResolver::new(file),
            options: UsageOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UsageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolver(&self) -> &TypeResolver<'tree> {
        &self.resolver
    }

    /// Finds the references to `decl` within `scope`, in source order.
    ///
    /// The declaration's own name is not a usage.
    pub fn find_usages(&self, decl: &Declaration<'tree>, scope: Node<'tree>) -> Vec<UsageSite<'tree>> {
        let name = decl.name_text(self.file);
        let sites = match decl.kind {
            DeclarationKind::Field | DeclarationKind::Parameter | DeclarationKind::LocalVariable => {
                self.variable_usages(decl, scope)
            }
            DeclarationKind::Method => self.method_usages(decl, scope),
            DeclarationKind::Class
            | DeclarationKind::Interface
            | DeclarationKind::Enum
            | DeclarationKind::Record
            | DeclarationKind::Annotation => self.find_type_references(name, scope),
            DeclarationKind::Import => Vec::new(),
        };
        debug!(name, kind = %decl.kind, count = sites.len(), "found usages");
        sites
    }

    /// Finds calls and method references to `method_name` on receivers of
    /// static type `receiver_type`.
    ///
    /// Unqualified and `this.` calls count when made from inside a type of
    /// that name.
    pub fn find_method_calls(
        &self,
        method_name: &str,
        receiver_type: &str,
        scope: Node<'tree>,
    ) -> Vec<UsageSite<'tree>> {
        let mut sites = Vec::new();

        for call in invocations_named(self.file, scope, method_name) {
            let site = match call.object {
                Some(object) if object.kind() == "super" => None,
                Some(object) if object.kind() != "this" => {
                    self.typed_receiver(call.name, object, receiver_type, ReferenceKind::Call)
                }
                object => self.own_type_call(call.name, object, receiver_type),
            };
            sites.extend(site);
        }

        for (object, name) in self.method_references(scope, method_name) {
            let site = if object.kind() == "this" {
                self.own_type_call(name, Some(object), receiver_type)
            } else {
                self.typed_receiver(name, object, receiver_type, ReferenceKind::Call)
            };
            sites.extend(site);
        }

        sort_sites(&mut sites);
        debug!(method_name, receiver_type, count = sites.len(), "found method calls");
        sites
    }

    /// Finds every reference to a type: type positions, static receivers
    /// (`Type.member`) and constructor names.
    pub fn find_type_references(&self, type_name: &str, scope: Node<'tree>) -> Vec<UsageSite<'tree>> {
        let file = self.file;
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);
        if simple.is_empty() {
            return Vec::new();
        }

        let mut sites: Vec<UsageSite<'tree>> = PatternQuery::new(TYPE_IDENTIFIER_PATTERN)
            .nodes_or_empty(file, scope, "type")
            .into_iter()
            .filter(|node| file.text_of(*node) == simple)
            .map(|node| UsageSite::unqualified(node, ReferenceKind::Type))
            .collect();

        for id in self.identifiers(scope, simple) {
            let Some(parent) = id.parent() else {
                continue;
            };
            let is_receiver = match parent.kind() {
                "method_invocation" | "field_access" => {
                    parent.child_by_field_name("object") == Some(id)
                }
                "method_reference" => first_named_child(parent) == Some(id),
                "constructor_declaration" | "compact_constructor_declaration" => {
                    if parent.child_by_field_name("name") == Some(id) {
                        sites.push(UsageSite::unqualified(id, ReferenceKind::Type));
                    }
                    false
                }
                "marker_annotation" | "annotation" | "scoped_identifier" => {
                    if is_annotation_name(id) {
                        sites.push(UsageSite::unqualified(id, ReferenceKind::Type));
                    }
                    false
                }
                _ => false,
            };
            // A variable of the same name shadows the type.
            if is_receiver && self.resolver.chain_at(id).resolve(file, simple).is_none() {
                sites.push(UsageSite::unqualified(id, ReferenceKind::Type));
            }
        }

        sort_sites(&mut sites);
        sites
    }

    fn variable_usages(&self, decl: &Declaration<'tree>, scope: Node<'tree>) -> Vec<UsageSite<'tree>> {
        let file = self.file;
        let name = decl.name_text(file);
        let mut sites = Vec::new();

        for id in self.identifiers(scope, name) {
            if id == decl.name {
                continue;
            }
            let Some(parent) = id.parent() else {
                continue;
            };

            if parent.kind() == "field_access" && parent.child_by_field_name("field") == Some(id) {
                if decl.kind != DeclarationKind::Field {
                    continue;
                }
                let Some(object) = parent.child_by_field_name("object") else {
                    continue;
                };
                sites.extend(self.qualified_field(decl, id, parent, object));
                continue;
            }
            if parent.kind() == "method_invocation" && parent.child_by_field_name("name") == Some(id) {
                continue;
            }
            if !is_value_reference(id, parent) {
                continue;
            }

            let resolved = self.resolver.chain_at(id).resolve(file, name);
            if resolved.is_some_and(|found| found.is_same(decl)) {
                sites.push(UsageSite::unqualified(id, access_kind(id)));
            }
        }
        sites
    }

    fn qualified_field(
        &self,
        decl: &Declaration<'tree>,
        field: Node<'tree>,
        access: Node<'tree>,
        object: Node<'tree>,
    ) -> Option<UsageSite<'tree>> {
        match object.kind() {
            "super" => None,
            "this" => {
                if self.options.strict_nested_scopes {
                    let frame = self.resolver.chain_at(field).type_frame().map(|f| f.node);
                    if frame != Some(decl.scope) {
                        return None;
                    }
                }
                Some(UsageSite {
                    reference: field,
                    receiver: Some(object),
                    receiver_type: Some(self.resolver.receiver_type(object)),
                    kind: access_kind(access),
                })
            }
            _ => {
                let owner = owner_name(self.file, decl)?;
                self.typed_receiver(field, object, owner, access_kind(access))
            }
        }
    }

    fn method_usages(&self, decl: &Declaration<'tree>, scope: Node<'tree>) -> Vec<UsageSite<'tree>> {
        let file = self.file;
        let name = decl.name_text(file);
        let owner = owner_name(file, decl);
        let mut sites = Vec::new();

        for call in invocations_named(file, scope, name) {
            let site = match call.object {
                Some(object) if object.kind() == "super" => None,
                Some(object) if object.kind() != "this" => owner.and_then(|owner| {
                    self.typed_receiver(call.name, object, owner, ReferenceKind::Call)
                }),
                object => self.resolves_to(decl, call.name, object),
            };
            sites.extend(site);
        }

        for (object, reference) in self.method_references(scope, name) {
            let site = if object.kind() == "this" {
                self.resolves_to(decl, reference, Some(object))
            } else {
                owner.and_then(|owner| {
                    self.typed_receiver(reference, object, owner, ReferenceKind::Call)
                })
            };
            sites.extend(site);
        }

        sort_sites(&mut sites);
        sites
    }

    /// An unqualified or `this` call that resolves to `decl` through the scope chain.
    fn resolves_to(
        &self,
        decl: &Declaration<'tree>,
        reference: Node<'tree>,
        object: Option<Node<'tree>>,
    ) -> Option<UsageSite<'tree>> {
        let file = self.file;
        let method = self
            .resolver
            .chain_at(reference)
            .resolve_method(file, file.text_of(reference))?;
        method.is_same(decl).then(|| UsageSite {
            reference,
            receiver: object,
            receiver_type: object.map(|o| self.resolver.receiver_type(o)),
            kind: ReferenceKind::Call,
        })
    }

    /// An unqualified or `this` call made from inside a type named `type_name`.
    fn own_type_call(
        &self,
        reference: Node<'tree>,
        object: Option<Node<'tree>>,
        type_name: &str,
    ) -> Option<UsageSite<'tree>> {
        let enclosing = self.resolver.chain_at(reference).enclosing_type_name(self.file)?;
        let enclosing = ResolvedType::named(enclosing);
        enclosing.matches(type_name).then(|| UsageSite {
            reference,
            receiver: object,
            receiver_type: Some(enclosing),
            kind: ReferenceKind::Call,
        })
    }

    fn typed_receiver(
        &self,
        reference: Node<'tree>,
        object: Node<'tree>,
        type_name: &str,
        kind: ReferenceKind,
    ) -> Option<UsageSite<'tree>> {
        let receiver_type = self.resolver.receiver_type(object);
        receiver_type.matches(type_name).then(|| UsageSite {
            reference,
            receiver: Some(object),
            receiver_type: Some(receiver_type),
            kind,
        })
    }

    fn identifiers(&self, scope: Node<'tree>, name: &str) -> Vec<Node<'tree>> {
        let file = self.file;
        let mut found: Vec<Node<'tree>> = PatternQuery::new(IDENTIFIER_PATTERN)
            .nodes_or_empty(file, scope, "id")
            .into_iter()
            .filter(|id| file.text_of(*id) == name)
            .collect();
        found.sort_by_key(|id| id.start_byte());
        found
    }

    /// `(receiver, name)` pairs of `receiver::name` references.
    fn method_references(&self, scope: Node<'tree>, name: &str) -> Vec<(Node<'tree>, Node<'tree>)> {
        let file = self.file;
        PatternQuery::new(METHOD_REFERENCE_PATTERN)
            .nodes_or_empty(file, scope, "reference")
            .into_iter()
            .filter_map(|reference| {
                let mut cursor = reference.walk();
                let children: Vec<Node<'tree>> = reference
                    .named_children(&mut cursor)
                    .filter(|c| c.kind() != "type_arguments")
                    .collect();
                match children.as_slice() {
                    [object, method] if method.kind() == "identifier" => Some((*object, *method)),
                    _ => None,
                }
            })
            .filter(|(_, method)| file.text_of(*method) == name)
            .collect()
    }
}

/// Name of the type declaring a member.
fn owner_name<'a>(file: &'a SourceFile, decl: &Declaration<'_>) -> Option<&'a str> {
    decl.scope
        .parent()
        .filter(|owner| TYPE_DECLARATION_KINDS.contains(&owner.kind()))
        .and_then(|owner| owner.child_by_field_name("name"))
        .map(|name| file.text_of(name))
}

/// Returns false for identifiers that name something other than a value:
/// declarations, package paths, labels, annotations, annotation element
/// keys and the method half of `a::b`.
fn is_value_reference(id: Node<'_>, parent: Node<'_>) -> bool {
    match parent.kind() {
        kind if DECLARING_PARENTS.contains(&kind) => parent.child_by_field_name("name") != Some(id),
        "lambda_expression" => parent.child_by_field_name("parameters") != Some(id),
        "element_value_pair" => parent.child_by_field_name("key") != Some(id),
        // The only identifier of a type pattern is the variable it binds.
        "type_pattern" | "record_pattern_component" => false,
        "inferred_parameters"
        | "scoped_identifier"
        | "marker_annotation"
        | "annotation"
        | "labeled_statement"
        | "break_statement"
        | "continue_statement" => false,
        "method_reference" => first_named_child(parent) == Some(id),
        _ => true,
    }
}

/// True when `id` is the simple name an annotation is applied by, as in
/// `@Audited` or the last segment of `@audit.Audited`.
fn is_annotation_name(id: Node<'_>) -> bool {
    let Some(parent) = id.parent() else {
        return false;
    };
    if parent.child_by_field_name("name") != Some(id) {
        return false;
    }
    match parent.kind() {
        "marker_annotation" | "annotation" => true,
        "scoped_identifier" => parent
            .parent()
            .filter(|owner| matches!(owner.kind(), "marker_annotation" | "annotation"))
            .is_some_and(|owner| owner.child_by_field_name("name") == Some(parent)),
        _ => false,
    }
}

fn first_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).next();
    first
}

fn access_kind(target: Node<'_>) -> ReferenceKind {
    match target.parent() {
        Some(parent)
            if parent.kind() == "assignment_expression"
                && parent.child_by_field_name("left") == Some(target) =>
        {
            ReferenceKind::Write
        }
        Some(parent) if parent.kind() == "update_expression" => ReferenceKind::Write,
        _ => ReferenceKind::Read,
    }
}

fn sort_sites(sites: &mut Vec<UsageSite<'_>>) {
    sites.sort_by_key(|site| site.reference.start_byte());
    sites.dedup_by_key(|site| site.reference.id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{find_all_declarations, find_declaration};

    fn positions(file: &SourceFile, sites: &[UsageSite<'_>]) -> Vec<(usize, usize)> {
        sites
            .iter()
            .map(|s| file.position_of(s.reference.start_byte()))
            .collect()
    }

    const SHAPES: &str = r#"
class Shapes {
    private int count;

    void add(int size) {
        count += size;
        int count = 3;
        use(count);
    }

    void reset() {
        count = 0;
        this.count = 0;
    }
}
"#;

    #[test]
    fn test_field_usages_respect_shadowing() {
        let file = SourceFile::parse(SHAPES).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "count").unwrap();
        let finder = UsageFinder::new(&file);
        let sites = finder.find_usages(&field, field.scope);

        // count += size, count = 0, this.count = 0; not the local or its use.
        assert_eq!(positions(&file, &sites), vec![(5, 8), (11, 8), (12, 13)]);
        assert!(sites.iter().all(|s| s.kind == ReferenceKind::Write));
        assert!(sites[2].is_qualified());
    }

    #[test]
    fn test_local_usages() {
        let file = SourceFile::parse(SHAPES).unwrap();
        let local =
            find_declaration(&file, file.root(), DeclarationKind::LocalVariable, "count").unwrap();
        let sites = find_usages_in(&file, &local);
        assert_eq!(positions(&file, &sites), vec![(7, 12)]);
        assert_eq!(sites[0].kind, ReferenceKind::Read);
    }

    fn find_usages_in<'a>(file: &'a SourceFile, decl: &Declaration<'a>) -> Vec<UsageSite<'a>> {
        UsageFinder::new(file).find_usages(decl, decl.scope)
    }

    #[test]
    fn test_parameter_usages_in_lambda() {
        let source = "class A { void m(int limit) { list.forEach(x -> check(x, limit)); } }";
        let file = SourceFile::parse(source).unwrap();
        let limit = find_declaration(&file, file.root(), DeclarationKind::Parameter, "limit").unwrap();
        assert_eq!(find_usages_in(&file, &limit).len(), 1);

        let x = find_declaration(&file, file.root(), DeclarationKind::Parameter, "x").unwrap();
        assert_eq!(find_usages_in(&file, &x).len(), 1);
    }

    #[test]
    fn test_unreferenced_declaration() {
        let file = SourceFile::parse("class A { private int unused; void m() { int other = 1; } }").unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "unused").unwrap();
        assert!(find_usages_in(&file, &field).is_empty());
    }

    const BILLING: &str = r#"
class Billing {
    private Calculator calc;
    private Printer printer;

    void run(Calculator local) {
        calc.calculateSum(1, 2);
        local.calculateSum(3, 4);
        printer.calculateSum(5, 6);
        Calculator.calculateSum(7, 8);
        java.util.function.BiFunction<Integer, Integer, Integer> f = calc::calculateSum;
    }
}
"#;

    #[test]
    fn test_method_calls_filtered_by_receiver_type() {
        let file = SourceFile::parse(BILLING).unwrap();
        let sites = UsageFinder::new(&file).find_method_calls("calculateSum", "Calculator", file.root());

        let lines: Vec<usize> = positions(&file, &sites).into_iter().map(|(line, _)| line).collect();
        assert_eq!(lines, vec![6, 7, 9, 10]);
        assert_eq!(
            sites[0].receiver_type.as_ref().map(|t| t.base_name.as_str()),
            Some("Calculator")
        );
    }

    #[test]
    fn test_own_type_calls() {
        let source = r#"
class Calculator {
    int calculateSum(int a, int b) { return a + b; }
    int twice(int a) { return calculateSum(a, a) + this.calculateSum(a, 0); }
}
class Other {
    int calculateSum(int a, int b) { return 0; }
    int go() { return calculateSum(1, 1); }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let finder = UsageFinder::new(&file);
        assert_eq!(finder.find_method_calls("calculateSum", "Calculator", file.root()).len(), 2);

        let methods = find_all_declarations(&file, file.root(), DeclarationKind::Method);
        let own = methods.iter().find(|m| m.name_text(&file) == "calculateSum").unwrap();
        let sites = finder.find_usages(own, file.root());
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().all(|s| s.kind == ReferenceKind::Call));
    }

    #[test]
    fn test_qualified_field_access() {
        let source = r#"
class Order {
    int total;
    static int LIMIT;
}
class Report {
    Order order;
    Invoice invoice;
    int sum() { return order.total + invoice.total + Order.LIMIT; }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let finder = UsageFinder::new(&file);

        let total = find_declaration(&file, file.root(), DeclarationKind::Field, "total").unwrap();
        let sites = finder.find_usages(&total, file.root());
        assert_eq!(sites.len(), 1);
        assert_eq!(file.text_of(sites[0].receiver.unwrap()), "order");

        let limit = find_declaration(&file, file.root(), DeclarationKind::Field, "LIMIT").unwrap();
        assert_eq!(finder.find_usages(&limit, file.root()).len(), 1);
    }

    const NESTED: &str = r#"
class Outer {
    int value;
    void set() { this.value = 1; }
    class Inner {
        int value;
        void set() { this.value = 2; }
    }
}
"#;

    #[test]
    fn test_nested_this_access_over_matches_by_default() {
        let file = SourceFile::parse(NESTED).unwrap();
        let outer = find_declaration(&file, file.root(), DeclarationKind::Field, "value").unwrap();
        let sites = UsageFinder::new(&file).find_usages(&outer, outer.scope);
        assert_eq!(sites.len(), 2);
    }

    #[test]
    fn test_strict_nested_scopes() {
        let file = SourceFile::parse(NESTED).unwrap();
        let outer = find_declaration(&file, file.root(), DeclarationKind::Field, "value").unwrap();
        let sites = UsageFinder::new(&file)
            .with_options(UsageOptions::strict())
            .find_usages(&outer, outer.scope);
        assert_eq!(positions(&file, &sites), vec![(3, 22)]);
    }

    #[test]
    fn test_type_references() {
        let source = r#"
class Money {
    Money(int cents) {}
    static Money zero() { return new Money(0); }
}
class Wallet {
    List<Money> coins;
    Money first() { return Money.zero(); }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let sites = UsageFinder::new(&file).find_type_references("Money", file.root());
        // Constructor name, return type, new Money, List<Money>, return type, Money.zero().
        assert_eq!(sites.len(), 6);
        assert!(sites.iter().all(|s| s.kind == ReferenceKind::Type));
    }

    #[test]
    fn test_annotation_and_record_type_references() {
        let source = r#"
@interface Audited { String value(); }
record Point(int x, int y) {
    Point {
        check(x);
    }
    @Audited("move") @audit.Audited Point move() { return new Point(x + 1, y); }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let finder = UsageFinder::new(&file);

        let audited = find_declaration(&file, file.root(), DeclarationKind::Annotation, "Audited").unwrap();
        let sites = finder.find_usages(&audited, file.root());
        assert_eq!(positions(&file, &sites), vec![(6, 5), (6, 28)]);
        assert!(sites.iter().all(|s| s.kind == ReferenceKind::Type));

        // Compact constructor, return type, new Point.
        let point = find_declaration(&file, file.root(), DeclarationKind::Record, "Point").unwrap();
        assert_eq!(finder.find_usages(&point, file.root()).len(), 3);

        // Record components are read in the compact constructor and methods.
        let x = find_declaration(&file, file.root(), DeclarationKind::Parameter, "x").unwrap();
        assert_eq!(x.scope.kind(), "class_body");
        assert_eq!(finder.find_usages(&x, x.scope).len(), 2);
    }

    #[test]
    fn test_annotation_keys_are_not_usages() {
        let source = r#"
class User {
    @Column(name = "user_name", length = name)
    private String name;

    @Size(max = 10)
    String describe() { return name; }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "name").unwrap();
        let sites = UsageFinder::new(&file).find_usages(&field, field.scope);

        // The value `name` in `length = name` and the return; not the key.
        assert_eq!(positions(&file, &sites), vec![(2, 41), (6, 31)]);
    }

    const PATTERNS: &str = r#"
class Shapes {
    Object f;

    void m(Object o) {
        if (o instanceof String f) {
            use(f);
        }
        use(f);
        switch (o) {
            case Integer f -> use(f);
            default -> use(f);
        }
    }
}
"#;

    #[test]
    fn test_pattern_variables_shadow_fields() {
        let file = SourceFile::parse(PATTERNS).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "f").unwrap();
        let sites = UsageFinder::new(&file).find_usages(&field, field.scope);

        // Only the use after the if and the default branch see the field.
        assert_eq!(positions(&file, &sites), vec![(8, 12), (11, 27)]);
    }

    #[test]
    fn test_pattern_variable_usages() {
        let file = SourceFile::parse(PATTERNS).unwrap();
        let patterns = find_all_declarations(&file, file.root(), DeclarationKind::LocalVariable);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].type_text(&file), Some("String"));
        assert_eq!(patterns[0].scope.kind(), "if_statement");
        assert_eq!(patterns[1].type_text(&file), Some("Integer"));
        assert_eq!(patterns[1].scope.kind(), "switch_rule");

        let finder = UsageFinder::new(&file);
        let string_uses = finder.find_usages(&patterns[0], patterns[0].scope);
        assert_eq!(positions(&file, &string_uses), vec![(6, 16)]);
        let integer_uses = finder.find_usages(&patterns[1], patterns[1].scope);
        assert_eq!(positions(&file, &integer_uses), vec![(10, 34)]);
    }

    #[test]
    fn test_labels_and_packages_are_not_usages() {
        let source = r#"
package count;
class A {
    int count;
    void m() {
        count: for (;;) { break count; }
        count++;
    }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "count").unwrap();
        let sites = UsageFinder::new(&file).find_usages(&field, file.root());
        assert_eq!(positions(&file, &sites), vec![(6, 8)]);
    }
}
