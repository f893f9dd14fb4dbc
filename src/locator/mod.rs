//! Declaration lookup and decomposition.
//!
//! Every lookup runs a [`PatternQuery`] against the current tree and
//! returns [`Declaration`]s borrowing from it. A node of the wrong kind, a
//! malformed subtree or a name that is not declared simply yields nothing.
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("public class C { private int x, y; }")?;
//! let fields = locator::find_all_declarations(&file, file.root(), DeclarationKind::Field);
//! assert_eq!(fields.len(), 2);
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

mod capture;
mod fields;
mod methods;
mod types;
mod variables;

pub use capture::{
    AnnotationArgument, AnnotationCapture, Capture, DeclarationKind, ImportCapture,
    InvocationCapture, MethodCapture, TypeCapture, VariableCapture,
};
pub use fields::{fields_of, find_field_by_name, find_fields_by_type};
pub use methods::{
    decompose_invocation, find_constructors, find_methods_by_name, invocations_named,
    is_main_method, methods_of, parameters_of,
};
pub use types::{
    enclosing_type, find_annotation_type_by_name, find_class_by_name, find_record_by_name,
    find_type_by_name, is_java_lang_class, member_container, members, public_type,
    record_components, superclass_name, type_body, TYPE_BODY_KINDS, TYPE_DECLARATION_KINDS,
};
pub use variables::{find_local_variable, find_parameter, locals_in};

use crate::query::{CaptureMap, PatternQuery};
use crate::scope::FrameKind;
use crate::source::SourceFile;
use tree_sitter::Node;

const TYPE_PATTERN: &str = r#"
[
  (class_declaration (modifiers)? @modifiers name: (identifier) @name body: (_) @body)
  (interface_declaration (modifiers)? @modifiers name: (identifier) @name body: (_) @body)
  (enum_declaration (modifiers)? @modifiers name: (identifier) @name body: (_) @body)
  (record_declaration
    (modifiers)? @modifiers
    name: (identifier) @name
    parameters: (formal_parameters) @components
    body: (_) @body)
  (annotation_type_declaration (modifiers)? @modifiers name: (identifier) @name body: (_) @body)
] @declaration
"#;

const VARIABLE_PATTERN: &str = r#"
[
  (field_declaration
    (modifiers)? @modifiers
    type: (_) @type
    declarator: (variable_declarator name: (_) @name value: (_)? @value) @declarator)
  (constant_declaration
    (modifiers)? @modifiers
    type: (_) @type
    declarator: (variable_declarator name: (_) @name value: (_)? @value) @declarator)
  (local_variable_declaration
    (modifiers)? @modifiers
    type: (_) @type
    declarator: (variable_declarator name: (_) @name value: (_)? @value) @declarator)
] @declaration
"#;

const PARAMETER_PATTERN: &str = r#"
[
  (formal_parameter (modifiers)? @modifiers type: (_) @type name: (_) @name)
  (catch_formal_parameter (modifiers)? @modifiers (catch_type) @type name: (_) @name)
  (spread_parameter
    [(type_identifier) (scoped_type_identifier) (generic_type) (array_type)
     (integral_type) (floating_point_type) (boolean_type)] @type
    (variable_declarator name: (_) @name) @declarator)
] @declaration
"#;

const LAMBDA_PATTERN: &str = r#"
[
  (lambda_expression parameters: (identifier) @name)
  (lambda_expression parameters: (inferred_parameters (identifier) @name))
] @declaration
"#;

const LOOP_VARIABLE_PATTERN: &str = r#"
(enhanced_for_statement (modifiers)? @modifiers type: (_) @type name: (_) @name) @declaration
"#;

const RESOURCE_PATTERN: &str = r#"
(resource (modifiers)? @modifiers type: (_) @type name: (_) @name value: (_) @value) @declaration
"#;

const PATTERN_VARIABLE_PATTERN: &str = r#"
[
  (instanceof_expression right: (_) @type name: (identifier) @name)
  (type_pattern (_) @type (identifier) @name .)
  (record_pattern_component (_) @type (identifier) @name .)
] @declaration
"#;

const METHOD_PATTERN: &str = r#"
[
  (method_declaration
    (modifiers)? @modifiers
    type: (_) @type
    name: (_) @name
    parameters: (formal_parameters) @parameters
    body: (block)? @body)
  (constructor_declaration
    (modifiers)? @modifiers
    name: (_) @name
    parameters: (formal_parameters) @parameters
    body: (constructor_body) @body)
] @declaration
"#;

const IMPORT_PATTERN: &str = r#"
(import_declaration [(scoped_identifier) (identifier)] @path (asterisk)? @wildcard) @declaration
"#;

const PACKAGE_PATTERN: &str = r#"
(package_declaration [(scoped_identifier) (identifier)] @name) @package
"#;

/// A located declaration: one logical named entity and its sub-nodes.
///
/// Declarations borrow from the tree they were found in and are invalid
/// once the file is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'tree> {
    /// The kind of declaration.
    pub kind: DeclarationKind,
    /// The declaration node (`field_declaration`, `method_declaration`, ...).
    pub node: Node<'tree>,
    /// The identifier naming the entity.
    pub name: Node<'tree>,
    /// Declared type; absent for constructors, types, imports and inferred lambda parameters.
    pub type_node: Option<Node<'tree>>,
    /// Initializer, if any.
    pub value: Option<Node<'tree>>,
    /// Modifier list, shared by all declarators of one declaration.
    pub modifiers: Option<Node<'tree>>,
    /// The `variable_declarator` for fields and locals.
    pub declarator: Option<Node<'tree>>,
    /// The node whose subtree this declaration is visible in.
    pub scope: Node<'tree>,
}

impl<'tree> Declaration<'tree> {
    /// Returns the declared name.
    pub fn name_text<'a>(&self, file: &'a SourceFile) -> &'a str {
        file.text_of(self.name)
    }

    /// Returns the declared type as written.
    pub fn type_text<'a>(&self, file: &'a SourceFile) -> Option<&'a str> {
        self.type_node.map(|node| file.text_of(node))
    }

    /// Returns true if the declaration carries `modifier` (`public`, `static`, ...).
    pub fn has_modifier(&self, file: &SourceFile, modifier: &str) -> bool {
        has_modifier(file, self.modifiers, modifier)
    }

    /// Returns true if both values describe the same declared entity.
    pub fn is_same(&self, other: &Declaration<'_>) -> bool {
        self.name.id() == other.name.id() && self.kind == other.kind
    }
}

impl<'tree> From<Capture<'tree>> for Declaration<'tree> {
    fn from(capture: Capture<'tree>) -> Self {
        let kind = capture.kind();
        let node = capture.declaration();
        Declaration {
            kind,
            node,
            name: capture.name(),
            type_node: capture.type_node(),
            value: capture.value(),
            modifiers: capture.modifiers(),
            declarator: capture.declarator(),
            scope: owning_scope(kind, node),
        }
    }
}

/// Returns true if a modifier list contains `modifier`.
pub fn has_modifier(file: &SourceFile, modifiers: Option<Node<'_>>, modifier: &str) -> bool {
    modifiers.is_some_and(|node| {
        file.text_of(node)
            .split(|c: char| c.is_whitespace())
            .any(|word| word == modifier)
    })
}

/// Decomposes a declaration node into one capture per logical declaration.
///
/// `int x, y;` yields two captures. A `variable_declarator` yields only
/// its own capture. Any other node yields nothing.
pub fn decompose<'tree>(file: &'tree SourceFile, node: Node<'tree>) -> Vec<Capture<'tree>> {
    match node.kind() {
        "class_declaration" => anchored(file, node, TYPE_PATTERN)
            .into_iter()
            .filter_map(|m| type_capture(&m).map(Capture::Class))
            .take(1)
            .collect(),
        "interface_declaration" => anchored(file, node, TYPE_PATTERN)
            .into_iter()
            .filter_map(|m| type_capture(&m).map(Capture::Interface))
            .take(1)
            .collect(),
        "enum_declaration" => anchored(file, node, TYPE_PATTERN)
            .into_iter()
            .filter_map(|m| type_capture(&m).map(Capture::Enum))
            .take(1)
            .collect(),
        "record_declaration" => anchored(file, node, TYPE_PATTERN)
            .into_iter()
            .filter_map(|m| type_capture(&m).map(Capture::Record))
            .take(1)
            .collect(),
        "annotation_type_declaration" => anchored(file, node, TYPE_PATTERN)
            .into_iter()
            .filter_map(|m| type_capture(&m).map(Capture::Annotation))
            .take(1)
            .collect(),
        "field_declaration" | "constant_declaration" => variables(file, node, VARIABLE_PATTERN)
            .into_iter()
            .map(Capture::Field)
            .collect(),
        "local_variable_declaration" => variables(file, node, VARIABLE_PATTERN)
            .into_iter()
            .map(Capture::LocalVariable)
            .collect(),
        "enhanced_for_statement" => variables(file, node, LOOP_VARIABLE_PATTERN)
            .into_iter()
            .map(Capture::LocalVariable)
            .collect(),
        "resource" => variables(file, node, RESOURCE_PATTERN)
            .into_iter()
            .map(Capture::LocalVariable)
            .collect(),
        "instanceof_expression" | "type_pattern" | "record_pattern_component" => {
            variables(file, node, PATTERN_VARIABLE_PATTERN)
                .into_iter()
                .map(Capture::LocalVariable)
                .collect()
        }
        "formal_parameter" | "spread_parameter" | "catch_formal_parameter" => {
            variables(file, node, PARAMETER_PATTERN)
                .into_iter()
                .map(Capture::Parameter)
                .collect()
        }
        "lambda_expression" => variables(file, node, LAMBDA_PATTERN)
            .into_iter()
            .map(Capture::Parameter)
            .collect(),
        "method_declaration" | "constructor_declaration" => anchored(file, node, METHOD_PATTERN)
            .into_iter()
            .filter_map(|m| method_capture(&m))
            .take(1)
            .map(Capture::Method)
            .collect(),
        "import_declaration" => anchored(file, node, IMPORT_PATTERN)
            .into_iter()
            .filter_map(|m| import_capture(file, &m))
            .take(1)
            .map(Capture::Import)
            .collect(),
        "variable_declarator" => node
            .parent()
            .map(|parent| {
                decompose(file, parent)
                    .into_iter()
                    .filter(|c| c.declarator() == Some(node))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Decomposes a node straight into declarations.
pub fn declarations_of<'tree>(file: &'tree SourceFile, node: Node<'tree>) -> Vec<Declaration<'tree>> {
    decompose(file, node).into_iter().map(Declaration::from).collect()
}

/// Finds every declaration of `kind` within `container`, nested ones included.
pub fn find_all_declarations<'tree>(
    file: &'tree SourceFile,
    container: Node<'tree>,
    kind: DeclarationKind,
) -> Vec<Declaration<'tree>> {
    let mut found: Vec<Declaration<'tree>> = declaration_nodes(file, container, kind.node_kinds())
        .into_iter()
        .flat_map(|node| declarations_of(file, node))
        .filter(|decl| decl.kind == kind)
        .collect();
    found.sort_by_key(|decl| decl.name.start_byte());
    found
}

/// Finds every declaration of any kind within `container`, in source order.
pub fn all_declarations<'tree>(
    file: &'tree SourceFile,
    container: Node<'tree>,
) -> Vec<Declaration<'tree>> {
    let kinds: Vec<&str> = DeclarationKind::ALL
        .iter()
        .flat_map(|kind| kind.node_kinds().iter().copied())
        .collect();

    let mut found: Vec<Declaration<'tree>> = declaration_nodes(file, container, &kinds)
        .into_iter()
        .flat_map(|node| declarations_of(file, node))
        .collect();
    found.sort_by_key(|decl| (decl.name.start_byte(), decl.name.end_byte()));
    found.dedup_by(|a, b| a.is_same(b));
    found
}

/// Finds the first declaration of `kind` named exactly `name` under `root`.
pub fn find_declaration<'tree>(
    file: &'tree SourceFile,
    root: Node<'tree>,
    kind: DeclarationKind,
    name: &str,
) -> Option<Declaration<'tree>> {
    if name.is_empty() {
        return None;
    }
    find_all_declarations(file, root, kind)
        .into_iter()
        .find(|decl| decl.name_text(file) == name)
}

/// Returns the declaration that `node` names or declares.
///
/// Accepts the declaration's name identifier, a `variable_declarator`, or a
/// declaration node that holds exactly one logical declaration.
pub fn declaration_at<'tree>(
    file: &'tree SourceFile,
    node: Node<'tree>,
) -> Option<Declaration<'tree>> {
    if node.kind() == "identifier" {
        let parent = node.parent()?;
        let owner = match parent.kind() {
            "variable_declarator" | "inferred_parameters" => parent.parent()?,
            _ => parent,
        };
        return declarations_of(file, owner)
            .into_iter()
            .find(|decl| decl.name == node);
    }

    let mut declarations = declarations_of(file, node);
    if declarations.len() == 1 {
        declarations.pop()
    } else {
        None
    }
}

/// Returns the `package_declaration` node, if the file has one.
pub fn package_declaration<'tree>(file: &'tree SourceFile) -> Option<Node<'tree>> {
    PatternQuery::new(PACKAGE_PATTERN)
        .nodes_or_empty(file, file.root(), "package")
        .into_iter()
        .next()
}

/// Returns the declared package name (`com.acme.billing`).
pub fn package_name(file: &SourceFile) -> Option<String> {
    let package = package_declaration(file)?;
    PatternQuery::new(PACKAGE_PATTERN)
        .anchored()
        .nodes_or_empty(file, package, "name")
        .first()
        .map(|name| strip_whitespace(file.text_of(*name)))
}

/// Returns the scope node a declaration of `kind` at `node` is visible in.
fn owning_scope(kind: DeclarationKind, node: Node<'_>) -> Node<'_> {
    let parent = match node.kind() {
        "enhanced_for_statement" | "lambda_expression" => return node,
        // Record components are visible throughout the record body.
        "formal_parameter" | "spread_parameter" => {
            let owner = node.parent().and_then(|params| params.parent());
            match owner {
                Some(record) if record.kind() == "record_declaration" => {
                    record.child_by_field_name("body").or(owner)
                }
                _ => owner,
            }
        }
        "resource" => node.parent().and_then(|spec| spec.parent()),
        // Pattern variables live in the nearest enclosing scope frame.
        "instanceof_expression" | "type_pattern" | "record_pattern_component" => {
            let mut current = node.parent();
            while let Some(ancestor) = current {
                if FrameKind::for_node_kind(ancestor.kind()).is_some() {
                    break;
                }
                current = ancestor.parent();
            }
            current
        }
        _ => node.parent(),
    };

    match parent {
        Some(p) if p.kind() == "enum_body_declarations" && kind != DeclarationKind::Import => {
            p.parent().unwrap_or(p)
        }
        Some(p) => p,
        None => node,
    }
}

fn declaration_nodes<'tree>(
    file: &'tree SourceFile,
    container: Node<'tree>,
    kinds: &[&str],
) -> Vec<Node<'tree>> {
    let alternatives: Vec<String> = kinds.iter().map(|k| format!("({k})")).collect();
    let pattern = format!("[{}] @node", alternatives.join(" "));
    PatternQuery::new(pattern).nodes_or_empty(file, container, "node")
}

fn anchored<'tree>(
    file: &'tree SourceFile,
    node: Node<'tree>,
    pattern: &str,
) -> Vec<CaptureMap<'tree>> {
    let maps = PatternQuery::new(pattern).anchored().run_or_empty(file, node);
    best_per_name(maps)
        .into_iter()
        .filter(|m| m.get("declaration") == Some(node))
        .collect()
}

/// Optional sub-patterns can report the same declarator more than once;
/// keep the most complete match for each name node.
fn best_per_name(maps: Vec<CaptureMap<'_>>) -> Vec<CaptureMap<'_>> {
    let mut best: Vec<CaptureMap<'_>> = Vec::new();
    for map in maps {
        let Some(name) = map.get("name").or_else(|| map.get("path")) else {
            continue;
        };
        match best
            .iter_mut()
            .find(|b| b.get("name").or_else(|| b.get("path")) == Some(name))
        {
            Some(existing) if existing.len() < map.len() => *existing = map,
            Some(_) => {}
            None => best.push(map),
        }
    }
    best.sort_by_key(|m| {
        m.get("name")
            .or_else(|| m.get("path"))
            .map(|n| n.start_byte())
            .unwrap_or_default()
    });
    best
}

fn variables<'tree>(
    file: &'tree SourceFile,
    node: Node<'tree>,
    pattern: &str,
) -> Vec<VariableCapture<'tree>> {
    anchored(file, node, pattern)
        .into_iter()
        .filter_map(|m| {
            Some(VariableCapture {
                declaration: m.get("declaration")?,
                declarator: m.get("declarator"),
                name: m.get("name")?,
                type_node: m.get("type"),
                value: m.get("value"),
                modifiers: m.get("modifiers"),
            })
        })
        .collect()
}

fn type_capture<'tree>(m: &CaptureMap<'tree>) -> Option<TypeCapture<'tree>> {
    Some(TypeCapture {
        declaration: m.get("declaration")?,
        name: m.get("name")?,
        modifiers: m.get("modifiers"),
        body: m.get("body"),
        components: m.get("components"),
    })
}

fn method_capture<'tree>(m: &CaptureMap<'tree>) -> Option<MethodCapture<'tree>> {
    Some(MethodCapture {
        declaration: m.get("declaration")?,
        name: m.get("name")?,
        return_type: m.get("type"),
        parameters: m.get("parameters"),
        body: m.get("body"),
        modifiers: m.get("modifiers"),
    })
}

fn import_capture<'tree>(
    file: &'tree SourceFile,
    m: &CaptureMap<'tree>,
) -> Option<ImportCapture<'tree>> {
    let declaration = m.get("declaration")?;
    let path = m.get("path")?;
    let is_wildcard = m.contains("wildcard");
    let is_static = file
        .text_of(declaration)
        .trim_start_matches("import")
        .trim_start()
        .starts_with("static");

    let (package, class_name) = if is_wildcard {
        (Some(path), None)
    } else if path.kind() == "scoped_identifier" {
        (
            path.child_by_field_name("scope"),
            path.child_by_field_name("name"),
        )
    } else {
        (None, Some(path))
    };

    Some(ImportCapture {
        declaration,
        path,
        package,
        class_name,
        is_wildcard,
        is_static,
    })
}

pub(crate) fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
