//! Typed captures for each declaration kind.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// The kind of a Java declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    /// Class definition.
    Class,
    /// Interface definition.
    Interface,
    /// Enum definition.
    Enum,
    /// Record definition.
    Record,
    /// Annotation type definition (`@interface`).
    Annotation,
    /// Field of a class, interface or enum.
    Field,
    /// Method or constructor.
    Method,
    /// Method, constructor, lambda or catch parameter.
    Parameter,
    /// Local variable, including loop variables, try resources and pattern variables.
    LocalVariable,
    /// Import declaration.
    Import,
}

impl DeclarationKind {
    /// All declaration kinds, outermost first.
    pub const ALL: [DeclarationKind; 10] = [
        DeclarationKind::Import,
        DeclarationKind::Class,
        DeclarationKind::Interface,
        DeclarationKind::Enum,
        DeclarationKind::Record,
        DeclarationKind::Annotation,
        DeclarationKind::Field,
        DeclarationKind::Method,
        DeclarationKind::Parameter,
        DeclarationKind::LocalVariable,
    ];

    /// Returns a human-readable name for this declaration kind.
    pub fn name(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Record => "record",
            DeclarationKind::Annotation => "annotation",
            DeclarationKind::Field => "field",
            DeclarationKind::Method => "method",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::LocalVariable => "local variable",
            DeclarationKind::Import => "import",
        }
    }

    /// Parses a kind from its name, as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().replace(' ', "-") == name.to_ascii_lowercase())
    }

    /// Returns true if this kind declares a type.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Enum
                | DeclarationKind::Record
                | DeclarationKind::Annotation
        )
    }

    /// Returns true if this kind lives in the variable namespace.
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Field | DeclarationKind::Parameter | DeclarationKind::LocalVariable
        )
    }

    /// Returns true if a declaration of this kind can be renamed in place.
    pub fn is_renamable(&self) -> bool {
        !matches!(self, DeclarationKind::Import)
    }

    /// Node kinds that declare this kind.
    pub(crate) fn node_kinds(&self) -> &'static [&'static str] {
        match self {
            DeclarationKind::Class => &["class_declaration"],
            DeclarationKind::Interface => &["interface_declaration"],
            DeclarationKind::Enum => &["enum_declaration"],
            DeclarationKind::Record => &["record_declaration"],
            DeclarationKind::Annotation => &["annotation_type_declaration"],
            DeclarationKind::Field => &["field_declaration", "constant_declaration"],
            DeclarationKind::Method => &["method_declaration", "constructor_declaration"],
            DeclarationKind::Parameter => &[
                "formal_parameter",
                "spread_parameter",
                "catch_formal_parameter",
                "lambda_expression",
            ],
            DeclarationKind::LocalVariable => &[
                "local_variable_declaration",
                "enhanced_for_statement",
                "resource",
                "instanceof_expression",
                "type_pattern",
                "record_pattern_component",
            ],
            DeclarationKind::Import => &["import_declaration"],
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sub-nodes of a class, interface, enum, record or annotation type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCapture<'tree> {
    pub declaration: Node<'tree>,
    pub name: Node<'tree>,
    pub modifiers: Option<Node<'tree>>,
    pub body: Option<Node<'tree>>,
    /// Record components; absent for every other kind.
    pub components: Option<Node<'tree>>,
}

/// Sub-nodes of one declared variable: a field, parameter or local.
///
/// For comma-joined declarations (`int x, y;`) each declarator yields its
/// own capture sharing `declaration`, `type_node` and `modifiers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableCapture<'tree> {
    pub declaration: Node<'tree>,
    /// The `variable_declarator`, when the grammar has one.
    pub declarator: Option<Node<'tree>>,
    pub name: Node<'tree>,
    /// Absent for inferred lambda parameters.
    pub type_node: Option<Node<'tree>>,
    /// The initializer, if any.
    pub value: Option<Node<'tree>>,
    pub modifiers: Option<Node<'tree>>,
}

/// Sub-nodes of a method or constructor declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodCapture<'tree> {
    pub declaration: Node<'tree>,
    pub name: Node<'tree>,
    /// Return type; absent for constructors.
    pub return_type: Option<Node<'tree>>,
    pub parameters: Option<Node<'tree>>,
    /// Absent for abstract and interface methods.
    pub body: Option<Node<'tree>>,
    pub modifiers: Option<Node<'tree>>,
}

impl MethodCapture<'_> {
    pub fn is_constructor(&self) -> bool {
        self.declaration.kind() == "constructor_declaration"
    }
}

/// Sub-nodes of an import declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportCapture<'tree> {
    pub declaration: Node<'tree>,
    /// The full dotted name as written, without `.*`.
    pub path: Node<'tree>,
    /// Package part of an explicit import; the whole path for a wildcard.
    pub package: Option<Node<'tree>>,
    /// Class part of an explicit import; absent for a wildcard.
    pub class_name: Option<Node<'tree>>,
    pub is_wildcard: bool,
    pub is_static: bool,
}

/// Sub-nodes of a method invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationCapture<'tree> {
    pub invocation: Node<'tree>,
    /// Receiver expression; absent for unqualified calls.
    pub object: Option<Node<'tree>>,
    pub name: Node<'tree>,
    pub arguments: Option<Node<'tree>>,
    /// Explicit generic arguments, as in `this.<T>m()`.
    pub type_arguments: Option<Node<'tree>>,
}

impl InvocationCapture<'_> {
    /// Returns true for `this.m()`.
    pub fn is_this_call(&self) -> bool {
        self.object.is_some_and(|o| o.kind() == "this")
    }

    /// Returns true for `super.m()`.
    pub fn is_super_call(&self) -> bool {
        self.object.is_some_and(|o| o.kind() == "super")
    }

    /// Returns true when the receiver is itself a field access or call, as in `a.b.m()`.
    pub fn is_chained(&self) -> bool {
        self.object
            .is_some_and(|o| matches!(o.kind(), "field_access" | "method_invocation"))
    }
}

/// Sub-nodes of one annotation use (`@Entity`, `@Table(name = "users")`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationCapture<'tree> {
    /// The `annotation` or `marker_annotation` node.
    pub annotation: Node<'tree>,
    /// The annotation's name as written, possibly qualified.
    pub name: Node<'tree>,
    /// The parenthesized argument list; absent for marker annotations.
    pub arguments: Option<Node<'tree>>,
}

impl AnnotationCapture<'_> {
    pub fn is_marker(&self) -> bool {
        self.arguments.is_none()
    }
}

/// One argument of an annotation.
///
/// `@SuppressWarnings("unused")` has a single value without a key; Java
/// reads it as the `value` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationArgument<'tree> {
    /// The `element_value_pair`, when the argument is written `key = value`.
    pub pair: Option<Node<'tree>>,
    pub key: Option<Node<'tree>>,
    pub value: Node<'tree>,
}

/// One logical declaration decomposed into typed sub-nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture<'tree> {
    Class(TypeCapture<'tree>),
    Interface(TypeCapture<'tree>),
    Enum(TypeCapture<'tree>),
    Record(TypeCapture<'tree>),
    Annotation(TypeCapture<'tree>),
    Field(VariableCapture<'tree>),
    Method(MethodCapture<'tree>),
    Parameter(VariableCapture<'tree>),
    LocalVariable(VariableCapture<'tree>),
    Import(ImportCapture<'tree>),
}

impl<'tree> Capture<'tree> {
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Capture::Class(_) => DeclarationKind::Class,
            Capture::Interface(_) => DeclarationKind::Interface,
            Capture::Enum(_) => DeclarationKind::Enum,
            Capture::Record(_) => DeclarationKind::Record,
            Capture::Annotation(_) => DeclarationKind::Annotation,
            Capture::Field(_) => DeclarationKind::Field,
            Capture::Method(_) => DeclarationKind::Method,
            Capture::Parameter(_) => DeclarationKind::Parameter,
            Capture::LocalVariable(_) => DeclarationKind::LocalVariable,
            Capture::Import(_) => DeclarationKind::Import,
        }
    }

    /// The node the capture was decomposed from.
    pub fn declaration(&self) -> Node<'tree> {
        match self {
            Capture::Class(c)
            | Capture::Interface(c)
            | Capture::Enum(c)
            | Capture::Record(c)
            | Capture::Annotation(c) => c.declaration,
            Capture::Field(c) | Capture::Parameter(c) | Capture::LocalVariable(c) => c.declaration,
            Capture::Method(c) => c.declaration,
            Capture::Import(c) => c.declaration,
        }
    }

    /// The identifier naming the declaration.
    ///
    /// For imports this is the class name, or the package for a wildcard.
    pub fn name(&self) -> Node<'tree> {
        match self {
            Capture::Class(c)
            | Capture::Interface(c)
            | Capture::Enum(c)
            | Capture::Record(c)
            | Capture::Annotation(c) => c.name,
            Capture::Field(c) | Capture::Parameter(c) | Capture::LocalVariable(c) => c.name,
            Capture::Method(c) => c.name,
            Capture::Import(c) => c.class_name.or(c.package).unwrap_or(c.path),
        }
    }

    pub fn type_node(&self) -> Option<Node<'tree>> {
        match self {
            Capture::Field(c) | Capture::Parameter(c) | Capture::LocalVariable(c) => c.type_node,
            Capture::Method(c) => c.return_type,
            _ => None,
        }
    }

    pub fn value(&self) -> Option<Node<'tree>> {
        match self {
            Capture::Field(c) | Capture::Parameter(c) | Capture::LocalVariable(c) => c.value,
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Option<Node<'tree>> {
        match self {
            Capture::Class(c)
            | Capture::Interface(c)
            | Capture::Enum(c)
            | Capture::Record(c)
            | Capture::Annotation(c) => c.modifiers,
            Capture::Field(c) | Capture::Parameter(c) | Capture::LocalVariable(c) => c.modifiers,
            Capture::Method(c) => c.modifiers,
            Capture::Import(_) => None,
        }
    }

    /// The `variable_declarator` for field and local captures.
    pub fn declarator(&self) -> Option<Node<'tree>> {
        match self {
            Capture::Field(c) | Capture::Parameter(c) | Capture::LocalVariable(c) => c.declarator,
            _ => None,
        }
    }
}
