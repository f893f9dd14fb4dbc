//! Scope frames and chains.

use crate::locator::{Declaration, DeclarationKind, TYPE_DECLARATION_KINDS};
use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// The kind of boundary a scope frame was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    /// A block, constructor body or switch group.
    Block,
    /// A statement that declares variables for its own body (`for`, `catch`,
    /// `try`-with-resources), or that binds pattern variables (`if`, `while`).
    Statement,
    /// A method, constructor or lambda; holds the parameters.
    Callable,
    /// A class, interface, enum or anonymous class body; holds the members.
    Type,
}

impl FrameKind {
    /// Maps a node kind to the frame it opens, if any.
    pub fn for_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "block" | "constructor_body" | "switch_block_statement_group" => Some(FrameKind::Block),
            "for_statement"
            | "enhanced_for_statement"
            | "catch_clause"
            | "try_with_resources_statement"
            | "if_statement"
            | "while_statement"
            | "do_statement"
            | "switch_rule" => Some(FrameKind::Statement),
            "method_declaration"
            | "constructor_declaration"
            | "compact_constructor_declaration"
            | "lambda_expression" => Some(FrameKind::Callable),
            "class_body" | "interface_body" | "enum_body" | "annotation_type_body" => {
                Some(FrameKind::Type)
            }
            _ => None,
        }
    }
}

/// One scope boundary and the declarations it contributes.
#[derive(Debug, Clone)]
pub struct ScopeFrame<'tree> {
    pub kind: FrameKind,
    /// The boundary node.
    pub node: Node<'tree>,
    /// Declarations owned by this frame and visible from the query point.
    pub declarations: Vec<Declaration<'tree>>,
}

/// Scope frames visible from one node, innermost first.
#[derive(Debug, Clone, Default)]
pub struct ScopeChain<'tree> {
    frames: Vec<ScopeFrame<'tree>>,
}

impl<'tree> ScopeChain<'tree> {
    pub(crate) fn new(frames: Vec<ScopeFrame<'tree>>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[ScopeFrame<'tree>] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Resolves a variable name: first local, parameter or field found wins.
    pub fn resolve(&self, file: &SourceFile, name: &str) -> Option<Declaration<'tree>> {
        self.find(file, name, |kind| kind.is_variable())
    }

    /// Resolves a method name to the nearest visible method declaration.
    pub fn resolve_method(&self, file: &SourceFile, name: &str) -> Option<Declaration<'tree>> {
        self.find(file, name, |kind| kind == DeclarationKind::Method)
    }

    /// Resolves a field name, skipping locals and parameters.
    pub fn resolve_field(&self, file: &SourceFile, name: &str) -> Option<Declaration<'tree>> {
        self.find(file, name, |kind| kind == DeclarationKind::Field)
    }

    fn find(
        &self,
        file: &SourceFile,
        name: &str,
        accept: impl Fn(DeclarationKind) -> bool,
    ) -> Option<Declaration<'tree>> {
        // Within a frame the latest visible declaration wins: a later
        // pattern variable may reuse the name of an earlier one.
        self.frames
            .iter()
            .flat_map(|frame| frame.declarations.iter().rev())
            .find(|decl| accept(decl.kind) && decl.name_text(file) == name)
            .copied()
    }

    /// Returns every visible declaration, innermost first.
    pub fn visible_declarations(&self) -> Vec<Declaration<'tree>> {
        self.frames
            .iter()
            .flat_map(|frame| frame.declarations.iter().copied())
            .collect()
    }

    /// Returns the innermost type body frame.
    pub fn type_frame(&self) -> Option<&ScopeFrame<'tree>> {
        self.frames.iter().find(|frame| frame.kind == FrameKind::Type)
    }

    /// Returns the innermost enclosing type declaration.
    ///
    /// Anonymous class bodies have no declaration and yield `None`.
    pub fn enclosing_type(&self) -> Option<Node<'tree>> {
        let body = self.type_frame()?.node;
        body.parent()
            .filter(|owner| TYPE_DECLARATION_KINDS.contains(&owner.kind()))
    }

    /// Returns the name of the innermost enclosing type.
    pub fn enclosing_type_name<'a>(&self, file: &'a SourceFile) -> Option<&'a str> {
        self.enclosing_type()
            .and_then(|owner| owner.child_by_field_name("name"))
            .map(|name| file.text_of(name))
    }

    /// Returns the innermost method, constructor or lambda.
    pub fn enclosing_callable(&self) -> Option<Node<'tree>> {
        self.frames
            .iter()
            .find(|frame| frame.kind == FrameKind::Callable)
            .map(|frame| frame.node)
    }
}
