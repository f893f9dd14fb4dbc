//! Lexical scope model.
//!
//! A [`ScopeChain`] lists the scope frames enclosing a node, innermost
//! first: blocks and the statements that bind variables, then the
//! enclosing method, constructor or lambda, then
//! the enclosing type body, then any outer type bodies the node is
//! lexically nested in. Names resolve by a linear search from the first
//! frame, so a local shadows a parameter which shadows a field.
//!
//! ## Example
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("class A { int x; void m(int x) { use(x); } }")?;
//! let usage = file.node_at(0, 37).unwrap();
//! let chain = scope::scope_chain_at(&file, usage);
//! let decl = chain.resolve(&file, "x").unwrap();
//! assert_eq!(decl.kind, DeclarationKind::Parameter);
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

mod chain;

pub use chain::{FrameKind, ScopeChain, ScopeFrame};

use crate::locator::{all_declarations, Declaration, DeclarationKind, TYPE_BODY_KINDS};
use crate::source::SourceFile;
use std::collections::HashMap;
use tree_sitter::Node;

/// Declarations of one file grouped by the scope node that owns them.
///
/// Building the index runs the declaration queries once; chains for many
/// nodes of the same file can then be computed without re-querying.
pub struct ScopeIndex<'tree> {
    by_scope: HashMap<usize, Vec<Declaration<'tree>>>,
}

impl<'tree> ScopeIndex<'tree> {
    /// Indexes every declaration in the file.
    pub fn build(file: &'tree SourceFile) -> Self {
        let mut by_scope: HashMap<usize, Vec<Declaration<'tree>>> = HashMap::new();
        for decl in all_declarations(file, file.root()) {
            by_scope.entry(decl.scope.id()).or_default().push(decl);
        }
        Self { by_scope }
    }

    /// Returns the declarations owned directly by `scope`, in source order.
    pub fn declarations_in(&self, scope: Node<'tree>) -> &[Declaration<'tree>] {
        self.by_scope
            .get(&scope.id())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Builds the scope chain visible from `node`.
    pub fn chain_at(&self, node: Node<'tree>) -> ScopeChain<'tree> {
        let position = node.start_byte();
        let mut frames = Vec::new();
        let mut current = node.parent();

        while let Some(ancestor) = current {
            if ancestor.kind() == "program" {
                break;
            }
            if let Some(kind) = FrameKind::for_node_kind(ancestor.kind()) {
                let declarations = self
                    .declarations_in(ancestor)
                    .iter()
                    .filter(|decl| is_visible_from(decl, position))
                    .copied()
                    .collect();
                frames.push(ScopeFrame {
                    kind,
                    node: ancestor,
                    declarations,
                });
            }
            current = ancestor.parent();
        }

        ScopeChain::new(frames)
    }
}

/// Locals and local classes are visible only after their declaration;
/// everything else is visible throughout its frame.
fn is_visible_from(decl: &Declaration<'_>, position: usize) -> bool {
    let local = decl.kind == DeclarationKind::LocalVariable || decl.kind.is_type();
    if local && !TYPE_BODY_KINDS.contains(&decl.scope.kind()) {
        decl.name.start_byte() <= position
    } else {
        true
    }
}

/// Builds the scope chain visible from `node`.
pub fn scope_chain_at<'tree>(file: &'tree SourceFile, node: Node<'tree>) -> ScopeChain<'tree> {
    ScopeIndex::build(file).chain_at(node)
}

/// Returns every declaration visible through `chain`, innermost first.
pub fn visible_declarations<'tree>(chain: &ScopeChain<'tree>) -> Vec<Declaration<'tree>> {
    chain.visible_declarations()
}
