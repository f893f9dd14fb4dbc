//! Usage finding.
//!
//! Unqualified references are matched by identity: an identifier only
//! counts if resolving its name at its own position leads back to the
//! declaration being searched. Qualified references (`calc.add()`,
//! `order.total`) are matched by resolving the receiver's static type and
//! comparing its base name with the owning type. `Owner.member` resolves
//! to nothing and is therefore matched on the literal class name.
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("class A { int n; void m() { n++; this.n = 2; } }")?;
//! let field = locator::find_declaration(&file, file.root(), DeclarationKind::Field, "n").unwrap();
//! let sites = usage::find_usages(&file, &field, field.scope);
//! assert_eq!(sites.len(), 2);
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

mod finder;

pub use finder::UsageFinder;

use crate::locator::Declaration;
use crate::source::SourceFile;
use crate::types::ResolvedType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tree_sitter::Node;

/// How a usage site refers to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Reading a value.
    Read,
    /// Assigning or incrementing a value.
    Write,
    /// Calling or referencing a method.
    Call,
    /// Naming a type.
    Type,
}

impl ReferenceKind {
    /// Returns true if this reference mutates the value.
    pub fn is_mutation(&self) -> bool {
        matches!(self, ReferenceKind::Write)
    }
}

/// One syntactic reference to a declaration.
///
/// Borrows from the file it was found in and is invalid after any edit.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSite<'tree> {
    /// The identifier to rewrite on rename.
    pub reference: Node<'tree>,
    /// Receiver expression of a qualified reference.
    pub receiver: Option<Node<'tree>>,
    /// Static type of the receiver, when one was resolved.
    pub receiver_type: Option<ResolvedType>,
    pub kind: ReferenceKind,
}

impl<'tree> UsageSite<'tree> {
    pub(crate) fn unqualified(reference: Node<'tree>, kind: ReferenceKind) -> Self {
        Self {
            reference,
            receiver: None,
            receiver_type: None,
            kind,
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Knobs for usage finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageOptions {
    /// Drop `this.x` field references made from inside a nested type.
    ///
    /// Off by default: `this.x` is then matched on the name alone, so a
    /// search for an outer field also reports a nested type's own field of
    /// the same name.
    #[serde(default)]
    pub strict_nested_scopes: bool,
}

impl UsageOptions {
    pub fn strict() -> Self {
        Self {
            strict_nested_scopes: true,
        }
    }
}

/// Counts of usage sites, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub name: String,
    pub usage_count: usize,
    pub by_kind: BTreeMap<ReferenceKind, usize>,
    pub is_unused: bool,
}

impl UsageSummary {
    pub fn new(name: impl Into<String>, sites: &[UsageSite<'_>]) -> Self {
        let mut by_kind = BTreeMap::new();
        for site in sites {
            *by_kind.entry(site.kind).or_insert(0) += 1;
        }
        Self {
            name: name.into(),
            usage_count: sites.len(),
            by_kind,
            is_unused: sites.is_empty(),
        }
    }
}

/// Finds the usages of `decl` within `scope`.
pub fn find_usages<'tree>(
    file: &'tree SourceFile,
    decl: &Declaration<'tree>,
    scope: Node<'tree>,
) -> Vec<UsageSite<'tree>> {
    UsageFinder::new(file).find_usages(decl, scope)
}

/// Finds calls to `method_name` whose receiver has the static type `receiver_type`.
pub fn find_method_calls<'tree>(
    file: &'tree SourceFile,
    method_name: &str,
    receiver_type: &str,
    scope: Node<'tree>,
) -> Vec<UsageSite<'tree>> {
    UsageFinder::new(file).find_method_calls(method_name, receiver_type, scope)
}

/// Finds every reference to the type named `type_name` within `scope`.
pub fn find_type_references<'tree>(
    file: &'tree SourceFile,
    type_name: &str,
    scope: Node<'tree>,
) -> Vec<UsageSite<'tree>> {
    UsageFinder::new(file).find_type_references(type_name, scope)
}
