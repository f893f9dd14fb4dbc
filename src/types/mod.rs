//! Best-effort static types for names and expressions.
//!
//! Types are resolved by scope search only: a name's type is the declared
//! type of the nearest local, parameter or field with that name. Nothing
//! is looked up on disk and imports are only used to attach a package to
//! an explicitly imported simple name.

mod basic;
mod resolve;

pub use basic::BasicType;
pub use resolve::{
    resolve_declaration_type, resolve_object_type, resolve_receiver_type, resolve_type_node,
    TypeResolver,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a type reference was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionKind {
    /// No declaration found; the base name is the literal text.
    Unresolved,
    /// A primitive such as `int` or `boolean`.
    Primitive,
    /// A named reference type, declared in this package or imported.
    SamePackageOrImported,
}

/// A structured, best-effort static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    /// Type name as written, without generic arguments or array brackets.
    pub base_name: String,
    /// Generic arguments in order; empty for raw and non-generic types.
    pub type_arguments: Vec<ResolvedType>,
    /// Number of `[]` pairs.
    pub array_rank: usize,
    pub kind: ResolutionKind,
    /// Package of an explicitly imported type.
    pub package: Option<String>,
}

impl ResolvedType {
    fn with_kind(base_name: impl Into<String>, kind: ResolutionKind) -> Self {
        Self {
            base_name: base_name.into(),
            type_arguments: Vec::new(),
            array_rank: 0,
            kind,
            package: None,
        }
    }

    /// A type whose name could not be resolved; `text` is kept as the base name.
    pub fn unresolved(text: impl Into<String>) -> Self {
        Self::with_kind(text, ResolutionKind::Unresolved)
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self::with_kind(name, ResolutionKind::Primitive)
    }

    /// A named reference type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::with_kind(name, ResolutionKind::SamePackageOrImported)
    }

    /// Set the generic arguments.
    pub fn with_arguments(mut self, arguments: Vec<ResolvedType>) -> Self {
        self.type_arguments = arguments;
        self
    }

    /// Set the array rank.
    pub fn with_array_rank(mut self, rank: usize) -> Self {
        self.array_rank = rank;
        self
    }

    /// Set the package.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == ResolutionKind::Primitive
    }

    pub fn is_resolved(&self) -> bool {
        self.kind != ResolutionKind::Unresolved
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// Last segment of a qualified base name (`java.util.List` -> `List`).
    pub fn simple_name(&self) -> &str {
        simple_name(&self.base_name)
    }

    /// Fully qualified name when the package is known.
    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(package) => format!("{package}.{}", self.simple_name()),
            None => self.base_name.clone(),
        }
    }

    /// The element type of an array, or the type itself.
    pub fn element_type(&self) -> ResolvedType {
        self.clone().with_array_rank(0)
    }

    /// Compares base names only; generic arguments and array rank are ignored.
    ///
    /// A qualified name on either side matches on its simple name.
    pub fn matches(&self, type_name: &str) -> bool {
        !type_name.is_empty()
            && (self.base_name == type_name || self.simple_name() == simple_name(type_name))
    }

    /// Compares base names, generic arguments and array rank.
    pub fn exact_matches(&self, other: &ResolvedType) -> bool {
        self.matches(&other.base_name)
            && self.array_rank == other.array_rank
            && self.type_arguments.len() == other.type_arguments.len()
            && self
                .type_arguments
                .iter()
                .zip(&other.type_arguments)
                .all(|(a, b)| a.exact_matches(b))
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_name)?;
        if !self.type_arguments.is_empty() {
            let arguments: Vec<String> = self.type_arguments.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", arguments.join(", "))?;
        }
        for _ in 0..self.array_rank {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
