//! # Java Refactor
//!
//! Structural code intelligence for Java sources, built on tree-sitter.
//!
//! This crate provides:
//! - Declaration lookup by kind and name, with typed captures of each part
//! - Lexical scope chains and best-effort static types for names and receivers
//! - Usage finding that respects shadowing and receiver types
//! - Scope-safe renames, within one file or looped over many
//! - Member insertion points, annotation lookup and insertion, and import management
//!
//! Every operation takes the current [`SourceFile`] explicitly. Edits return
//! a new file rather than mutating the old one, so nodes found in one
//! revision can never be used against the text of another.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse(r#"
//! class Report {
//!     private Calculator calc;
//!     int total() { return calc.calculateSum(1, 2); }
//! }
//! "#)?;
//!
//! // Rename calls made on Calculator-typed receivers only
//! let renamed = rename::rename_method_calls(&file, "calculateSum", "Calculator", "add")?;
//! assert!(renamed.unwrap().file.text().contains("calc.add(1, 2)"));
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```
//!
//! ## Scopes and Usages
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("class A { int n; void m(int n) { use(n); } }")?;
//! let field = locator::find_declaration(&file, file.root(), DeclarationKind::Field, "n").unwrap();
//!
//! // The parameter shadows the field, so the field is unused.
//! assert!(usage::find_usages(&file, &field, field.scope).is_empty());
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```
//!
//! ## Batch Operations
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let files = Workspace::new("./src").load()?;
//! let request = RenameRequest::method_calls("calculateSum", "Calculator", "add");
//! for outcome in rename::rename_across(&files, &request) {
//!     if let Some(file) = outcome.file {
//!         file.save()?;
//!     }
//! }
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

pub mod annotations;
pub mod config;
pub mod diff;
pub mod edit;
pub mod error;
pub mod imports;
pub mod lang;
pub mod locator;
pub mod naming;
pub mod query;
pub mod rename;
pub mod scope;
pub mod source;
pub mod types;
pub mod usage;
pub mod workspace;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::edit::{
        AnchorKind, AnnotationInsertionPoint, AnnotationPlacement, FieldSpec, InsertionPoint,
        Visibility,
    };
    pub use crate::error::{RefactorError, Result};
    pub use crate::imports::ImportEntry;
    pub use crate::lang::{Java, Language};
    pub use crate::locator::{
        AnnotationArgument, AnnotationCapture, Capture, Declaration, DeclarationKind,
    };
    pub use crate::query::{CaptureMap, PatternQuery};
    pub use crate::rename::{RenameOptions, RenameRequest, Renamed};
    pub use crate::scope::{ScopeChain, ScopeIndex};
    pub use crate::source::{SourceFile, TextEdit};
    pub use crate::types::{ResolvedType, TypeResolver};
    pub use crate::usage::{ReferenceKind, UsageFinder, UsageOptions, UsageSite};
    pub use crate::workspace::Workspace;
    pub use crate::{annotations, edit, imports, locator, naming, rename, scope, types, usage};
}

pub use prelude::*;
