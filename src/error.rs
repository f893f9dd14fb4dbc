//! Error types for the Java refactoring engine.
//!
//! Only caller-input violations and I/O, parse or configuration failures
//! surface here. Structural mismatches (a node of the wrong kind, a name
//! that is not declared, a capture that did not match) are reported as
//! empty collections, `None` or `false` by the operations themselves.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for refactoring operations.
#[derive(Error, Debug)]
pub enum RefactorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Tree-sitter parse error for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Tree-sitter query error: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Insertion point computed at revision {computed} used against revision {current}")]
    StaleInsertionPoint { computed: u64, current: u64 },

    #[error("Overlapping edits at {first:?} and {second:?}")]
    OverlappingEdits {
        first: std::ops::Range<usize>,
        second: std::ops::Range<usize>,
    },
}

impl RefactorError {
    /// Shorthand for an [`RefactorError::InvalidArgument`] error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// A specialized Result type for refactoring operations.
pub type Result<T> = std::result::Result<T, RefactorError>;
