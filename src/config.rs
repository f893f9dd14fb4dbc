//! Engine settings, loadable from YAML or JSON.

use crate::edit::DEFAULT_INDENT;
use crate::error::{RefactorError, Result};
use crate::rename::RenameOptions;
use crate::usage::UsageOptions;
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings shared by the CLI and batch operations.
///
/// # Example YAML
///
/// ```yaml
/// indent: "  "
/// strict_nested_scopes: true
/// follow_naming: false
/// exclude:
///   - "**/generated/**"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Indent unit for generated members when a body has none to copy.
    pub indent: String,

    /// Only count `this.name` inside the declaring type as a field usage.
    pub strict_nested_scopes: bool,

    /// Glob patterns, relative to the workspace root, to leave alone.
    pub exclude: Vec<String>,

    /// Rename variables named after a type when the type is renamed.
    pub follow_naming: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            strict_nested_scopes: false,
            exclude: Vec::new(),
            follow_naming: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_nested_scopes = true;
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn without_naming(mut self) -> Self {
        self.follow_naming = false;
        self
    }

    /// Load config from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = read(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            RefactorError::InvalidConfig(format!("Failed to parse YAML config: {e}"))
        })?;
        config.validated()
    }

    /// Load config from a JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = read(path.as_ref())?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            RefactorError::InvalidConfig(format!("Failed to parse JSON config: {e}"))
        })?;
        config.validated()
    }

    /// Load config by file extension: `.json` as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(path),
            _ => Self::from_yaml(path),
        }
    }

    /// Save config to a YAML file.
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| {
            RefactorError::InvalidConfig(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    pub fn usage_options(&self) -> UsageOptions {
        UsageOptions {
            strict_nested_scopes: self.strict_nested_scopes,
        }
    }

    pub fn rename_options(&self) -> RenameOptions {
        RenameOptions {
            usage: self.usage_options(),
            follow_naming: self.follow_naming,
        }
    }

    /// A workspace at `root` honouring the configured excludes.
    pub fn workspace(&self, root: impl Into<PathBuf>) -> Workspace {
        Workspace::new(root).exclude_all(self.exclude.iter().cloned())
    }

    fn validated(self) -> Result<Self> {
        if self.indent.is_empty() || !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(RefactorError::InvalidConfig(format!(
                "indent must be spaces or tabs, got {:?}",
                self.indent
            )));
        }
        Ok(self)
    }
}

fn read(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RefactorError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|e| {
        RefactorError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read config file: {e}"),
        ))
    })
}
