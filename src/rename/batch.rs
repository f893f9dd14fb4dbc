//! Renames applied across caller-supplied files.

use super::{rename_class_references_with, rename_method_calls, RenameOptions, Renamed};
use crate::error::Result;
use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// What a cross-file rename rewrites in each file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenameTarget {
    /// Calls to a method on receivers of a given static type.
    MethodCalls {
        method_name: String,
        receiver_type: String,
    },
    /// Imports of and references to a type.
    ClassReferences {
        class_name: String,
        package: Option<String>,
    },
}

/// A rename to apply to each of a set of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub target: RenameTarget,
    pub new_name: String,
    #[serde(default)]
    pub options: RenameOptions,
}

impl RenameRequest {
    pub fn method_calls(
        method_name: impl Into<String>,
        receiver_type: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            target: RenameTarget::MethodCalls {
                method_name: method_name.into(),
                receiver_type: receiver_type.into(),
            },
            new_name: new_name.into(),
            options: RenameOptions::default(),
        }
    }

    pub fn class_references(
        class_name: impl Into<String>,
        package: Option<&str>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            target: RenameTarget::ClassReferences {
                class_name: class_name.into(),
                package: package.map(str::to_string),
            },
            new_name: new_name.into(),
            options: RenameOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenameOptions) -> Self {
        self.options = options;
        self
    }

    /// Applies the request to one file.
    pub fn apply(&self, file: &SourceFile) -> Result<Option<Renamed>> {
        match &self.target {
            RenameTarget::MethodCalls {
                method_name,
                receiver_type,
            } => rename_method_calls(file, method_name, receiver_type, &self.new_name),
            RenameTarget::ClassReferences {
                class_name,
                package,
            } => rename_class_references_with(
                file,
                class_name,
                &self.new_name,
                package.as_deref(),
                &self.options,
            ),
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The text changed.
    Changed,
    /// Nothing in the file matched.
    Unchanged,
    /// The rename failed; the file is untouched.
    Failed(String),
}

/// Outcome for one file of a cross-file rename.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: Option<PathBuf>,
    pub status: FileStatus,
    pub sites: usize,
    /// The rewritten file, for [`FileStatus::Changed`].
    pub file: Option<SourceFile>,
}

impl FileOutcome {
    pub fn is_changed(&self) -> bool {
        self.status == FileStatus::Changed
    }
}

/// Totals over a cross-file rename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSummary {
    pub total_files: usize,
    pub changed_files: usize,
    pub unchanged_files: usize,
    pub failed_files: usize,
    pub total_sites: usize,
}

impl RenameSummary {
    pub fn from_outcomes(outcomes: &[FileOutcome]) -> Self {
        let mut summary = Self {
            total_files: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match &outcome.status {
                FileStatus::Changed => {
                    summary.changed_files += 1;
                    summary.total_sites += outcome.sites;
                }
                FileStatus::Unchanged => summary.unchanged_files += 1,
                FileStatus::Failed(_) => summary.failed_files += 1,
            }
        }
        summary
    }
}

/// Applies `request` to every file, in order.
///
/// Each file is independent: a failure is recorded in that file's outcome
/// and the loop carries on. Nothing is written to disk.
pub fn rename_across(files: &[SourceFile], request: &RenameRequest) -> Vec<FileOutcome> {
    files
        .iter()
        .map(|file| {
            let path = file.path().map(PathBuf::from);
            match request.apply(file) {
                Ok(Some(renamed)) if renamed.file.text() != file.text() => {
                    debug!(path = ?path, sites = renamed.sites, "file renamed");
                    FileOutcome {
                        path,
                        status: FileStatus::Changed,
                        sites: renamed.sites,
                        file: Some(renamed.file),
                    }
                }
                Ok(_) => FileOutcome {
                    path,
                    status: FileStatus::Unchanged,
                    sites: 0,
                    file: None,
                },
                Err(e) => {
                    warn!(path = ?path, error = %e, "rename failed");
                    FileOutcome {
                        path,
                        status: FileStatus::Failed(e.to_string()),
                        sites: 0,
                        file: None,
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(path: &str, body: &str) -> SourceFile {
        SourceFile::parse(format!("import com.acme.Calculator;\nclass Caller {{ {body} }}"))
            .unwrap()
            .with_path(path)
    }

    #[test]
    fn test_rename_method_across_files() {
        let files = vec![
            caller("A.java", "Calculator calc; void m() { calc.calculateSum(1, 2); }"),
            caller("B.java", "Printer calc; void m() { calc.calculateSum(1, 2); }"),
            caller("C.java", "void m() {}"),
        ];
        let request = RenameRequest::method_calls("calculateSum", "Calculator", "add");
        let outcomes = rename_across(&files, &request);

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_changed());
        assert!(outcomes[0].file.as_ref().unwrap().text().contains("calc.add(1, 2)"));
        assert_eq!(outcomes[1].status, FileStatus::Unchanged);
        assert_eq!(outcomes[2].status, FileStatus::Unchanged);

        let summary = RenameSummary::from_outcomes(&outcomes);
        assert_eq!(summary.changed_files, 1);
        assert_eq!(summary.unchanged_files, 2);
        assert_eq!(summary.total_sites, 1);
    }

    #[test]
    fn test_failures_do_not_stop_the_loop() {
        let files = vec![
            caller("A.java", "Calculator calc; void m() { calc.calculateSum(1, 2); }"),
            caller("B.java", "Calculator calc; void m() { calc.calculateSum(3, 4); }"),
        ];
        let request = RenameRequest::method_calls("calculateSum", "Calculator", "not valid");
        let outcomes = rename_across(&files, &request);

        assert!(outcomes.iter().all(|o| matches!(o.status, FileStatus::Failed(_))));
        assert_eq!(RenameSummary::from_outcomes(&outcomes).failed_files, 2);
    }

    #[test]
    fn test_class_references_request() {
        let files = vec![caller("A.java", "Calculator calculator; Calculator calc;")];
        let request = RenameRequest::class_references("Calculator", Some("com.acme"), "Adder");
        let outcomes = rename_across(&files, &request);

        let text = outcomes[0].file.as_ref().unwrap().text().to_string();
        assert!(text.starts_with("import com.acme.Adder;"));
        assert!(text.contains("Adder adder; Adder calc;"));
        assert_eq!(outcomes[0].path, Some(PathBuf::from("A.java")));
    }
}
