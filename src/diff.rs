//! Unified diffs for previewing edits before they are saved.

use crate::source::SourceFile;
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::path::Path;

/// Generates a unified diff between two strings.
///
/// Empty when the texts are equal.
pub fn unified_diff(original: &str, modified: &str, path: &Path) -> String {
    if original == modified {
        return String::new();
    }
    let shown = path.display().to_string();
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{shown}"), &format!("b/{shown}"))
        .to_string()
}

/// Diff between two revisions of a file, labelled with its path.
pub fn file_diff(before: &SourceFile, after: &SourceFile) -> String {
    let path = after
        .path()
        .or(before.path())
        .unwrap_or(Path::new("<memory>"));
    unified_diff(before.text(), after.text(), path)
}

/// Line counts over one or more changed files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    /// Creates a summary from original and modified content.
    pub fn from_diff(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut insertions = 0;
        let mut deletions = 0;

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            files_changed: usize::from(insertions > 0 || deletions > 0),
            insertions,
            deletions,
        }
    }

    pub fn from_files(before: &SourceFile, after: &SourceFile) -> Self {
        Self::from_diff(before.text(), after.text())
    }

    /// Combines two summaries.
    pub fn merge(&mut self, other: &DiffSummary) {
        self.files_changed += other.files_changed;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) changed, {} insertions(+), {} deletions(-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}
