//! Owned (tree, text) pairs and the text edits applied to them.
//!
//! A [`SourceFile`] is immutable: every edit returns a freshly parsed file
//! with a bumped revision. Nodes borrowed from one revision can therefore
//! never be used against the text of another.

use crate::error::{RefactorError, Result};
use crate::lang::{Java, Language};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::trace;
use tree_sitter::{Node, Point, Tree};

/// A replacement of a byte range with new text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Byte range to replace.
    pub range: Range<usize>,
    /// New text.
    pub new_text: String,
}

impl TextEdit {
    /// Create a new text edit.
    pub fn new(range: Range<usize>, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    /// Create an edit that replaces the text of `node`.
    pub fn replace_node(node: Node<'_>, new_text: impl Into<String>) -> Self {
        Self::new(node.start_byte()..node.end_byte(), new_text)
    }

    /// Create an insertion edit.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset..offset, text)
    }

    /// Create a deletion edit.
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, String::new())
    }
}

/// A parsed Java source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Option<PathBuf>,
    text: String,
    tree: Tree,
    revision: u64,
}

impl SourceFile {
    /// Parses source text that has no associated path.
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let tree = Java.parse(&text)?;
        Ok(Self {
            path: None,
            text,
            tree,
            revision: 0,
        })
    }

    /// Reads and parses a file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(RefactorError::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path)?;
        let file = Self::parse(text).map_err(|e| match e {
            RefactorError::Parse { message, .. } => RefactorError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        Ok(file.with_path(path))
    }

    /// Associates a path with this file.
    ///
    /// The file stem is what public-type discovery matches against.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Writes the current text back to the associated path.
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| RefactorError::invalid_argument("source file has no path"))?;
        fs::write(path, &self.text)?;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Number of edits that produced this file from its first parse.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the source text covered by `node`.
    pub fn text_of(&self, node: Node<'_>) -> &str {
        self.text.get(node.start_byte()..node.end_byte()).unwrap_or("")
    }

    /// Returns the file name without its extension, if the file has a path.
    pub fn file_stem(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
    }

    /// Returns true if the parser had to recover from syntax errors.
    pub fn has_syntax_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Converts a 0-based line and byte column into a byte offset.
    pub fn offset_at(&self, line: usize, column: usize) -> Option<usize> {
        let mut offset = 0;
        for (index, content) in self.text.split_inclusive('\n').enumerate() {
            if index == line {
                let width = content.trim_end_matches(['\n', '\r']).len();
                return (column <= width).then_some(offset + column);
            }
            offset += content.len();
        }

        // A position on the empty line after a trailing newline.
        (line == self.text.matches('\n').count() && column == 0).then_some(self.text.len())
    }

    /// Converts a byte offset into a 0-based line and byte column.
    pub fn position_of(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let before = &self.text[..offset];
        let line = before.matches('\n').count();
        let column = before.rfind('\n').map(|i| offset - i - 1).unwrap_or(offset);
        (line, column)
    }

    /// Returns the smallest named node at a 0-based line and byte column.
    pub fn node_at(&self, line: usize, column: usize) -> Option<Node<'_>> {
        self.offset_at(line, column)?;
        let point = Point::new(line, column);
        self.root().named_descendant_for_point_range(point, point)
    }

    /// Replaces a byte range and reparses.
    pub fn replace(&self, range: Range<usize>, new_text: &str) -> Result<SourceFile> {
        self.apply_edits([TextEdit::new(range, new_text)])
    }

    /// Inserts text at a byte offset and reparses.
    pub fn insert(&self, offset: usize, text: &str) -> Result<SourceFile> {
        self.apply_edits([TextEdit::insert(offset, text)])
    }

    /// Applies a batch of edits in one pass and reparses once.
    ///
    /// Edits are applied from the highest start offset downward so that
    /// every range still refers to the original text when it is applied.
    /// Duplicate edits collapse into one; any other overlap is rejected.
    pub fn apply_edits(&self, edits: impl IntoIterator<Item = TextEdit>) -> Result<SourceFile> {
        let mut edits: Vec<TextEdit> = edits.into_iter().collect();
        for edit in &edits {
            self.check_range(&edit.range)?;
        }

        edits.sort_by(|a, b| {
            b.range
                .start
                .cmp(&a.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });
        edits.dedup();

        for pair in edits.windows(2) {
            let (later, earlier) = (&pair[0], &pair[1]);
            if earlier.range.end > later.range.start || earlier.range == later.range {
                return Err(RefactorError::OverlappingEdits {
                    first: earlier.range.clone(),
                    second: later.range.clone(),
                });
            }
        }

        let mut text = self.text.clone();
        for edit in &edits {
            trace!(start = edit.range.start, end = edit.range.end, "applying edit");
            text.replace_range(edit.range.clone(), &edit.new_text);
        }

        let tree = Java.parse(&text)?;
        Ok(SourceFile {
            path: self.path.clone(),
            text,
            tree,
            revision: self.revision + 1,
        })
    }

    fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end
            || range.end > self.text.len()
            || !self.text.is_char_boundary(range.start)
            || !self.text.is_char_boundary(range.end)
        {
            return Err(RefactorError::invalid_argument(format!(
                "edit range {range:?} is outside the source text (length {})",
                self.text.len()
            )));
        }
        Ok(())
    }
}

/// Returns the nearest strict ancestor of `node` whose kind is in `kinds`.
pub fn enclosing<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Returns true if `inner` lies within `outer`'s byte range.
pub fn is_within(inner: Node<'_>, outer: Node<'_>) -> bool {
    inner.start_byte() >= outer.start_byte() && inner.end_byte() <= outer.end_byte()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_text_of() {
        let file = SourceFile::parse("class A { int x; }").unwrap();
        let class = file.root().named_child(0).unwrap();
        assert_eq!(class.kind(), "class_declaration");
        assert_eq!(file.text_of(class), "class A { int x; }");
        assert_eq!(file.revision(), 0);
        assert!(!file.has_syntax_errors());
    }

    #[test]
    fn test_file_stem() {
        let file = SourceFile::parse("class A {}").unwrap();
        assert_eq!(file.file_stem(), None);

        let file = file.with_path("src/com/acme/Account.java");
        assert_eq!(file.file_stem(), Some("Account"));
    }

    #[test]
    fn test_replace_returns_new_revision() {
        let file = SourceFile::parse("class A {}").unwrap();
        let edited = file.replace(6..7, "Bee").unwrap();

        assert_eq!(edited.text(), "class Bee {}");
        assert_eq!(edited.revision(), 1);
        assert_eq!(file.text(), "class A {}");
    }

    #[test]
    fn test_apply_edits_descending() {
        let file = SourceFile::parse("class A { int a; int b; }").unwrap();
        let edited = file
            .apply_edits([
                TextEdit::new(14..15, "first"),
                TextEdit::new(21..22, "second"),
            ])
            .unwrap();

        assert_eq!(edited.text(), "class A { int first; int second; }");
    }

    #[test]
    fn test_apply_edits_dedups_identical() {
        let file = SourceFile::parse("class A {}").unwrap();
        let edited = file
            .apply_edits([TextEdit::new(6..7, "B"), TextEdit::new(6..7, "B")])
            .unwrap();
        assert_eq!(edited.text(), "class B {}");
    }

    #[test]
    fn test_apply_edits_rejects_overlap() {
        let file = SourceFile::parse("class A {}").unwrap();
        let result = file.apply_edits([TextEdit::new(0..7, "x"), TextEdit::new(6..8, "y")]);
        assert!(matches!(result, Err(RefactorError::OverlappingEdits { .. })));
    }

    #[test]
    fn test_replace_out_of_range() {
        let file = SourceFile::parse("class A {}").unwrap();
        assert!(matches!(
            file.replace(5..100, "x"),
            Err(RefactorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_positions() {
        let file = SourceFile::parse("class A {\n    int x;\n}\n").unwrap();
        assert_eq!(file.offset_at(1, 4), Some(14));
        assert_eq!(file.position_of(14), (1, 4));
        assert_eq!(file.offset_at(1, 40), None);

        let node = file.node_at(1, 8).unwrap();
        assert_eq!(node.kind(), "identifier");
        assert_eq!(file.text_of(node), "x");
    }

    #[test]
    fn test_enclosing_and_within() {
        let file = SourceFile::parse("class A { void m() { int x = 1; } }").unwrap();
        let node = file.node_at(0, 25).unwrap();
        assert_eq!(file.text_of(node), "x");

        let method = enclosing(node, &["method_declaration"]).unwrap();
        assert!(is_within(node, method));
        assert!(enclosing(node, &["interface_declaration"]).is_none());
    }

    #[test]
    fn test_save_without_path() {
        let file = SourceFile::parse("class A {}").unwrap();
        assert!(file.save().is_err());
    }
}
