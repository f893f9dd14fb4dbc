//! Scope-safe renaming within one file.
//!
//! A rename collects the declaration's name and every usage site into one
//! batch of [`TextEdit`]s and applies them in a single pass, so all offsets
//! refer to the same revision. Renaming across files is a loop over this
//! primitive; see [`rename_across`].
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("class A { int count; int next() { return count + 1; } }")?;
//! let field = locator::find_declaration(&file, file.root(), DeclarationKind::Field, "count").unwrap();
//! let renamed = rename::rename(&file, field.name, "total")?.unwrap();
//! assert_eq!(renamed.file.text(), "class A { int total; int next() { return total + 1; } }");
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

mod batch;
mod class;

pub use batch::{rename_across, FileOutcome, FileStatus, RenameRequest, RenameSummary, RenameTarget};
pub use class::{
    rename_class, rename_class_references, rename_class_references_with, rename_class_with,
    suggested_path,
};

use crate::error::{RefactorError, Result};
use crate::lang::Java;
use crate::locator::declaration_at;
use crate::source::{SourceFile, TextEdit};
use crate::usage::{UsageFinder, UsageOptions};
use serde::{Deserialize, Serialize};
use std::iter;
use tracing::debug;
use tree_sitter::Node;

/// The outcome of a rename that changed (or deliberately kept) the text.
#[derive(Debug, Clone)]
pub struct Renamed {
    /// The file after the rename.
    pub file: SourceFile,
    /// Usage sites rewritten, not counting the declaration itself.
    pub sites: usize,
    /// Variables renamed along with a type, as `(old, new)` pairs.
    pub renamed_variables: Vec<(String, String)>,
}

impl Renamed {
    fn unchanged(file: &SourceFile) -> Self {
        Self {
            file: file.clone(),
            sites: 0,
            renamed_variables: Vec::new(),
        }
    }
}

/// Knobs for rename operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOptions {
    #[serde(default)]
    pub usage: UsageOptions,
    /// Rename variables named after a renamed type (`order` for `Order`).
    #[serde(default = "default_follow_naming")]
    pub follow_naming: bool,
}

fn default_follow_naming() -> bool {
    true
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            usage: UsageOptions::default(),
            follow_naming: true,
        }
    }
}

/// Renames the declaration at `node` and its usages in this file.
///
/// `node` may be the declaration's name, its declarator or the declaration
/// itself. Returns `Ok(None)` without touching the file for an empty name,
/// a node that declares nothing, imports and constructors.
pub fn rename(file: &SourceFile, node: Node<'_>, new_name: &str) -> Result<Option<Renamed>> {
    rename_with(file, node, new_name, &RenameOptions::default())
}

/// [`rename`] with explicit options.
pub fn rename_with(
    file: &SourceFile,
    node: Node<'_>,
    new_name: &str,
    options: &RenameOptions,
) -> Result<Option<Renamed>> {
    if new_name.is_empty() {
        debug!("rename skipped: empty name");
        return Ok(None);
    }
    let Some(decl) = declaration_at(file, node) else {
        debug!(kind = node.kind(), "rename skipped: not a declaration");
        return Ok(None);
    };
    if !decl.kind.is_renamable() || decl.node.kind() == "constructor_declaration" {
        debug!(kind = %decl.kind, "rename skipped: kind is not renamable");
        return Ok(None);
    }
    validate_identifier(new_name)?;

    if decl.kind.is_type() {
        return class::rename_type(file, &decl, new_name, options).map(Some);
    }

    let old_name = decl.name_text(file);
    if old_name == new_name {
        return Ok(Some(Renamed::unchanged(file)));
    }

    let finder = UsageFinder::new(file).with_options(options.usage);
    let sites = finder.find_usages(&decl, decl.scope);
    let edits = iter::once(TextEdit::replace_node(decl.name, new_name))
        .chain(sites.iter().map(|site| TextEdit::replace_node(site.reference, new_name)));
    let renamed = file.apply_edits(edits)?;

    debug!(from = old_name, to = new_name, kind = %decl.kind, sites = sites.len(), "renamed");
    Ok(Some(Renamed {
        file: renamed,
        sites: sites.len(),
        renamed_variables: Vec::new(),
    }))
}

/// Renames the calls to `method_name` made on receivers of type `receiver_type`.
///
/// Used on caller files when the method's declaration lives elsewhere.
/// Returns `Ok(None)` when the file has no matching call.
pub fn rename_method_calls(
    file: &SourceFile,
    method_name: &str,
    receiver_type: &str,
    new_name: &str,
) -> Result<Option<Renamed>> {
    if method_name.is_empty() || receiver_type.is_empty() || new_name.is_empty() {
        return Ok(None);
    }
    validate_identifier(new_name)?;
    if method_name == new_name {
        return Ok(Some(Renamed::unchanged(file)));
    }

    let sites = UsageFinder::new(file).find_method_calls(method_name, receiver_type, file.root());
    if sites.is_empty() {
        return Ok(None);
    }

    let renamed = file.apply_edits(
        sites
            .iter()
            .map(|site| TextEdit::replace_node(site.reference, new_name)),
    )?;
    debug!(
        from = method_name,
        to = new_name,
        receiver_type,
        sites = sites.len(),
        "renamed method calls"
    );
    Ok(Some(Renamed {
        file: renamed,
        sites: sites.len(),
        renamed_variables: Vec::new(),
    }))
}

pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    if Java::is_identifier(name) {
        Ok(())
    } else {
        Err(RefactorError::invalid_argument(format!(
            "{name:?} is not a valid Java identifier"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{find_declaration, DeclarationKind};

    #[test]
    fn test_rename_field_and_usages() {
        let source = "class A { private int count; void inc() { count++; this.count += 2; } }";
        let file = SourceFile::parse(source).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "count").unwrap();

        let renamed = rename(&file, field.name, "total").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class A { private int total; void inc() { total++; this.total += 2; } }"
        );
        assert_eq!(renamed.sites, 2);
        assert_eq!(renamed.file.revision(), file.revision() + 1);
    }

    #[test]
    fn test_rename_field_keeps_annotation_keys() {
        let source = r#"@Entity class User { @Column(name = "user_name") private String name; String get() { return name; } }"#;
        let file = SourceFile::parse(source).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "name").unwrap();

        let renamed = rename(&file, field.name, "fullName").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            r#"@Entity class User { @Column(name = "user_name") private String fullName; String get() { return fullName; } }"#
        );
        assert_eq!(renamed.sites, 1);
    }

    #[test]
    fn test_rename_field_leaves_pattern_variable() {
        let source = "class A { Object f; void m(Object o) { if (o instanceof String f) { use(f); } use(f); } }";
        let file = SourceFile::parse(source).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "f").unwrap();

        let renamed = rename(&file, field.name, "g").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class A { Object g; void m(Object o) { if (o instanceof String f) { use(f); } use(g); } }"
        );

        let pattern =
            find_declaration(&file, file.root(), DeclarationKind::LocalVariable, "f").unwrap();
        let renamed = rename(&file, pattern.name, "text").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class A { Object f; void m(Object o) { if (o instanceof String text) { use(text); } use(f); } }"
        );
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let source = "class A { private int count; int get() { return count; } }";
        let file = SourceFile::parse(source).unwrap();
        let field = find_declaration(&file, file.root(), DeclarationKind::Field, "count").unwrap();

        let renamed = rename(&file, field.name, "count").unwrap().unwrap();
        assert_eq!(renamed.file.text(), source);
    }

    #[test]
    fn test_rename_to_existing_name_still_succeeds() {
        let source = "class A { int a; int b; int sum() { return a + b; } }";
        let file = SourceFile::parse(source).unwrap();
        let a = find_declaration(&file, file.root(), DeclarationKind::Field, "a").unwrap();

        let renamed = rename(&file, a.name, "b").unwrap().unwrap();
        assert_eq!(renamed.file.text(), "class A { int b; int b; int sum() { return b + b; } }");
    }

    #[test]
    fn test_rename_one_declarator() {
        let source = "class C { private int x, y; int f() { return x * y; } }";
        let file = SourceFile::parse(source).unwrap();
        let y = find_declaration(&file, file.root(), DeclarationKind::Field, "y").unwrap();

        let renamed = rename(&file, y.declarator.unwrap(), "height").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class C { private int x, height; int f() { return x * height; } }"
        );
    }

    #[test]
    fn test_rename_local_leaves_field() {
        let source = "class A { int n; void m() { int n = 1; use(n); } void k() { use(n); } }";
        let file = SourceFile::parse(source).unwrap();
        let local = find_declaration(&file, file.root(), DeclarationKind::LocalVariable, "n").unwrap();

        let renamed = rename(&file, local.name, "size").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class A { int n; void m() { int size = 1; use(size); } void k() { use(n); } }"
        );
    }

    #[test]
    fn test_rename_parameter() {
        let source = "class A { int twice(int v) { return v + v; } int v() { return 0; } }";
        let file = SourceFile::parse(source).unwrap();
        let param = find_declaration(&file, file.root(), DeclarationKind::Parameter, "v").unwrap();

        let renamed = rename(&file, param.node, "value").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class A { int twice(int value) { return value + value; } int v() { return 0; } }"
        );
    }

    #[test]
    fn test_rename_method() {
        let source = "class Calc { int sum(int a) { return a; } int go() { return sum(1) + this.sum(2); } }";
        let file = SourceFile::parse(source).unwrap();
        let method = find_declaration(&file, file.root(), DeclarationKind::Method, "sum").unwrap();

        let renamed = rename(&file, method.name, "add").unwrap().unwrap();
        assert_eq!(
            renamed.file.text(),
            "class Calc { int add(int a) { return a; } int go() { return add(1) + this.add(2); } }"
        );
    }

    #[test]
    fn test_rename_refusals() {
        let file = SourceFile::parse("import java.util.List;\nclass A { A() {} int x; }").unwrap();
        let x = find_declaration(&file, file.root(), DeclarationKind::Field, "x").unwrap();
        assert!(rename(&file, x.name, "").unwrap().is_none());

        let import = find_declaration(&file, file.root(), DeclarationKind::Import, "List").unwrap();
        assert!(rename(&file, import.node, "Other").unwrap().is_none());

        let ctor = find_declaration(&file, file.root(), DeclarationKind::Method, "A").unwrap();
        assert!(rename(&file, ctor.node, "B").unwrap().is_none());

        // The class body is not a declaration.
        let body = crate::locator::find_class_by_name(&file, "A")
            .and_then(crate::locator::type_body)
            .unwrap();
        assert!(rename(&file, body, "y").unwrap().is_none());

        assert!(matches!(
            rename(&file, x.name, "class"),
            Err(RefactorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rename_method_calls_by_receiver_type() {
        let source = r#"
class Report {
    private Calculator calc;
    private Printer printer;
    void run() {
        calc.calculateSum(1, 2);
        printer.calculateSum(3, 4);
    }
}
"#;
        let file = SourceFile::parse(source).unwrap();
        let renamed = rename_method_calls(&file, "calculateSum", "Calculator", "add")
            .unwrap()
            .unwrap();
        assert!(renamed.file.text().contains("calc.add(1, 2);"));
        assert!(renamed.file.text().contains("printer.calculateSum(3, 4);"));
        assert_eq!(renamed.sites, 1);

        assert!(rename_method_calls(&file, "missing", "Calculator", "add")
            .unwrap()
            .is_none());
    }
}
