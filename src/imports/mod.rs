//! Import lookup, insertion and rewriting.
//!
//! A wildcard import (`import java.util.*;`) makes every class of its
//! package visible, so [`is_imported`] accepts it and [`add_import`] will
//! not add an explicit import beside it. Renames only ever touch explicit
//! imports.
//!
//! ```rust,no_run
//! use java_refactor::prelude::*;
//!
//! let file = SourceFile::parse("package app;\n\nclass A {}")?;
//! let file = imports::add_import(&file, "java.util", "List")?;
//! assert!(imports::is_imported(&file, "java.util", "List"));
//! # Ok::<(), java_refactor::error::RefactorError>(())
//! ```

use crate::error::{RefactorError, Result};
use crate::locator::{
    find_all_declarations, package_declaration, strip_whitespace, Capture, DeclarationKind,
};
use crate::source::{SourceFile, TextEdit};
use tracing::debug;
use tree_sitter::Node;

/// One import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry<'tree> {
    /// Package path; for a static import, the owning class path.
    pub package: String,
    /// Imported class or member; `None` for a wildcard.
    pub class_name: Option<String>,
    pub is_static: bool,
    /// The `import_declaration` node.
    pub node: Node<'tree>,
    /// The dotted name as written, without `.*`.
    pub path: Node<'tree>,
}

impl ImportEntry<'_> {
    pub fn is_wildcard(&self) -> bool {
        self.class_name.is_none()
    }

    /// Returns true for an explicit, non-static import of `package.class_name`.
    pub fn is_explicit(&self, package: &str, class_name: &str) -> bool {
        !self.is_static
            && self.package == package
            && self.class_name.as_deref() == Some(class_name)
    }

    /// Returns true for a non-static wildcard import of `package`.
    pub fn is_wildcard_for(&self, package: &str) -> bool {
        !self.is_static && self.is_wildcard() && self.package == package
    }

    /// The imported name as written (`java.util.List`, `java.util.*`).
    pub fn full_name(&self) -> String {
        match &self.class_name {
            Some(class_name) if self.package.is_empty() => class_name.clone(),
            Some(class_name) => format!("{}.{class_name}", self.package),
            None => format!("{}.*", self.package),
        }
    }
}

/// Returns every import of the file in source order.
pub fn imports(file: &SourceFile) -> Vec<ImportEntry<'_>> {
    find_all_declarations(file, file.root(), DeclarationKind::Import)
        .into_iter()
        .flat_map(|decl| crate::locator::decompose(file, decl.node))
        .filter_map(|capture| match capture {
            Capture::Import(import) => Some(import),
            _ => None,
        })
        .map(|import| {
            let text = |node: Option<Node<'_>>| node.map(|n| strip_whitespace(file.text_of(n)));
            ImportEntry {
                package: text(import.package).unwrap_or_default(),
                class_name: if import.is_wildcard {
                    None
                } else {
                    text(import.class_name)
                },
                is_static: import.is_static,
                node: import.declaration,
                path: import.path,
            }
        })
        .collect()
}

/// Finds the explicit import of `package.class_name`.
pub fn find_import<'tree>(
    file: &'tree SourceFile,
    package: &str,
    class_name: &str,
) -> Option<ImportEntry<'tree>> {
    imports(file)
        .into_iter()
        .find(|entry| entry.is_explicit(package, class_name))
}

/// Returns true if a wildcard import exists for `package`.
pub fn has_wildcard_import(file: &SourceFile, package: &str) -> bool {
    imports(file).iter().any(|entry| entry.is_wildcard_for(package))
}

/// Returns true if `class_name` is imported explicitly or through a wildcard on `package`.
pub fn is_imported(file: &SourceFile, package: &str, class_name: &str) -> bool {
    imports(file)
        .iter()
        .any(|entry| entry.is_explicit(package, class_name) || entry.is_wildcard_for(package))
}

/// Adds `import package.class_name;` unless the class is already visible.
///
/// An already imported class leaves the text untouched and returns a copy
/// of the same file.
pub fn add_import(file: &SourceFile, package: &str, class_name: &str) -> Result<SourceFile> {
    require("package name", package)?;
    require("class name", class_name)?;

    if is_imported(file, package, class_name) {
        debug!(package, class_name, "import already present");
        return Ok(file.clone());
    }
    insert_import(file, &format!("{package}.{class_name}"))
}

/// Adds an import from its full dotted name (`java.util.List`).
pub fn add_import_path(file: &SourceFile, full_name: &str) -> Result<SourceFile> {
    let (package, class_name) = split_import(full_name)?;
    add_import(file, package, class_name)
}

/// Adds `import package.*;` unless that wildcard already exists.
pub fn add_wildcard_import(file: &SourceFile, package: &str) -> Result<SourceFile> {
    require("package name", package)?;

    if has_wildcard_import(file, package) {
        debug!(package, "wildcard import already present");
        return Ok(file.clone());
    }
    insert_import(file, &format!("{package}.*"))
}

/// Inserts after the last import, else after the package declaration, else at the start.
fn insert_import(file: &SourceFile, name: &str) -> Result<SourceFile> {
    let statement = format!("import {name};");
    let edit = match imports(file).last() {
        Some(last) => TextEdit::insert(last.node.end_byte(), format!("\n{statement}")),
        None => match package_declaration(file) {
            Some(package) => TextEdit::insert(package.end_byte(), format!("\n\n{statement}")),
            None => TextEdit::insert(0, format!("{statement}\n")),
        },
    };
    debug!(import = name, offset = edit.range.start, "adding import");
    file.apply_edits([edit])
}

/// Rewrites the explicit import of `old_package.old_class` to `new_package.new_class`.
///
/// Returns `Ok(None)` when there is no explicit import to rename or when the
/// new name is already imported explicitly.
pub fn rename_import(
    file: &SourceFile,
    old_package: &str,
    new_package: &str,
    old_class: &str,
    new_class: &str,
) -> Result<Option<SourceFile>> {
    require("old package name", old_package)?;
    require("new package name", new_package)?;
    require("old class name", old_class)?;
    require("new class name", new_class)?;

    let Some(existing) = find_import(file, old_package, old_class) else {
        return Ok(None);
    };
    if find_import(file, new_package, new_class).is_some() {
        debug!(new_package, new_class, "import rename would duplicate an import");
        return Ok(None);
    }

    let edit = TextEdit::replace_node(existing.path, format!("{new_package}.{new_class}"));
    file.apply_edits([edit]).map(Some)
}

/// Changes the class part of an explicit import.
///
/// Returns `Ok(None)` when a wildcard already covers the package or the
/// import does not exist.
pub fn update_import_class_name(
    file: &SourceFile,
    package: &str,
    old_class: &str,
    new_class: &str,
) -> Result<Option<SourceFile>> {
    require("package name", package)?;
    require("old class name", old_class)?;
    require("new class name", new_class)?;

    if has_wildcard_import(file, package) {
        return Ok(None);
    }
    rename_import(file, package, package, old_class, new_class)
}

/// Moves an explicit import to another package.
///
/// Returns `Ok(None)` when a wildcard covers the old package or the import
/// does not exist.
pub fn update_import_package_name(
    file: &SourceFile,
    old_package: &str,
    new_package: &str,
    class_name: &str,
) -> Result<Option<SourceFile>> {
    require("old package name", old_package)?;
    require("new package name", new_package)?;
    require("class name", class_name)?;

    if has_wildcard_import(file, old_package) {
        return Ok(None);
    }
    rename_import(file, old_package, new_package, class_name, class_name)
}

/// Rewrites `import old_full;` to `import new_full;`.
pub fn update_import(file: &SourceFile, old_full: &str, new_full: &str) -> Result<Option<SourceFile>> {
    let (old_package, old_class) = split_import(old_full)?;
    let (new_package, new_class) = split_import(new_full)?;

    if has_wildcard_import(file, old_package) {
        return Ok(None);
    }
    rename_import(file, old_package, new_package, old_class, new_class)
}

/// Splits a full dotted name on its last `.`.
pub fn split_import(full_name: &str) -> Result<(&str, &str)> {
    let full_name = full_name.trim();
    match full_name.rsplit_once('.') {
        Some((package, class_name)) if !package.is_empty() && !class_name.is_empty() => {
            Ok((package, class_name))
        }
        _ => Err(RefactorError::invalid_argument(format!(
            "invalid import name {full_name:?}: expected package.ClassName"
        ))),
    }
}

fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RefactorError::invalid_argument(format!("{what} cannot be empty")));
    }
    Ok(())
}
