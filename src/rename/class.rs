//! Type renames and their propagation to other files.

use super::{validate_identifier, RenameOptions, Renamed};
use crate::error::Result;
use crate::imports;
use crate::locator::{all_declarations, find_type_by_name, package_name, strip_whitespace, Declaration};
use crate::naming;
use crate::source::{SourceFile, TextEdit};
use crate::usage::UsageFinder;
use std::path::PathBuf;
use tracing::debug;

/// Renames a class, interface or enum declared in this file.
///
/// Rewrites the declaration, its constructors, every type reference and,
/// unless disabled, variables named after the type. Returns `Ok(None)` when
/// the file declares no type of that name.
pub fn rename_class(file: &SourceFile, class_name: &str, new_name: &str) -> Result<Option<Renamed>> {
    rename_class_with(file, class_name, new_name, &RenameOptions::default())
}

/// [`rename_class`] with explicit options.
pub fn rename_class_with(
    file: &SourceFile,
    class_name: &str,
    new_name: &str,
    options: &RenameOptions,
) -> Result<Option<Renamed>> {
    if class_name.is_empty() || new_name.is_empty() {
        return Ok(None);
    }
    validate_identifier(new_name)?;
    let Some(decl) = find_type_by_name(file, class_name) else {
        debug!(class_name, "rename skipped: type not declared in file");
        return Ok(None);
    };
    rename_type(file, &decl, new_name, options).map(Some)
}

pub(super) fn rename_type(
    file: &SourceFile,
    decl: &Declaration<'_>,
    new_name: &str,
    options: &RenameOptions,
) -> Result<Renamed> {
    let old_name = decl.name_text(file);
    if old_name == new_name {
        return Ok(Renamed::unchanged(file));
    }

    let finder = UsageFinder::new(file).with_options(options.usage);
    let references = finder.find_type_references(old_name, file.root());
    let mut edits = vec![TextEdit::replace_node(decl.name, new_name)];
    edits.extend(
        references
            .iter()
            .map(|site| TextEdit::replace_node(site.reference, new_name)),
    );

    let mut renamed_variables = Vec::new();
    if options.follow_naming {
        convention_renames(file, &finder, old_name, new_name, &mut edits, &mut renamed_variables);
    }

    let renamed = file.apply_edits(edits)?;
    debug!(from = old_name, to = new_name, references = references.len(), "renamed type");
    Ok(Renamed {
        file: renamed,
        sites: references.len(),
        renamed_variables,
    })
}

/// Updates a file that uses a renamed type declared elsewhere.
///
/// With a package, the file must be able to see the type: an explicit or
/// wildcard import of that package, or the same package. An explicit
/// import is rewritten to the new name. Returns `Ok(None)` when the type is
/// not visible or nothing refers to it.
pub fn rename_class_references(
    file: &SourceFile,
    old_name: &str,
    new_name: &str,
    package: Option<&str>,
) -> Result<Option<Renamed>> {
    rename_class_references_with(file, old_name, new_name, package, &RenameOptions::default())
}

/// [`rename_class_references`] with explicit options.
pub fn rename_class_references_with(
    file: &SourceFile,
    old_name: &str,
    new_name: &str,
    package: Option<&str>,
    options: &RenameOptions,
) -> Result<Option<Renamed>> {
    if old_name.is_empty() || new_name.is_empty() {
        return Ok(None);
    }
    validate_identifier(new_name)?;
    if old_name == new_name {
        return Ok(Some(Renamed::unchanged(file)));
    }

    let mut edits = Vec::new();
    if let Some(package) = package {
        let explicit = imports::find_import(file, package, old_name);
        let visible = explicit.is_some()
            || imports::has_wildcard_import(file, package)
            || package_name(file).as_deref() == Some(package);
        if !visible {
            debug!(old_name, package, "type not visible from file");
            return Ok(None);
        }
        if let Some(entry) = explicit {
            if imports::find_import(file, package, new_name).is_none() {
                edits.push(TextEdit::replace_node(entry.path, format!("{package}.{new_name}")));
            }
        }
    }

    let finder = UsageFinder::new(file).with_options(options.usage);
    let references = finder.find_type_references(old_name, file.root());
    edits.extend(
        references
            .iter()
            .map(|site| TextEdit::replace_node(site.reference, new_name)),
    );

    let mut renamed_variables = Vec::new();
    if options.follow_naming {
        convention_renames(file, &finder, old_name, new_name, &mut edits, &mut renamed_variables);
    }

    if edits.is_empty() {
        return Ok(None);
    }
    let renamed = file.apply_edits(edits)?;
    Ok(Some(Renamed {
        file: renamed,
        sites: references.len(),
        renamed_variables,
    }))
}

/// The path a file should move to when its public type is renamed.
///
/// `None` unless the file is named after the old type.
pub fn suggested_path(file: &SourceFile, old_name: &str, new_name: &str) -> Option<PathBuf> {
    let path = file.path()?;
    if file.file_stem()? != old_name {
        return None;
    }
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("java");
    Some(path.with_file_name(format!("{new_name}.{extension}")))
}

/// Adds edits renaming variables declared as `Old` or `List<Old>` that
/// carry the conventional name for the type.
fn convention_renames<'tree>(
    file: &'tree SourceFile,
    finder: &UsageFinder<'tree>,
    old_type: &str,
    new_type: &str,
    edits: &mut Vec<TextEdit>,
    renamed: &mut Vec<(String, String)>,
) {
    for decl in all_declarations(file, file.root()) {
        if !decl.kind.is_variable() {
            continue;
        }
        let Some(type_text) = decl.type_text(file).map(strip_whitespace) else {
            continue;
        };
        let collection = naming::is_collection_type(&type_text);
        let element = if collection {
            type_text
                .split_once('<')
                .and_then(|(_, rest)| rest.strip_suffix('>'))
                .unwrap_or_default()
        } else {
            type_text.as_str()
        };
        if element != old_type {
            continue;
        }

        let name = decl.name_text(file);
        let new_name = naming::new_variable_name(name, old_type, new_type, collection);
        if new_name == name || validate_identifier(&new_name).is_err() {
            continue;
        }

        edits.push(TextEdit::replace_node(decl.name, new_name.as_str()));
        edits.extend(
            finder
                .find_usages(&decl, decl.scope)
                .iter()
                .map(|site| TextEdit::replace_node(site.reference, new_name.as_str())),
        );
        debug!(from = name, to = %new_name, "renaming convention-named variable");
        renamed.push((name.to_string(), new_name));
    }
}
