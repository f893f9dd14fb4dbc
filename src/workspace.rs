//! Discovery of the Java files a batch operation runs over.

use crate::error::Result;
use crate::imports;
use crate::locator::package_name;
use crate::source::SourceFile;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "build", "out", "node_modules"];

/// A directory tree of Java sources.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    exclude_globs: Vec<String>,
}

impl Workspace {
    /// A workspace rooted at a directory, or at a single `.java` file.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude_globs: Vec::new(),
        }
    }

    /// Excludes files whose path relative to the root matches the glob.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_globs.push(pattern.into());
        self
    }

    /// Excludes every glob in `patterns`.
    pub fn exclude_all(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude_globs.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Paths of every `.java` file under the root, sorted by path.
    ///
    /// Hidden directories and build output (`target/`, `build/`, `out/`)
    /// are skipped.
    pub fn java_files(&self) -> Result<Vec<PathBuf>> {
        let exclude = build_glob_set(&self.exclude_globs)?;
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "java") {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if exclude.is_match(relative) {
                debug!(path = %relative.display(), "excluded");
                continue;
            }
            files.push(path.to_path_buf());
        }

        debug!(root = %self.root.display(), count = files.len(), "found java files");
        Ok(files)
    }

    /// Reads and parses every file from [`java_files`](Self::java_files).
    pub fn load(&self) -> Result<Vec<SourceFile>> {
        self.java_files()?.iter().map(SourceFile::open).collect()
    }

    /// Loads the files that can see `package.class_name`.
    pub fn files_importing(&self, package: &str, class_name: &str) -> Result<Vec<SourceFile>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|file| can_see(file, package, class_name))
            .collect())
    }
}

/// Returns the files that import `package.class_name` explicitly or by
/// wildcard, or that share its package.
pub fn files_importing<'a>(
    files: &'a [SourceFile],
    package: &str,
    class_name: &str,
) -> Vec<&'a SourceFile> {
    files
        .iter()
        .filter(|file| can_see(file, package, class_name))
        .collect()
}

fn can_see(file: &SourceFile, package: &str, class_name: &str) -> bool {
    imports::is_imported(file, package, class_name) || package_name(file).as_deref() == Some(package)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/shop/Order.java", "package shop;\npublic class Order {}");
        write(root, "src/shop/Cart.java", "package shop;\nclass Cart { Order order; }");
        write(root, "src/app/Main.java", "package app;\nimport shop.Order;\nclass Main {}");
        write(root, "src/app/Util.java", "package app;\nimport shop.*;\nclass Util {}");
        write(root, "src/app/Other.java", "package app;\nclass Other {}");
        write(root, "src/app/notes.txt", "not java");
        write(root, "target/generated/Gen.java", "class Gen {}");
        write(root, ".hidden/Secret.java", "class Secret {}");
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_java_files() {
        let dir = project();
        let files = Workspace::new(dir.path()).java_files().unwrap();
        assert_eq!(
            names(&files),
            ["Main.java", "Other.java", "Util.java", "Cart.java", "Order.java"]
        );
    }

    #[test]
    fn test_exclude() {
        let dir = project();
        let files = Workspace::new(dir.path())
            .exclude("src/app/**")
            .java_files()
            .unwrap();
        assert_eq!(names(&files), ["Cart.java", "Order.java"]);

        assert!(Workspace::new(dir.path()).exclude("[").java_files().is_err());
    }

    #[test]
    fn test_files_importing() {
        let dir = project();
        let visible = Workspace::new(dir.path())
            .files_importing("shop", "Order")
            .unwrap();
        let stems: Vec<&str> = visible.iter().filter_map(SourceFile::file_stem).collect();
        assert_eq!(stems, ["Main", "Util", "Cart", "Order"]);
    }

    #[test]
    fn test_single_file_root() {
        let dir = project();
        let file = dir.path().join("src/shop/Order.java");
        let files = Workspace::new(&file).java_files().unwrap();
        assert_eq!(files, vec![file]);
    }
}
