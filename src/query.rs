//! Capture extraction: structural patterns run against a node.
//!
//! Every higher layer goes through [`PatternQuery`] instead of walking
//! children by hand. A query yields one [`CaptureMap`] per match, so a
//! single declaration such as `int x, y;` can produce several maps.

use crate::error::Result;
use crate::lang::{Java, Language};
use crate::source::SourceFile;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use streaming_iterator::StreamingIterator;
use tracing::{trace, warn};
use tree_sitter::{Node, Query, QueryCursor};

/// Named sub-node bindings produced by one pattern match.
#[derive(Debug, Clone, Default)]
pub struct CaptureMap<'tree> {
    captures: Vec<(String, Node<'tree>)>,
}

impl<'tree> CaptureMap<'tree> {
    /// Returns the first node bound to `name`.
    pub fn get(&self, name: &str) -> Option<Node<'tree>> {
        self.captures
            .iter()
            .find(|(capture, _)| capture == name)
            .map(|(_, node)| *node)
    }

    /// Returns every node bound to `name`, in match order.
    pub fn get_all(&self, name: &str) -> Vec<Node<'tree>> {
        self.captures
            .iter()
            .filter(|(capture, _)| capture == name)
            .map(|(_, node)| *node)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Iterates over (capture name, node) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Node<'tree>)> {
        self.captures.iter().map(|(name, node)| (name.as_str(), *node))
    }
}

/// A tree-sitter pattern to run against a subtree.
#[derive(Debug, Clone)]
pub struct PatternQuery {
    pattern: String,
    anchored: bool,
}

impl PatternQuery {
    /// Creates a new query from an S-expression pattern.
    ///
    /// Query syntax follows tree-sitter's S-expression format:
    /// - `(class_declaration name: (identifier) @name)` - captures class names
    /// - `(field_access object: (this) field: (identifier) @field)` - captures `this.x`
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            anchored: false,
        }
    }

    /// Only report matches whose outermost pattern node is the queried node itself.
    pub fn anchored(mut self) -> Self {
        self.anchored = true;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Runs the pattern against `node` and returns one map per match.
    pub fn run<'tree>(
        &self,
        file: &'tree SourceFile,
        node: Node<'tree>,
    ) -> Result<Vec<CaptureMap<'tree>>> {
        let query = compiled(&self.pattern)?;
        let names = query.capture_names();
        let mut cursor = QueryCursor::new();
        if self.anchored {
            cursor.set_max_start_depth(Some(0));
        }

        let mut results = Vec::new();
        let mut matches = cursor.matches(&*query, node, file.text().as_bytes());
        while let Some(query_match) = matches.next() {
            let captures = query_match
                .captures
                .iter()
                .map(|capture| (names[capture.index as usize].to_string(), capture.node))
                .collect();
            results.push(CaptureMap { captures });
        }

        Ok(results)
    }

    /// Runs the pattern and returns every node bound to `capture`.
    pub fn nodes<'tree>(
        &self,
        file: &'tree SourceFile,
        node: Node<'tree>,
        capture: &str,
    ) -> Result<Vec<Node<'tree>>> {
        let mut nodes = Vec::new();
        for map in self.run(file, node)? {
            for found in map.get_all(capture) {
                if !nodes.contains(&found) {
                    nodes.push(found);
                }
            }
        }
        Ok(nodes)
    }

    /// Like [`PatternQuery::run`], but a broken pattern degrades to no matches.
    pub fn run_or_empty<'tree>(
        &self,
        file: &'tree SourceFile,
        node: Node<'tree>,
    ) -> Vec<CaptureMap<'tree>> {
        self.run(file, node).unwrap_or_else(|e| {
            warn!(pattern = %self.pattern, error = %e, "query failed");
            Vec::new()
        })
    }

    /// Like [`PatternQuery::nodes`], but a broken pattern degrades to no nodes.
    pub fn nodes_or_empty<'tree>(
        &self,
        file: &'tree SourceFile,
        node: Node<'tree>,
        capture: &str,
    ) -> Vec<Node<'tree>> {
        self.nodes(file, node, capture).unwrap_or_else(|e| {
            warn!(pattern = %self.pattern, error = %e, "query failed");
            Vec::new()
        })
    }
}

/// Compiles `pattern` once per process; later calls share the compiled query.
fn compiled(pattern: &str) -> Result<Arc<Query>> {
    static COMPILED: OnceLock<Mutex<HashMap<String, Arc<Query>>>> = OnceLock::new();
    let cache = COMPILED.get_or_init(|| Mutex::new(HashMap::new()));

    let mut map = cache
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = map.get(pattern) {
        return Ok(Arc::clone(existing));
    }

    let query = Arc::new(Java.query(pattern)?);
    trace!(cached = map.len() + 1, "compiled query");
    map.insert(pattern.to_string(), Arc::clone(&query));
    Ok(query)
}
