//! Declared import graph
//!
//! Models which plan file imports which, for cycle diagnostics and
//! dependency-ordered listings. Uses petgraph for graph operations.
//! The closure walk itself relies on its visited set; this graph only
//! reports on what the files declare.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

/// A directed graph of plan files and their declared imports
#[derive(Debug, Default)]
pub struct ImportGraph {
    /// The underlying directed graph
    graph: DiGraph<PathBuf, ()>,

    /// Map from file path to node index
    node_map: HashMap<PathBuf, NodeIndex>,
}

impl ImportGraph {
    /// Creates an empty import graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from (importer, imported) edges
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a (PathBuf, PathBuf)>) -> Self {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_import(from, to);
        }
        graph
    }

    /// Adds a file node to the graph
    pub fn add_file(&mut self, path: &Path) -> NodeIndex {
        if let Some(idx) = self.node_map.get(path) {
            return *idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        self.node_map.insert(path.to_path_buf(), idx);
        idx
    }

    /// Records that `from` declares an import of `to`
    pub fn add_import(&mut self, from: &Path, to: &Path) {
        let from_idx = self.add_file(from);
        let to_idx = self.add_file(to);
        if self.graph.find_edge(from_idx, to_idx).is_none() {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Number of files in the graph
    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the declared imports contain a cycle
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Returns the files in dependency order (importers before their
    /// imports), or None when the declarations are cyclic
    pub fn dependency_order(&self) -> Option<Vec<PathBuf>> {
        toposort(&self.graph, None).ok().map(|order| {
            order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).cloned())
                .collect()
        })
    }
}
