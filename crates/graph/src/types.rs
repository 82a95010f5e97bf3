use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Line number used for edges whose origin line is unknown.
pub const START_LINE: usize = 0;

/// Identity key of a vertex: the absolute path when known, otherwise the display name.
pub fn vertex_key(name: &str, abs_path: Option<&Path>) -> String {
    match abs_path {
        Some(path) if !path.as_os_str().is_empty() => path.to_string_lossy().into_owned(),
        _ => name.to_string(),
    }
}

/// A file, or a reference that could not be mapped to a file ("dummy").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vertex {
    /// Display name (statement text or file name)
    pub name: String,

    /// Absolute path; `None` for dummy vertices
    pub abs_path: Option<PathBuf>,
}

impl Vertex {
    pub fn new(name: impl Into<String>, abs_path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            abs_path: abs_path.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Placeholder for an unresolved reference
    pub fn dummy(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn key(&self) -> String {
        vertex_key(&self.name, self.abs_path.as_deref())
    }

    pub fn is_dummy(&self) -> bool {
        self.abs_path.is_none()
    }
}

/// Directed relation carrying the 1-based line of the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub line: usize,
}

impl Edge {
    pub fn new(line: usize) -> Self {
        Self { line }
    }
}

impl Default for Edge {
    fn default() -> Self {
        Self { line: START_LINE }
    }
}

/// Directed multigraph of files keyed by vertex identity
pub struct DependencyGraph {
    /// Vertex -> vertex with the line of the include/import
    pub graph: DiGraph<Vertex, Edge>,

    /// Identity key -> NodeIndex mapping
    pub key_index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            key_index: HashMap::new(),
        }
    }

    /// Insert a vertex unless one with the same identity key exists.
    ///
    /// Returns the index of the (new or existing) vertex and whether it was inserted.
    pub fn add_vertex(&mut self, vertex: Vertex) -> (NodeIndex, bool) {
        let key = vertex.key();
        if let Some(&idx) = self.key_index.get(&key) {
            log::trace!(
                "Vertex already exists: key = {key}, name = {}",
                vertex.name
            );
            return (idx, false);
        }

        let idx = self.graph.add_node(vertex);
        self.key_index.insert(key, idx);
        (idx, true)
    }

    /// Add an edge between two existing vertices, addressed by identity key.
    pub fn add_edge(&mut self, from_key: &str, to_key: &str, edge: Edge) -> Result<EdgeIndex> {
        let from = self
            .find_vertex(from_key)
            .ok_or_else(|| GraphError::VertexNotFound(from_key.to_string()))?;
        let to = self
            .find_vertex(to_key)
            .ok_or_else(|| GraphError::VertexNotFound(to_key.to_string()))?;
        Ok(self.graph.add_edge(from, to, edge))
    }

    pub fn find_vertex(&self, key: &str) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    pub fn contains_vertex(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    pub fn get_vertex(&self, idx: NodeIndex) -> Option<&Vertex> {
        self.graph.node_weight(idx)
    }

    /// All vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = (NodeIndex, &Vertex)> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx).map(|v| (idx, v)))
    }

    /// All edges in insertion order as (source, destination, edge)
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex, Edge)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
