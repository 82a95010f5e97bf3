use crate::types::{DependencyGraph, Edge, Vertex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl DependencyGraph {
    /// Check whether at least one edge `from_key -> to_key` exists
    #[must_use]
    pub fn has_edge(&self, from_key: &str, to_key: &str) -> bool {
        let (Some(from), Some(to)) = (self.find_vertex(from_key), self.find_vertex(to_key)) else {
            return false;
        };
        self.graph.find_edge(from, to).is_some()
    }

    /// Outgoing edges of a vertex (what it includes), in insertion order
    #[must_use]
    pub fn edges_from(&self, key: &str) -> Vec<(&Vertex, Edge)> {
        let Some(idx) = self.find_vertex(key) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| (e.id(), &self.graph[e.target()], *e.weight()))
            .collect();
        // petgraph walks adjacency lists newest-first
        out.sort_by_key(|(id, _, _)| *id);
        out.into_iter().map(|(_, v, e)| (v, e)).collect()
    }

    /// Incoming edges of a vertex (who includes it)
    #[must_use]
    pub fn edges_to(&self, key: &str) -> Vec<(&Vertex, Edge)> {
        let Some(idx) = self.find_vertex(key) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (e.id(), &self.graph[e.source()], *e.weight()))
            .collect();
        out.sort_by_key(|(id, _, _)| *id);
        out.into_iter().map(|(_, v, e)| (v, e)).collect()
    }

    /// Vertices standing in for unresolved references
    #[must_use]
    pub fn dummies(&self) -> Vec<&Vertex> {
        self.vertices()
            .map(|(_, v)| v)
            .filter(|v| v.is_dummy())
            .collect()
    }
}
