use crate::c::CSolver;
use crate::error::Result;
use crate::language::Language;
use crate::options::SolverOptions;
use crate::paths::{canonical_file, file_name};
use crate::python::PythonSolver;
use crate::ruby::RubySolver;
use gardener_graph::{vertex_key, DependencyGraph, Edge, Vertex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Language-specific resolution of include/import statements into graph edges.
///
/// Implementations are shared between detector workers, so every mutation
/// goes through the [`SolverCore`] lock.
pub trait Solver: Send + Sync {
    fn language(&self) -> Language;

    /// Statement regexes; each has exactly one capture group holding the
    /// referenced name. A match is reported with the pattern's index.
    fn statement_patterns(&self) -> &'static [&'static str];

    /// Regex selecting the source files this solver understands
    fn file_pattern(&self) -> &'static str;

    /// Resolve one detected statement of `src_path` and record the edge
    fn resolve(&self, src_path: &Path, statement: &str, pattern_idx: usize, line_no: usize);

    /// Shared graph state
    fn core(&self) -> &SolverCore;

    /// Register a vertex; a no-op when the key is already present
    fn add_vertex(&self, name: &str, abs_path: Option<&Path>) {
        self.core().lock().add_vertex(name, abs_path);
    }

    /// `(vertices, edges)` currently in the graph
    fn graph_counts(&self) -> (usize, usize) {
        let state = self.core().lock();
        (state.graph.node_count(), state.graph.edge_count())
    }

    /// Move the graph out, leaving an empty one behind
    fn take_graph(&self) -> DependencyGraph {
        std::mem::take(&mut self.core().lock().graph)
    }
}

/// Create the solver for a language name
pub fn solver_for(language: &str, options: SolverOptions) -> Result<Arc<dyn Solver>> {
    let language: Language = language.parse()?;
    build_solver(language, options)
}

/// Create the solver for a parsed language
pub fn build_solver(language: Language, options: SolverOptions) -> Result<Arc<dyn Solver>> {
    options.validate()?;
    log::debug!("Creating {language} solver");
    Ok(match language {
        Language::C => Arc::new(CSolver::new(options)),
        Language::Python => Arc::new(PythonSolver::new(options)),
        Language::Ruby => Arc::new(RubySolver::new(options)),
    })
}

/// Graph plus probe cache behind one lock
#[derive(Default)]
pub struct SolverCore {
    state: Mutex<GraphState>,
}

impl SolverCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How a solver treats a second edge between the same pair of vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DuplicateEdges {
    Keep,
    Skip,
}

#[derive(Default)]
pub(crate) struct GraphState {
    pub(crate) graph: DependencyGraph,
    probes: HashMap<PathBuf, Option<PathBuf>>,
}

impl GraphState {
    pub(crate) fn add_vertex(&mut self, name: &str, abs_path: Option<&Path>) -> String {
        let vertex = Vertex::new(name, abs_path.map(Path::to_path_buf));
        let key = vertex.key();
        self.graph.add_vertex(vertex);
        key
    }

    /// Register the vertex of a file being scanned
    pub(crate) fn ensure_source(&mut self, src_path: &Path) -> String {
        self.add_vertex(&file_name(src_path), Some(src_path))
    }

    /// Cached existence check; yields the canonical path of a regular file
    pub(crate) fn probe_file(&mut self, candidate: PathBuf) -> Option<PathBuf> {
        if let Some(hit) = self.probes.get(&candidate) {
            return hit.clone();
        }
        let hit = canonical_file(&candidate);
        log::trace!(
            "Probe {} -> {}",
            candidate.display(),
            hit.as_deref().map_or_else(|| "absent".to_string(), |p| p.display().to_string())
        );
        self.probes.insert(candidate, hit.clone());
        hit
    }

    /// Add an edge from `src_key` to the vertex `name`/`target`, creating it
    /// as a dummy when `target` is `None`
    pub(crate) fn insert_edge(
        &mut self,
        src_key: &str,
        name: &str,
        target: Option<&Path>,
        line: usize,
        duplicates: DuplicateEdges,
    ) {
        let dst_key = vertex_key(name, target);
        if duplicates == DuplicateEdges::Skip
            && (self.graph.has_edge(src_key, name) || self.graph.has_edge(src_key, &dst_key))
        {
            log::trace!("Skipping duplicate edge {src_key} -> {dst_key} (line {line})");
            return;
        }

        let (_, created) = self.graph.add_vertex(Vertex::new(name, target.map(Path::to_path_buf)));
        if created && target.is_none() {
            log::debug!("Unresolved statement '{name}' becomes a dummy vertex");
        }

        match self.graph.add_edge(src_key, &dst_key, Edge::new(line)) {
            Ok(_) => log::debug!("Edge {src_key} -> {dst_key} (line {line})"),
            Err(err) => log::warn!("Failed to add edge {src_key} -> {dst_key}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_probe_cache_remembers_misses() {
        let dir = tempdir().unwrap();
        let candidate = dir.path().join("late.h");
        let mut state = GraphState::default();

        assert_eq!(state.probe_file(candidate.clone()), None);
        std::fs::write(&candidate, "").unwrap();
        // cached miss survives the file appearing later
        assert_eq!(state.probe_file(candidate), None);
    }

    #[test]
    fn test_insert_edge_dedup_policy() {
        let mut state = GraphState::default();
        let src = state.ensure_source(Path::new("/p/a.py"));

        state.insert_edge(&src, "os", None, 1, DuplicateEdges::Skip);
        state.insert_edge(&src, "os", None, 2, DuplicateEdges::Skip);
        assert_eq!(state.graph.edge_count(), 1);

        state.insert_edge(&src, "sys", None, 3, DuplicateEdges::Keep);
        state.insert_edge(&src, "sys", None, 4, DuplicateEdges::Keep);
        assert_eq!(state.graph.edge_count(), 3);
        assert_eq!(state.graph.node_count(), 3);
    }

    #[test]
    fn test_solver_for_unknown_language() {
        let err = solver_for("fortran", SolverOptions::default()).err().unwrap();
        assert_eq!(err.to_string(), "Unsupported language: fortran");
    }

    #[test]
    fn test_take_graph_leaves_empty_graph() {
        let solver = solver_for("c", SolverOptions::default()).unwrap();
        solver.add_vertex("a.c", Some(Path::new("/p/a.c")));
        solver.add_vertex("a.c", Some(Path::new("/p/a.c")));
        assert_eq!(solver.graph_counts(), (1, 0));

        let graph = solver.take_graph();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(solver.graph_counts(), (0, 0));
    }
}
