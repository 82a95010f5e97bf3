//! # Gardener Graph
//!
//! Directed, labeled multigraph of source files and the files they include.
//!
//! ## Model
//!
//! ```text
//! Vertex (file or unresolved reference)
//!     │  identity key = absolute path, or display name for dummies
//!     │
//!     └──> Edge (line number of the include/import statement)
//!            └─> Vertex
//! ```
//!
//! The graph is mutated only through a solver's serialized resolution
//! operation and read by the writers after every worker has finished.

mod error;
mod graph;
mod types;
mod writer;

pub use error::{GraphError, Result};
pub use types::{vertex_key, DependencyGraph, Edge, Vertex, START_LINE};
pub use writer::{write_dot, write_graph, write_graphml, OutputFormat};
