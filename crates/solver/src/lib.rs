//! # Gardener Solver
//!
//! Per-language resolution of include/import statements into edges of a
//! shared [`DependencyGraph`](gardener_graph::DependencyGraph).
//!
//! ## Architecture
//!
//! ```text
//! statement detector workers
//!        │  resolve(src, "foo.h", pattern_idx, line)
//!        ▼
//! ┌──────────────────────┐     ┌─────────────────────────────┐
//! │ dyn Solver           │────▶│ SolverCore (Mutex)          │
//! │  CSolver             │     │  DependencyGraph            │
//! │  PythonSolver        │     │  probe cache path -> canon  │
//! │  RubySolver          │     └─────────────────────────────┘
//! └──────────────────────┘
//! ```
//!
//! A solver publishes the regexes the detector runs (`statement_patterns`,
//! `file_pattern`) and turns each match into a vertex plus an edge labelled
//! with the source line. References that cannot be mapped to a file become
//! dummy vertices keyed by name.
//!
//! ## Example
//!
//! ```no_run
//! use gardener_solver::{solver_for, SolverOptions};
//! use std::path::Path;
//!
//! let solver = solver_for("c", SolverOptions::default().with_include_paths(["/usr/include"]))?;
//! solver.resolve(Path::new("/src/main.c"), "stdio.h", 1, 3);
//! let graph = solver.take_graph();
//! assert_eq!(graph.edge_count(), 1);
//! # Ok::<(), gardener_solver::SolverError>(())
//! ```

pub mod c;
pub mod error;
pub mod language;
pub mod options;
mod paths;
pub mod python;
pub mod ruby;
pub mod solver;

pub use c::CSolver;
pub use error::{Result, SolverError};
pub use language::Language;
pub use options::SolverOptions;
pub use python::PythonSolver;
pub use ruby::RubySolver;
pub use solver::{build_solver, solver_for, Solver, SolverCore};
