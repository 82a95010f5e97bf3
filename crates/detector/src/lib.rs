//! # Gardener Detector
//!
//! Finds source files and the include/import statements inside them.
//!
//! ## Pipeline
//!
//! ```text
//! process paths
//!     │
//!     ├──> FileDetector (file/exclude regex, depth limit)
//!     │      └─> add_vertex + canonical paths
//!     │
//!     └──> StatementDetector (N workers, shared job queue)
//!            ├─> continuation-joined logical lines
//!            └─> first matching pattern -> Solver::resolve
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use gardener_detector::{default_jobs, FileDetector, StatementDetector};
//! use gardener_solver::{solver_for, SolverOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let solver = solver_for("c", SolverOptions::default())?;
//!     let files = FileDetector::new(solver.file_pattern(), &["build/"])?
//!         .with_process_paths(["src"])
//!         .collect(solver.as_ref());
//!
//!     let detector = StatementDetector::new(solver.clone(), default_jobs())?;
//!     for file in files {
//!         detector.submit(file);
//!     }
//!     detector.await_completion()?;
//!
//!     let graph = solver.take_graph();
//!     println!("{} files, {} edges", graph.node_count(), graph.edge_count());
//!     Ok(())
//! }
//! ```

mod error;
mod file_detector;
mod limits;
mod statement_detector;

pub use error::{DetectorError, Result};
pub use file_detector::FileDetector;
pub use limits::{default_jobs, JOBS_ENV};
pub use statement_detector::StatementDetector;
