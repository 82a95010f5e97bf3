//! `#include` / `#import` resolution for C-family sources.

use crate::language::Language;
use crate::options::SolverOptions;
use crate::paths::source_dir;
use crate::solver::{DuplicateEdges, Solver, SolverCore};
use std::path::{Path, PathBuf};

/// `#include "x.h"`; searched next to the including file first
const QUOTED: usize = 0;

const PATTERNS: &[&str] = &[
    r#"^\s*#\s*(?:include|import)\s*"([^"]+)""#,
    r#"^\s*#\s*(?:include|import)\s*<([^>]+)>"#,
];

const FILE_PATTERN: &str = r"(?i)\.(?:c|cc|cpp|cxx|c\+\+|h|hh|hpp|hxx|h\+\+|inl|ipp|tcc)$";

pub struct CSolver {
    core: SolverCore,
    include_paths: Vec<PathBuf>,
}

impl CSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            core: SolverCore::new(),
            include_paths: options.include_paths,
        }
    }
}

impl Solver for CSolver {
    fn language(&self) -> Language {
        Language::C
    }

    fn statement_patterns(&self) -> &'static [&'static str] {
        PATTERNS
    }

    fn file_pattern(&self) -> &'static str {
        FILE_PATTERN
    }

    fn core(&self) -> &SolverCore {
        &self.core
    }

    fn resolve(&self, src_path: &Path, statement: &str, pattern_idx: usize, line_no: usize) {
        let statement = statement.trim();
        if statement.is_empty() {
            return;
        }

        let mut state = self.core.lock();
        let src_key = state.ensure_source(src_path);

        let mut target = None;
        if pattern_idx == QUOTED {
            target = state.probe_file(source_dir(src_path).join(statement));
        }
        if target.is_none() {
            for dir in &self.include_paths {
                target = state.probe_file(dir.join(statement));
                if target.is_some() {
                    break;
                }
            }
        }

        state.insert_edge(&src_key, statement, target.as_deref(), line_no, DuplicateEdges::Keep);
    }
}
