//! `require` / `require_relative` resolution for Ruby sources.

use crate::language::Language;
use crate::options::SolverOptions;
use crate::paths::{append_extension, source_dir};
use crate::solver::{DuplicateEdges, Solver, SolverCore};
use std::path::{Path, PathBuf};

const REQUIRE_RELATIVE: usize = 0;

const PATTERNS: &[&str] = &[
    r#"^\s*require_relative\s*\(?\s*['"]([^'"]+)['"]"#,
    r#"^\s*require\s*\(?\s*['"]([^'"]+)['"]"#,
];

const FILE_PATTERN: &str = r"\.rb$";

pub struct RubySolver {
    core: SolverCore,
    include_paths: Vec<PathBuf>,
}

impl RubySolver {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            core: SolverCore::new(),
            include_paths: options.include_paths,
        }
    }
}

/// `name` with `.rb` appended unless it already ends in it
fn with_rb_extension(name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.extension().is_some_and(|ext| ext == "rb") {
        path.to_path_buf()
    } else {
        append_extension(path, "rb")
    }
}

fn is_explicitly_relative(name: &str) -> bool {
    name.starts_with('.')
}

impl Solver for RubySolver {
    fn language(&self) -> Language {
        Language::Ruby
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

        let relative = with_rb_extension(statement);
        let mut state = self.core.lock();
        let src_key = state.ensure_source(src_path);

        let local = source_dir(src_path).join(&relative);
        let target = if pattern_idx == REQUIRE_RELATIVE {
            state.probe_file(local)
        } else {
            // a dotted `require` falls back to the include paths when the
            // source directory has no match
            let mut hit = if is_explicitly_relative(statement) {
                state.probe_file(local)
            } else {
                None
            };
            for dir in &self.include_paths {
                if hit.is_some() {
                    break;
                }
                hit = state.probe_file(dir.join(&relative));
            }
            hit
        };

        state.insert_edge(&src_key, statement, target.as_deref(), line_no, DuplicateEdges::Keep);
    }
}
