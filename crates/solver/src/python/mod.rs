//! Python import resolution.
//!
//! Relative imports (`from ..pkg import x`) are resolved against the
//! importing file's directory; absolute ones against each process path in
//! turn. A candidate is tried as a module file with every configured
//! extension, then as a package through its `__init__` marker.

mod statement;

pub use statement::{split_statement, ImportKind, PyImport};

use crate::language::Language;
use crate::options::SolverOptions;
use crate::paths::{append_extension, ascend, source_dir};
use crate::solver::{DuplicateEdges, GraphState, Solver, SolverCore};
use std::path::{Path, PathBuf};

const PATTERNS: &[&str] = &[
    r"^[ \t]*import[ \t]+(\.*[^\d\W][\w.]*(?:[ \t]+as[ \t]+[^\d\W]\w*)?(?:[ \t]*,[ \t]*\.*[^\d\W][\w.]*(?:[ \t]+as[ \t]+[^\d\W]\w*)?)*)[ \t]*(?:#.*)?$",
    r"^[ \t]*from[ \t]+(\.*(?:[^\d\W][\w.]*)?[ \t]+import[ \t]+(?:\*|\(?[ \t]*[^\d\W]\w*(?:[ \t]+as[ \t]+[^\d\W]\w*)?(?:[ \t]*,[ \t]*[^\d\W]\w*(?:[ \t]+as[ \t]+[^\d\W]\w*)?)*[ \t]*,?[ \t]*\)?))[ \t]*(?:#.*)?$",
    r#"^[ \t]*__all__[ \t]*=[ \t]*[\[(]([^\])]*)[\])]"#,
];

const FILE_PATTERN: &str = r"^(?:.*[/\\])?[^\d\W]\w*\.py[3w]?$";

/// Outcome of locating one import
#[derive(Debug, PartialEq, Eq)]
enum Located {
    File(PathBuf),
    /// A package directory without a marker was named explicitly
    Invalid,
    Missing,
}

pub struct PythonSolver {
    core: SolverCore,
    process_paths: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl PythonSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self {
            core: SolverCore::new(),
            process_paths: options.process_paths,
            extensions: options.python_extensions,
        }
    }

    fn locate(&self, state: &mut GraphState, src_path: &Path, import: &PyImport) -> Located {
        let bases: Vec<&Path> = if import.is_relative() {
            ascend(source_dir(src_path), import.levels_up())
                .into_iter()
                .collect()
        } else {
            self.process_paths.iter().map(PathBuf::as_path).collect()
        };

        let mut invalid = false;
        for base in bases {
            match self.locate_in(state, base, import) {
                Located::File(path) => return Located::File(path),
                Located::Invalid => invalid = true,
                Located::Missing => {}
            }
        }
        if invalid {
            Located::Invalid
        } else {
            Located::Missing
        }
    }

    fn locate_in(&self, state: &mut GraphState, base: &Path, import: &PyImport) -> Located {
        let target_rel = import.target_path();
        let target = base.join(&target_rel);
        let named = !target_rel.as_os_str().is_empty();

        if named {
            if let Some(hit) = self.probe_module(state, &target) {
                return Located::File(hit);
            }
        }
        if let Some(hit) = self.probe_package(state, &target) {
            return Located::File(hit);
        }
        if named && !import.star && target.is_dir() {
            return Located::Invalid;
        }

        // `from pkg import name` where `name` is an attribute of `pkg`
        if import.name.is_some() {
            let module_rel = import.module_path();
            let module = base.join(&module_rel);
            if !module_rel.as_os_str().is_empty() {
                if let Some(hit) = self.probe_module(state, &module) {
                    return Located::File(hit);
                }
            }
            if let Some(hit) = self.probe_package(state, &module) {
                return Located::File(hit);
            }
        }
        Located::Missing
    }

    fn probe_module(&self, state: &mut GraphState, target: &Path) -> Option<PathBuf> {
        self.extensions
            .iter()
            .find_map(|ext| state.probe_file(append_extension(target, ext)))
    }

    fn probe_package(&self, state: &mut GraphState, dir: &Path) -> Option<PathBuf> {
        self.extensions
            .iter()
            .find_map(|ext| state.probe_file(dir.join(format!("__init__.{ext}"))))
    }
}

impl Solver for PythonSolver {
    fn language(&self) -> Language {
        Language::Python
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
        let Some(kind) = ImportKind::from_pattern_index(pattern_idx) else {
            log::warn!("Unknown python pattern index {pattern_idx} for '{statement}'");
            return;
        };
        let imports = split_statement(statement, kind);
        if imports.is_empty() {
            log::debug!("No imports in '{statement}' ({})", src_path.display());
            return;
        }

        let mut state = self.core.lock();
        let src_key = state.ensure_source(src_path);
        for import in imports {
            match self.locate(&mut state, src_path, &import) {
                Located::File(path) => state.insert_edge(
                    &src_key,
                    &import.text,
                    Some(&path),
                    line_no,
                    DuplicateEdges::Skip,
                ),
                Located::Missing => state.insert_edge(
                    &src_key,
                    &import.dummy_name(),
                    None,
                    line_no,
                    DuplicateEdges::Skip,
                ),
                Located::Invalid => log::debug!(
                    "Ignoring '{}' in {}: package directory has no __init__ marker",
                    import.text,
                    src_path.display()
                ),
            }
        }
    }
}
