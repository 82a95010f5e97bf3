use crate::error::{DetectorError, Result};
use gardener_solver::Solver;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supplies the source files of the process paths that match a language's
/// file pattern and none of the exclude patterns
pub struct FileDetector {
    file_pattern: Regex,
    exclude_patterns: Vec<Regex>,
    process_paths: Vec<PathBuf>,
    recursive_limit: Option<usize>,
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| DetectorError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })
}

impl FileDetector {
    /// File names are matched case-insensitively; exclude patterns as written
    pub fn new<S: AsRef<str>>(file_pattern: &str, exclude_patterns: &[S]) -> Result<Self> {
        Ok(Self {
            file_pattern: compile(file_pattern, true)?,
            exclude_patterns: exclude_patterns
                .iter()
                .map(|p| compile(p.as_ref(), false))
                .collect::<Result<Vec<_>>>()?,
            process_paths: Vec::new(),
            recursive_limit: None,
        })
    }

    pub fn with_process_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.process_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// `None` descends without limit; `Some(0)` stays in the top directory
    pub fn with_recursive_limit(mut self, limit: Option<usize>) -> Self {
        self.recursive_limit = limit;
        self
    }

    pub fn use_file(&self, path: &str) -> bool {
        if self.exclude_patterns.iter().any(|re| re.is_match(path)) {
            log::trace!("Excluding {path}");
            return false;
        }
        if !self.file_pattern.is_match(path) {
            log::trace!("Ignoring {path}");
            return false;
        }
        log::trace!("Considering {path}");
        true
    }

    /// Walk the process paths, register every accepted file with the solver
    /// and return their canonical paths
    pub fn collect(&self, solver: &dyn Solver) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for root in &self.process_paths {
            if !root.is_dir() {
                log::warn!(
                    "Process path {} does not exist or is not a directory, skipping",
                    root.display()
                );
                continue;
            }
            log::info!("Processing sources from {}", root.display());
            self.walk(root, solver, &mut files);
        }
        log::debug!("Found {} source files", files.len());
        files
    }

    fn walk(&self, root: &Path, solver: &dyn Solver, files: &mut Vec<PathBuf>) {
        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(limit) = self.recursive_limit {
            walker = walker.max_depth(limit + 1);
        }

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.use_file(&path.to_string_lossy()) {
                continue;
            }

            let abs_path = match path.canonicalize() {
                Ok(abs) => abs,
                Err(e) => {
                    log::warn!("Failed to resolve {}: {e}", path.display());
                    continue;
                }
            };
            let name = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            log::trace!("{name} -> {}", abs_path.display());
            solver.add_vertex(&name, Some(&abs_path));
            files.push(abs_path);
        }
    }
}
