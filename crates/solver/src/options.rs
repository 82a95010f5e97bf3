use crate::error::{Result, SolverError};
use std::path::PathBuf;

/// Search paths and probing options shared by all solvers
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Directories probed for C includes and Ruby requires, in order
    pub include_paths: Vec<PathBuf>,

    /// Roots against which absolute Python imports are resolved
    pub process_paths: Vec<PathBuf>,

    /// File extensions tried for Python modules, in order
    pub python_extensions: Vec<String>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            include_paths: Vec::new(),
            process_paths: Vec::new(),
            python_extensions: vec!["py".to_string(), "pyw".to_string(), "py3".to_string()],
        }
    }
}

impl SolverOptions {
    pub fn with_include_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.include_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_process_paths(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.process_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Validate options
    pub fn validate(&self) -> Result<()> {
        if self.python_extensions.is_empty() {
            return Err(SolverError::invalid_config(
                "python_extensions must not be empty",
            ));
        }
        if let Some(ext) = self
            .python_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(SolverError::invalid_config(format!(
                "python extension '{ext}' must be non-empty and given without a leading dot"
            )));
        }
        Ok(())
    }
}
