use thiserror::Error;

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors raised while constructing a solver
#[derive(Error, Debug)]
pub enum SolverError {
    /// The requested language has no solver
    #[error("Unsupported language: {0}")]
    UnknownLanguage(String),

    /// Invalid solver options
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SolverError {
    pub fn unknown_language(lang: impl Into<String>) -> Self {
        Self::UnknownLanguage(lang.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
