use thiserror::Error;

pub type Result<T> = std::result::Result<T, DetectorError>;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern #{index}: {source}")]
    InvalidPattern {
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid file filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Worker count must be at least 1 (got {0})")]
    InvalidWorkerCount(usize),

    #[error("{0} file job(s) panicked during detection")]
    WorkerPanicked(usize),
}
