use crate::error::{Result, SolverError};
use std::fmt;
use std::str::FromStr;

/// Languages with a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Python,
    Ruby,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::C, Language::Python, Language::Ruby];

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Python => "python",
            Language::Ruby => "ruby",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" | "cpp" | "c++" => Ok(Language::C),
            "python" | "py" => Ok(Language::Python),
            "ruby" | "rb" => Ok(Language::Ruby),
            _ => Err(SolverError::unknown_language(s)),
        }
    }
}
