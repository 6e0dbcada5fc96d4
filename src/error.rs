//! Error types for the multi-version updater.
//!
//! Unit errors are recovered at the smallest unit of work (one page, one
//! search index) and end up in the run report. Configuration errors are
//! fatal and raised before any file is touched.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single unit of work.
#[derive(Debug, Error)]
pub enum UnitError {
    /// File could not be read or written.
    #[error("cannot access '{}': {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page or widget markup could not be turned into a tree.
    #[error("parse error: {0}")]
    Parse(String),

    /// The navigation container was not found in the page.
    #[error("structural error: {0}")]
    Structural(String),
}

impl UnitError {
    pub fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Access {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Access { .. } => "access",
            Self::Parse(_) => "parse",
            Self::Structural(_) => "structural",
        }
    }
}

/// Invalid invocation parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting '{0}'")]
    Missing(&'static str),

    #[error("invalid directory pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    #[error("root directory '{}' does not exist or is not a directory", .0.display())]
    MissingRoot(PathBuf),

    #[error("job count must be at least 1")]
    InvalidJobs,

    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}
