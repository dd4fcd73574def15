use super::resolver::ResolveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Unsupported read mode '{0}': only text reading ('r' or 'rt') is supported")]
    UnsupportedMode(String),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("File not found: '{path}'", path = path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to open '{path}': {source}", path = path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read line {line} of '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("Include directive at {path}:{line} does not name a file", path = path.display())]
    MissingReference { path: PathBuf, line: usize },

    #[error("Could not resolve '{reference}': {source}")]
    Resolve {
        reference: String,
        #[source]
        source: ResolveError,
    },

    #[error("Exceeded the currently available history: requested {requested} line(s), {available} available")]
    HistoryExceeded { requested: usize, available: usize },

    #[error("The reader is not open")]
    NotOpen,

    #[error("The reader is already open")]
    AlreadyOpen,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IncludeError {
    /// True for the errors that mean "a file the document needs is not there".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            IncludeError::NotFound { .. }
                | IncludeError::Resolve {
                    source: ResolveError::NotFound { .. },
                    ..
                }
        )
    }
}
