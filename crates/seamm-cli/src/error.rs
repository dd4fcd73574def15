use seamm_util::{HeaderError, IncludeError};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Include(#[from] IncludeError),

    /// A read failure inside an include chain, with the chain rendered.
    #[error("{source}\n{trace}")]
    IncludeTrace {
        #[source]
        source: IncludeError,
        trace: String,
    },

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
