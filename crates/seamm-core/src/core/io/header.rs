use super::compression::Compression;
use std::fmt;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The identification line at the top of a SEAMM data file:
/// `!<organization> <filetype> <version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub organization: String,
    pub filetype: String,
    pub version: String,
}

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("I/O error reading '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Reading '{path}': the file is empty, expected a header line", path = path.display())]
    Empty { path: PathBuf },
    #[error("Reading '{path}': expected a header line but got '{line}'", path = path.display())]
    Malformed { path: PathBuf, line: String },
}

impl FileHeader {
    /// Parses a header line. Returns `None` unless the line starts with `!`
    /// and carries exactly three whitespace-separated fields.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('!')?;
        let mut fields = rest.split_whitespace();
        let organization = fields.next()?;
        let filetype = fields.next()?;
        let version = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        Some(Self {
            organization: organization.to_string(),
            filetype: filetype.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{} {} {}", self.organization, self.filetype, self.version)
    }
}

/// Reads and parses the header line of `path`, decompressing according to the
/// file extension unless `compression` is given explicitly.
pub fn read_header<P: AsRef<Path>>(
    path: P,
    compression: Option<Compression>,
) -> Result<FileHeader, HeaderError> {
    let path = path.as_ref();
    let compression = compression.unwrap_or_else(|| Compression::from_path(path));
    let io_error = |source| HeaderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = compression.open(path).map_err(io_error)?;
    let mut line = String::new();
    if reader.read_line(&mut line).map_err(io_error)? == 0 {
        return Err(HeaderError::Empty {
            path: path.to_path_buf(),
        });
    }
    let line = line.trim_end_matches(['\n', '\r']);

    let header = FileHeader::parse(line).ok_or_else(|| HeaderError::Malformed {
        path: path.to_path_buf(),
        line: line.to_string(),
    })?;
    tracing::info!(
        "reading '{}', a {} file from {}, version {}",
        path.display(),
        header.filetype,
        header.organization,
        header.version
    );
    Ok(header)
}
