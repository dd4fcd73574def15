//! # SEAMM Utilities
//!
//! Support code for SEAMM scientific workflows.
//!
//! Input files for simulation codes are often assembled from pieces: a main
//! input that pulls in force-field fragments, shared parameter blocks or
//! generated coordinates through `#include` lines, some of them stored
//! gzip- or bzip2-compressed. [`IncludeReader`] presents such a document as a
//! single stream of lines while remembering, for every line, which file and
//! line number it came from, so parsers can report errors with a full
//! "included from" chain.
//!
//! ```no_run
//! use seamm_util::IncludeReader;
//!
//! let mut reader = IncludeReader::builder("job.inp").build()?;
//! reader.open()?;
//! for line in reader.by_ref() {
//!     let line = line?;
//!     println!("{}", line);
//! }
//! reader.close();
//! # Ok::<_, seamm_util::IncludeError>(())
//! ```

pub mod core;

pub use crate::core::io::compression::{Compression, logical_extension};
pub use crate::core::io::error::{ConfigError, IncludeError};
pub use crate::core::io::header::{FileHeader, HeaderError, read_header};
pub use crate::core::io::include::{IncludeReader, IncludeReaderBuilder, ReadMode, VisitedFile};
pub use crate::core::io::logger::{NullLogger, ReaderLogger, TracingLogger};
pub use crate::core::io::resolver::{IdentityResolver, ResolveError, SchemeResolver, UriResolver};
