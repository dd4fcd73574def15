//! Reading text input for SEAMM workflows.
//!
//! The centerpiece is [`include::IncludeReader`], a line reader that splices
//! the files named by include directives into the text that references them,
//! keeps track of where every line came from, and lets a parser push back the
//! last few lines it consumed. Every file it opens, root or included, is
//! decompressed on the fly when its name ends in `.gz` or `.bz2`.
//!
//! The supporting pieces are usable on their own:
//!
//! - [`compression`] - detecting and opening gzip/bzip2/plain files, and
//!   [`compression::logical_extension`] for content-type checks that ignore compression
//! - [`resolver`] - turning include references (including `scheme:` URIs) into paths
//! - [`logger`] - the diagnostics sink a reader reports through
//! - [`header`] - the `!organization filetype version` line of SEAMM data files

pub mod compression;
pub mod error;
pub mod header;
pub mod include;
pub mod logger;
pub mod resolver;
