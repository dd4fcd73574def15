//! # Core Module
//!
//! Building blocks shared by SEAMM workflow steps.
//!
//! - **File I/O** ([`io`]) - include-aware, compression-transparent text readers
//! - **Utilities** ([`utils`]) - path handling shared by the readers

pub mod io;
pub mod utils;
