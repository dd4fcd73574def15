pub mod cat;
pub mod ext;
pub mod files;
pub mod header;

use crate::error::CliError;
use seamm_util::{IncludeError, IncludeReader};

/// Wraps a read error with the include chain that was active when it happened.
pub(crate) fn with_trace(reader: &IncludeReader, error: IncludeError) -> CliError {
    let stack = reader.stack();
    if stack.is_empty() {
        return CliError::Include(error);
    }
    let trace = stack
        .iter()
        .enumerate()
        .map(|(i, location)| {
            if i == 0 {
                format!("  in {}", location)
            } else {
                format!("  included from {}", location)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    CliError::IncludeTrace {
        source: error,
        trace,
    }
}
