use super::with_trace;
use crate::cli::FilesArgs;
use crate::config::ReaderConfig;
use crate::error::Result;
use seamm_util::{IncludeReader, VisitedFile};
use std::io::{self, Write};

pub fn run(args: FilesArgs) -> Result<()> {
    let config = ReaderConfig::resolve(&args.reader)?;
    let mut reader = config.reader_builder(&args.input).build()?;
    let visited = collect_files(&mut reader)?;

    let mut out = io::stdout().lock();
    for file in &visited {
        writeln!(out, "{}", describe(file))?;
    }
    Ok(())
}

/// Reads the whole document and returns every file it opened, root first.
pub fn collect_files(reader: &mut IncludeReader) -> Result<Vec<VisitedFile>> {
    reader.scoped(|reader| {
        while reader
            .next_line()
            .map_err(|e| with_trace(reader, e))?
            .is_some()
        {}
        Ok(reader.visited().to_vec())
    })
}

pub fn describe(file: &VisitedFile) -> String {
    if file.reference.is_empty() {
        format!("{}", file.path.display())
    } else {
        format!("{} -> {}", file.reference, file.path.display())
    }
}
