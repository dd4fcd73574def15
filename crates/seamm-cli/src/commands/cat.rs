use super::with_trace;
use crate::cli::CatArgs;
use crate::config::ReaderConfig;
use crate::error::Result;
use seamm_util::IncludeReader;
use std::io::{self, BufWriter, Write};
use tracing::info;

pub fn run(args: CatArgs) -> Result<()> {
    let config = ReaderConfig::resolve(&args.reader)?;
    let mut reader = config
        .reader_builder(&args.input)
        .keep_line_endings(args.raw)
        .build()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = reader.scoped(|reader| write_document(reader, args.trace, &mut out))?;
    out.flush()?;

    info!(
        "Wrote {} lines from {} file(s).",
        written,
        reader.visited().len()
    );
    Ok(())
}

/// Streams the flattened document to `out`, returning the number of lines written.
///
/// A reader that keeps line endings is copied as is; otherwise every line
/// gets a `\n`.
pub fn write_document(
    reader: &mut IncludeReader,
    trace: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let mut written = 0;
    loop {
        let line = match reader.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(with_trace(reader, e)),
        };
        if trace {
            let location = reader.stack().into_iter().next().unwrap_or_default();
            write!(out, "{}: ", location)?;
        }
        out.write_all(line.as_bytes())?;
        if !reader.keeps_line_endings() {
            out.write_all(b"\n")?;
        }
        written += 1;
    }
    Ok(written)
}
