use crate::cli::ExtArgs;
use crate::error::Result;
use seamm_util::logical_extension;
use std::io::{self, Write};

pub fn run(args: ExtArgs) -> Result<()> {
    let mut out = io::stdout().lock();
    for name in &args.names {
        let ext = logical_extension(name);
        if args.names.len() == 1 {
            writeln!(out, "{}", ext)?;
        } else {
            writeln!(out, "{}\t{}", name.display(), ext)?;
        }
    }
    Ok(())
}
