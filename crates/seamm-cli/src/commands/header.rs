use crate::cli::HeaderArgs;
use crate::error::Result;
use seamm_util::{FileHeader, read_header};
use tracing::debug;

pub fn run(args: HeaderArgs) -> Result<()> {
    let compression = args.compression;
    debug!(
        "Reading header of {:?} (compression: {})",
        args.input,
        compression.map_or_else(|| "auto".to_string(), |c| c.to_string())
    );
    let header = read_header(&args.input, compression)?;
    println!("{}", render(&header));
    Ok(())
}

fn render(header: &FileHeader) -> String {
    format!(
        "organization: {}\nfile type:    {}\nversion:      {}",
        header.organization, header.filetype, header.version
    )
}
