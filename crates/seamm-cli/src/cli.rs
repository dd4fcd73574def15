use clap::{Args, Parser, Subcommand};
use seamm_util::Compression;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The Molecular Sciences Software Institute (MolSSI)",
    version,
    about = "SEAMM utilities - inspect and flatten SEAMM input files that use include directives and gzip/bzip2 compression.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a file with all of its includes spliced in.
    Cat(CatArgs),
    /// List every file a document pulls in, with the reference that named it.
    Files(FilesArgs),
    /// Print the extension of each name, ignoring a .gz or .bz2 suffix.
    Ext(ExtArgs),
    /// Print the SEAMM header line (organization, file type, version) of a file.
    Header(HeaderArgs),
}

/// Options controlling how a document and its includes are read.
#[derive(Args, Debug, Clone, Default)]
pub struct ReaderArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Token that starts an include directive (default: '#include').
    #[arg(long, value_name = "KEYWORD", conflicts_with = "no_include")]
    pub include: Option<String>,

    /// Treat include directives as ordinary lines.
    #[arg(long)]
    pub no_include: bool,

    /// Number of recent lines kept for push-back.
    #[arg(long, value_name = "INT")]
    pub history: Option<usize>,

    /// Resolve 'SCHEME:path' references against DIR. Can be used multiple times.
    /// Example: --uri data=/opt/seamm/data
    #[arg(long = "uri", value_name = "SCHEME=DIR")]
    pub uri_schemes: Vec<String>,
}

/// Arguments for the `cat` subcommand.
#[derive(Args, Debug)]
pub struct CatArgs {
    /// The file to read.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Prefix every line with the file and line number it came from.
    #[arg(short, long)]
    pub trace: bool,

    /// Copy each line's original terminator instead of writing '\n'.
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub reader: ReaderArgs,
}

/// Arguments for the `files` subcommand.
#[derive(Args, Debug)]
pub struct FilesArgs {
    /// The file to read.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    #[command(flatten)]
    pub reader: ReaderArgs,
}

/// Arguments for the `ext` subcommand.
#[derive(Args, Debug)]
pub struct ExtArgs {
    /// File names to inspect.
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<PathBuf>,
}

/// Arguments for the `header` subcommand.
#[derive(Args, Debug)]
pub struct HeaderArgs {
    /// The file to inspect.
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Override compression detection ('text', 'gzip' or 'bzip2').
    #[arg(long, value_name = "KIND", value_parser = parse_compression)]
    pub compression: Option<Compression>,
}

fn parse_compression(value: &str) -> Result<Compression, String> {
    value.parse::<Compression>().map_err(|e| e.to_string())
}
