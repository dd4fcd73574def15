mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("SEAMM utilities v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Cat(args) => {
            info!("Dispatching to 'cat' command.");
            commands::cat::run(args)
        }
        Commands::Files(args) => {
            info!("Dispatching to 'files' command.");
            commands::files::run(args)
        }
        Commands::Ext(args) => {
            info!("Dispatching to 'ext' command.");
            commands::ext::run(args)
        }
        Commands::Header(args) => {
            info!("Dispatching to 'header' command.");
            commands::header::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }

    command_result
}
