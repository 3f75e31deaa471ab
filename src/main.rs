//! pycefrl CLI entry point.

use clap::Parser;
use pycefrl::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Analyze(args) => cli::run_analyze(args),
        Commands::Init(args) => cli::run_init(args),
        Commands::Catalog(args) => cli::run_catalog(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
