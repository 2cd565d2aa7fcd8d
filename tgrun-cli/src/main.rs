// tgrun-cli/src/main.rs
//
// Entry point for the `tgrun` binary: parses arguments, sets up logging,
// runs the selected command and exits with the tool's exit code.

use clap::Parser;
use log::debug;
use std::process;

use tgrun_cli::error::exit_code_for;
use tgrun_cli::logging::init_logging;
use tgrun_cli::{Cli, Commands, run_check, run_convert, run_spoof};
use tgrun_core::ModuleRegistry;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.log_file.as_deref(), cli.global.verbose) {
        eprintln!("Error: failed to initialize logging: {e:#}");
        process::exit(1);
    }
    debug!("Parsed arguments: {cli:?}");

    // The binary has no compiled-in tool entry point; only the external form
    // can resolve.
    let registry = ModuleRegistry::new();
    let result = match &cli.command {
        Commands::Convert(cmd) => run_convert(&cli.global, cmd, registry),
        Commands::Spoof(cmd) => run_spoof(&cli.global, cmd, registry),
        Commands::Check => run_check(&cli.global, registry),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(exit_code_for(&e));
        }
    }
}
