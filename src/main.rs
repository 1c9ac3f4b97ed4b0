//! Main entry point for tabmerge CLI

use clap::Parser;
use tabmerge::cli::Cli;
use tabmerge::commands::execute_command;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging, verbose raises the default level
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = execute_command(cli.command, cli.dsn.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
