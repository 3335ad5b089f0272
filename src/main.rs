//! simple-redirector
//!
//! Answers requests for retired hosts and paths with a redirect to their
//! new location, or with a page announcing the move.

use std::process::ExitCode;

use clap::Parser;

use simple_redirector::cli::{Cli, Command};
use simple_redirector::config::load_mapping;
use simple_redirector::lifecycle::startup::{self, EXIT_BAD_MAPPING_FILE, EXIT_TLS_ERROR};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run(args) => match args.into_config() {
            Ok(config) => match startup::start(config).await {
                Ok(()) => 0,
                Err(e) => {
                    tracing::error!(error = %e, "Exiting due to error");
                    eprintln!("Error: {e}");
                    e.exit_code()
                }
            },
            Err(e) => {
                eprintln!("Error: {e}");
                EXIT_TLS_ERROR
            }
        },
        Command::Validate(args) => match load_mapping(&args.mapping_path) {
            Ok(table) => {
                println!(
                    "{}: {} hosts, {} entries",
                    args.mapping_path.display(),
                    table.len(),
                    table.entry_count()
                );
                0
            }
            Err(e) if e.is_parse_error() => {
                eprintln!("{}: not a readable mapping document: {e}", args.mapping_path.display());
                EXIT_BAD_MAPPING_FILE
            }
            Err(e) => {
                eprintln!("{}: {e}", args.mapping_path.display());
                EXIT_BAD_MAPPING_FILE
            }
        },
    };

    ExitCode::from(code as u8)
}
