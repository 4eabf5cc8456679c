//! masqconf: dnsmasq effective-configuration engine
//!
//! Entry point for the masqconf command-line tool.

use std::process::ExitCode;

use masqconf::cli::Cli;

mod app;

use app::{exit_code, setup_tracing};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    setup_tracing(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    match runtime.block_on(app::execute(cli)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("Application error: {e}");
            exit_code::RUNTIME_ERROR
        }
    }
}
