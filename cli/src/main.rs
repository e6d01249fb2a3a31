//! Fleet CLI - start, stop and watch remote compute instances

use std::process::ExitCode;

use clap::Parser;
use fleet_cli::cli::Cli;
use fleet_cli::output::report_error;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "fleet_cli=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            if let Err(render) = report_error(&e, json) {
                eprintln!("Error: {e:#} ({render})");
            }
            ExitCode::FAILURE
        }
    }
}
