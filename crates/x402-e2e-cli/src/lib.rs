//! Library surface behind the `x402-e2e` binary: argument parsing, env-var
//! validation, logging setup, and the orchestrator itself, split out so
//! integration tests can drive [`orchestrator::run_with_factory`] directly
//! instead of shelling out to the compiled binary.

pub mod cli;
pub mod env_check;
pub mod error;
pub mod logging;
pub mod orchestrator;

use clap::Parser;

/// Parses arguments, sets up logging, runs the orchestrator, and returns
/// the process exit code the caller should use.
pub async fn run() -> std::io::Result<i32> {
    let cli = cli::Cli::parse();
    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    match orchestrator::run(&cli).await {
        Ok(results) => Ok(if results.iter().any(|r| !r.passed) { 1 } else { 0 }),
        Err(err) => {
            eprintln!("Error: {err}");
            Ok(1)
        }
    }
}
