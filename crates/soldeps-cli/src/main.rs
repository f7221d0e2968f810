//! Soldeps CLI binary.

use soldeps_cli::cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Main entry point for the soldeps CLI.
///
/// Input files are independent, so a current_thread runtime is enough to
/// read them concurrently.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Example: RUST_LOG=soldeps=debug soldeps analyze --components c.json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("soldeps=info,soldeps_cli=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting soldeps CLI");

    let cli = Cli::parse_args();
    match cli.execute().await {
        Ok(()) => {
            tracing::debug!("Soldeps CLI completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("analysis failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}
