//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `analyze`: Analyze a solution's components and dependencies
//!
//! # Global Flags
//!
//! - `--json`: Print the full analysis result as JSON
//!
//! # Example
//!
//! ```bash
//! soldeps analyze --components components.json --dependencies deps.json
//! soldeps --json analyze -c components.json -d deps.json --top 10
//! ```

mod args;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::AnalyzeArgs;

use crate::commands::analyze;
use crate::output::OutputMode;

/// Soldeps - dependency analysis for platform solutions
///
/// Builds the dependency graph of a solution, reports circular and missing
/// references, and summarizes how tangled the solution is.
#[derive(Parser, Debug)]
#[command(name = "soldeps")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze a solution
    ///
    /// Reads the component list and optional dependency and payload lists,
    /// then reports cycles, missing references, layers and metrics.
    Analyze(AnalyzeArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if an input file cannot be read or parsed, or the
    /// export cannot be written.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Commands::Analyze(args) => analyze::execute(args, output_mode).await,
        }
    }
}
