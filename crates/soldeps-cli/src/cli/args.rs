//! CLI argument structs.

use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `analyze` command
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// JSON list of solution components
    ///
    /// Each record needs a string `id`; `name`, `logicalName`, `type` and
    /// `isManaged` are optional. A numeric `type` is read as a platform
    /// solution-component type code.
    #[arg(short, long, value_name = "FILE")]
    pub components: PathBuf,

    /// JSON list of `{"from": ..., "to": ...}` dependency facts
    #[arg(short, long, value_name = "FILE")]
    pub dependencies: Option<PathBuf>,

    /// JSON list of type-specific reference payloads
    #[arg(short, long, value_name = "FILE")]
    pub payloads: Option<PathBuf>,

    /// YAML analysis configuration
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of components in the most-connected ranking
    ///
    /// Overrides `top-connected` from the configuration file.
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub top: Option<u16>,

    /// Write a timestamped JSON export of the full result to FILE
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}
