//! Implementation of the `analyze` command.
//!
//! Input documents are read concurrently, parsed with the engine's input
//! parsers, and analyzed in one call. Any unreadable or malformed document
//! aborts the command before analysis starts.

use anyhow::{Context, Result};
use soldeps::analysis::{AnalysisResult, Analyzer};
use soldeps::config::AnalysisConfig;
use soldeps::input::{parse_components, parse_facts, parse_payloads};
use std::path::Path;
use tokio::fs;

use crate::cli::AnalyzeArgs;
use crate::output::{self, ExportDocument, OutputMode};

/// Raw text of every input document.
#[derive(Debug, Default)]
pub struct InputDocuments {
    /// Component list
    pub components: String,
    /// Dependency fact list, if given
    pub dependencies: Option<String>,
    /// Reference payload list, if given
    pub payloads: Option<String>,
    /// YAML configuration, if given
    pub config: Option<String>,
}

/// Execute the analyze command
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the export
/// cannot be written.
pub async fn execute(args: &AnalyzeArgs, output_mode: OutputMode) -> Result<()> {
    let documents = load_documents(args).await?;
    let config = resolve_config(documents.config.as_deref(), args.top)?;
    let result = run(&documents, config.clone())?;

    if let Some(path) = &args.output {
        write_export(path, &result).await?;
    }

    output::print_analysis(&result, &config, output_mode)?;
    Ok(())
}

/// Read every input document named by the arguments.
///
/// # Errors
///
/// Returns an error naming the first file that could not be read.
pub async fn load_documents(args: &AnalyzeArgs) -> Result<InputDocuments> {
    let (components, dependencies, payloads, config) = tokio::try_join!(
        read_document(&args.components),
        read_optional(args.dependencies.as_deref()),
        read_optional(args.payloads.as_deref()),
        read_optional(args.config.as_deref()),
    )?;

    tracing::debug!(
        components = %args.components.display(),
        dependencies = dependencies.is_some(),
        payloads = payloads.is_some(),
        config = config.is_some(),
        "Loaded input documents"
    );

    Ok(InputDocuments {
        components,
        dependencies,
        payloads,
        config,
    })
}

/// Build the analysis configuration from optional YAML and a `--top` override.
///
/// # Errors
///
/// Returns an error if the YAML is malformed.
pub fn resolve_config(yaml: Option<&str>, top: Option<u16>) -> Result<AnalysisConfig> {
    let mut config = match yaml {
        Some(text) => AnalysisConfig::from_yaml_str(text).context("invalid configuration")?,
        None => AnalysisConfig::default(),
    };
    if let Some(top) = top {
        config.top_connected = usize::from(top);
    }
    Ok(config)
}

/// Parse the documents and run the analysis.
///
/// # Errors
///
/// Returns an error if any document is malformed.
pub fn run(documents: &InputDocuments, config: AnalysisConfig) -> Result<AnalysisResult> {
    let components = parse_components(&documents.components).context("invalid components")?;
    let facts = documents
        .dependencies
        .as_deref()
        .map(parse_facts)
        .transpose()
        .context("invalid dependencies")?
        .unwrap_or_default();
    let payloads = documents
        .payloads
        .as_deref()
        .map(parse_payloads)
        .transpose()
        .context("invalid payloads")?
        .unwrap_or_default();

    let result = Analyzer::new(config).analyze_with_payloads(components, facts, &payloads)?;

    for warning in result.warnings() {
        tracing::debug!(warning = %warning.description(), "Analysis warning");
    }
    Ok(result)
}

async fn write_export(path: &Path, result: &AnalysisResult) -> Result<()> {
    let json = ExportDocument::new(result).to_json()?;
    fs::write(path, format!("{json}\n"))
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote analysis export");
    Ok(())
}

async fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

async fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => read_document(path).await.map(Some),
        None => Ok(None),
    }
}
