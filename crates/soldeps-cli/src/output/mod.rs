//! Output formatting for the analyze command.
//!
//! Results print either as a human-readable summary or as the full JSON
//! result for programmatic use. The `--output` export wraps the result in a
//! timestamped [`ExportDocument`].
//!
//! Submodules:
//! - [`color`]: Color and styling helpers

pub mod color;

use chrono::{DateTime, Utc};
use serde::Serialize;
use soldeps::analysis::AnalysisResult;
use soldeps::config::AnalysisConfig;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};

use color::{bold, colorize_band, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `SOLDEPS_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("SOLDEPS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }

    /// Configuration with colors disabled.
    #[must_use]
    pub fn plain() -> Self {
        Self { use_colors: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Output mode for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Export Document
// ============================================================================

/// Envelope written by `--output`.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    /// When the export was produced
    pub generated_at: DateTime<Utc>,

    /// The full analysis result
    pub analysis: &'a AnalysisResult,
}

impl<'a> ExportDocument<'a> {
    /// Wrap a result, stamped with the current time.
    #[must_use]
    pub fn new(analysis: &'a AnalysisResult) -> Self {
        Self {
            generated_at: Utc::now(),
            analysis,
        }
    }

    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print an analysis result in the specified format
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_analysis(
    result: &AnalysisResult,
    analysis_config: &AnalysisConfig,
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            write_summary(&mut handle, result, analysis_config, &OutputConfig::from_env())
        }
        OutputMode::Json => write_json(&mut handle, result),
    }
}

/// Write the full result as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(w: &mut W, result: &AnalysisResult) -> io::Result<()> {
    let json = result.to_json().map_err(io::Error::other)?;
    writeln!(w, "{json}")
}

// ============================================================================
// Text Summary
// ============================================================================

/// Write a human-readable summary of a result.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_summary<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    analysis_config: &AnalysisConfig,
    config: &OutputConfig,
) -> io::Result<()> {
    write_overview(w, result, analysis_config, config)?;
    write_type_counts(w, result, config)?;
    write_most_connected(w, result, config)?;
    write_cycles(w, result, config)?;
    write_missing(w, result, config)?;
    write_layers(w, result, config)?;
    write_warnings(w, result, config)
}

fn write_overview<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    analysis_config: &AnalysisConfig,
    config: &OutputConfig,
) -> io::Result<()> {
    let metrics = result.metrics();
    let precision = usize::try_from(analysis_config.score_precision).unwrap_or(1);
    let band = result.complexity_band(analysis_config);

    writeln!(w, "{}", bold("Solution analysis", config))?;
    write!(w, "  {} {}", dimmed("Components:  ", config), metrics.total_components)?;
    if metrics.virtual_components > 0 {
        write!(
            w,
            " {}",
            dimmed(&format!("(+{} not in solution)", metrics.virtual_components), config)
        )?;
    }
    writeln!(w)?;
    writeln!(w, "  {} {}", dimmed("Dependencies:", config), metrics.total_edges)?;
    writeln!(
        w,
        "  {} {:.*} ({})",
        dimmed("Complexity:  ", config),
        precision,
        metrics.complexity_score,
        colorize_band(band, config)
    )?;
    writeln!(
        w,
        "  {} {:.2}",
        dimmed("Avg fan-out: ", config),
        metrics.average_out_degree
    )
}

fn write_type_counts<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    config: &OutputConfig,
) -> io::Result<()> {
    let counts = &result.metrics().type_counts;
    if counts.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(w, "{}", bold("Component types", config))?;
    for (kind, count) in counts {
        writeln!(w, "  {:<14}{count:>5}", kind.to_string())?;
    }
    Ok(())
}

fn write_most_connected<W: Write>(
    w: &mut W,
    result: &AnalysisResult,
    config: &OutputConfig,
) -> io::Result<()> {
    let ranked = &result.metrics().most_connected;
    if ranked.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(w, "{}", bold("Most connected", config))?;
    for (rank, entry) in ranked.iter().enumerate() {
        writeln!(
            w,
            "  {}. {} {} {} connections (out {}, in {})",
            rank + 1,
            info(entry.id.as_str(), config),
            dimmed(&format!("[{}]", entry.component_type), config),
            entry.connections(),
            entry.out_degree,
            entry.in_degree
        )?;
    }
    Ok(())
}

fn write_cycles<W: Write>(w: &mut W, result: &AnalysisResult, config: &OutputConfig) -> io::Result<()> {
    let cycles = result.cycles();

    writeln!(w)?;
    if cycles.is_empty() {
        return writeln!(w, "{}", success("No circular references", config));
    }

    let header = format!(
        "Circular references ({} chains, {} components)",
        cycles.len(),
        result.metrics().circular_components
    );
    writeln!(w, "{}", error(&header, config))?;
    for chain in cycles {
        writeln!(w, "  {chain}")?;
    }
    Ok(())
}

fn write_missing<W: Write>(w: &mut W, result: &AnalysisResult, config: &OutputConfig) -> io::Result<()> {
    let missing = result.missing();
    if missing.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(
        w,
        "{}",
        warning(&format!("Missing references ({})", missing.len()), config)
    )?;
    for reference in missing {
        writeln!(
            w,
            "  {} -> {}",
            info(reference.from.as_str(), config),
            dimmed(reference.to.as_str(), config)
        )?;
    }
    Ok(())
}

fn write_layers<W: Write>(w: &mut W, result: &AnalysisResult, config: &OutputConfig) -> io::Result<()> {
    let layering = result.layering();

    writeln!(w)?;
    writeln!(w, "{}", bold("Layers", config))?;
    for (depth, ring) in layering.rings().iter().enumerate() {
        writeln!(w, "  {depth:>3}: {}", ring.len())?;
    }
    writeln!(
        w,
        "  {} roots, {} orphaned",
        layering.roots.len(),
        layering.orphaned.len()
    )
}

fn write_warnings<W: Write>(w: &mut W, result: &AnalysisResult, config: &OutputConfig) -> io::Result<()> {
    let warnings = result.warnings();
    if warnings.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(
        w,
        "{}",
        warning(&format!("Warnings ({})", warnings.len()), config)
    )?;
    for item in warnings {
        writeln!(w, "  {}", item.description())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soldeps::analyze;
    use soldeps::domain::{DependencyFact, RawComponent};

    fn sample() -> AnalysisResult {
        analyze(
            vec![
                RawComponent::new("account", "entity", "account"),
                RawComponent::new("form", "form", "account_main"),
                RawComponent::new("flow", "workflow", "welcome"),
                RawComponent::new("plugin", "plugin", "AccountPlugin"),
                RawComponent::new("map", "sitemap", "map"),
            ],
            vec![
                DependencyFact::new("form", "account"),
                DependencyFact::new("form", "new_/lib.js"),
                DependencyFact::new("flow", "plugin"),
                DependencyFact::new("plugin", "flow"),
            ],
        )
        .unwrap()
    }

    fn render(result: &AnalysisResult) -> String {
        let mut buf = Vec::new();
        write_summary(&mut buf, result, &AnalysisConfig::default(), &OutputConfig::plain()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_lists_every_finding() {
        let text = render(&sample());

        assert!(text.contains("Components:   5 (+1 not in solution)"));
        assert!(text.contains("Dependencies: 4"));
        assert!(text.contains("Complexity:   18.0 (low)"));
        assert!(text.contains("Circular references (1 chains, 2 components)"));
        assert!(text.contains("flow -> plugin -> flow"));
        assert!(text.contains("form -> new_/lib.js"));
        assert!(text.contains("unknown type 'sitemap'"));
        assert!(text.contains("1. form [form] 2 connections (out 2, in 0)"));
    }

    #[test]
    fn summary_reports_clean_solution() {
        let result = analyze(
            vec![RawComponent::new("a", "entity", "a")],
            vec![],
        )
        .unwrap();
        let text = render(&result);

        assert!(text.contains("No circular references"));
        assert!(!text.contains("Missing references"));
        assert!(!text.contains("Warnings"));
        assert!(text.contains("1 roots, 0 orphaned"));
    }

    #[test]
    fn plain_summary_has_no_escape_codes() {
        assert!(!render(&sample()).contains('\u{1b}'));
    }

    #[test]
    fn json_output_round_trips() {
        let result = sample();
        let mut buf = Vec::new();
        write_json(&mut buf, &result).unwrap();

        let restored = AnalysisResult::from_json(std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(restored, result);
    }

    #[test]
    fn export_document_wraps_result() {
        let result = sample();
        let json = ExportDocument::new(&result).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["generated_at"].is_string());
        assert!(value["analysis"]["cycles"].is_array());
    }
}
