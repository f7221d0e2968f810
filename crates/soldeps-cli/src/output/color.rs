//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Low:      green  (no findings, low complexity)
//!   - Warning/Moderate: yellow (warnings, moderate complexity)
//!   - Error/High:       red    (circular chains, high complexity)
//!   - Info/Reference:   cyan   (component ids)
//!   - Muted:            dimmed (labels, virtual components)
//!   - Emphasis:         bold   (section headers)

use colored::Colorize;
use soldeps::metrics::ComplexityBand;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
#[must_use]
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
#[must_use]
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
#[must_use]
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
#[must_use]
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Color a complexity band label by severity.
pub(crate) fn colorize_band(band: ComplexityBand, config: &OutputConfig) -> String {
    let text = band.to_string();
    match band {
        ComplexityBand::Low => success(&text, config),
        ComplexityBand::Moderate => warning(&text, config),
        ComplexityBand::High => error(&text, config),
    }
}
