//! Analysis configuration.
//!
//! Configuration is plain data with defaults for every field, so an empty
//! YAML document is a valid configuration. Keys are kebab-case:
//!
//! ```yaml
//! top-connected: 10
//! score-precision: 2
//! complexity-bands:
//!   moderate: 25.0
//!   high: 60.0
//! ```

use crate::error::Result;
use crate::metrics::ComplexityBands;
use serde::{Deserialize, Serialize};

/// Default number of entries in the most-connected ranking.
pub const DEFAULT_TOP_CONNECTED: usize = 5;

/// Default number of decimal places kept in the complexity score.
pub const DEFAULT_SCORE_PRECISION: u32 = 1;

/// Tunable analysis policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisConfig {
    /// How many components the most-connected ranking keeps
    pub top_connected: usize,

    /// Decimal places kept when rounding the complexity score
    pub score_precision: u32,

    /// Thresholds for qualitative complexity bands
    pub complexity_bands: ComplexityBands,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_connected: DEFAULT_TOP_CONNECTED,
            score_precision: DEFAULT_SCORE_PRECISION,
            complexity_bands: ComplexityBands::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Config`] if the text is not valid YAML
    /// or a key has the wrong type.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Render configuration as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Config`] if serialization fails.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
