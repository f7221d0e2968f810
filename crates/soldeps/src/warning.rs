//! Non-fatal warnings raised while normalizing and assembling input.
//!
//! A warning means some input record was overwritten, reinterpreted or
//! skipped, but the pipeline continued and still produced a complete
//! [`crate::analysis::AnalysisResult`]. Every warning is also emitted as a
//! `tracing` event at the point it is raised.

use crate::domain::ComponentId;
use serde::{Deserialize, Serialize};

/// A recoverable data-quality problem found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// Two catalog records shared an id.
    ///
    /// **Effect**: The later record replaces the earlier one, keeping the
    /// earlier record's position in catalog order.
    DuplicateComponent {
        /// The repeated id
        id: ComponentId,
    },

    /// A catalog record had a type discriminator that names no known type.
    ///
    /// **Effect**: The component is kept with type `Other`.
    UnknownComponentType {
        /// The component carrying the discriminator
        id: ComponentId,
        /// The discriminator as received
        discriminator: String,
    },

    /// A dependency fact's source is not a catalog component.
    ///
    /// **Effect**: The fact is dropped; it cannot anchor an edge.
    UnknownSource {
        /// The unknown source id
        from: ComponentId,
        /// The fact's target id
        to: ComponentId,
    },
}

impl AnalysisWarning {
    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::DuplicateComponent { id } => {
                format!("duplicate component id {id}: later record kept")
            }
            Self::UnknownComponentType { id, discriminator } => {
                format!("component {id}: unknown type '{discriminator}', treated as other")
            }
            Self::UnknownSource { from, to } => {
                format!("dependency {from} -> {to} skipped: unknown source component")
            }
        }
    }
}
