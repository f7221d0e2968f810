//! Error types for soldeps operations.
//!
//! Only structural failures surface as [`Error`]. Data-quality problems that
//! the pipeline can route around (duplicate ids, unknown component types,
//! dangling sources) are reported as [`crate::warning::AnalysisWarning`]
//! values instead, and a dangling *target* is not a problem at all: it
//! becomes a [`crate::graph::MissingReference`].
//!
//! The library never touches the filesystem; reading input files is the
//! caller's concern.

use thiserror::Error;

/// The error type for soldeps operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input records do not have the expected shape.
    ///
    /// The pipeline fails fast on these rather than building a partial
    /// graph whose invariants cannot be guaranteed.
    #[error("invalid input: {context}: {message}")]
    InvalidInput {
        /// Where in the input the problem was found (e.g. `components[3].id`)
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// A serialized analysis result violates graph invariants.
    #[error("invalid analysis snapshot: {0}")]
    InvalidSnapshot(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an [`Error::InvalidInput`] for the given input location.
    pub fn invalid_input(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for soldeps operations.
pub type Result<T> = std::result::Result<T, Error>;
