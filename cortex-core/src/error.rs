//! Error types for the Cortex engine.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Cortex operations.
///
/// Scoring, recall, reasoning, and affect updates are total and never fail;
/// errors only arise at the configuration and persistence boundaries.
#[derive(Error, Debug)]
pub enum CortexError {
    /// A persisted state file exists but its content could not be parsed.
    #[error("Malformed state file {}: {source}", path.display())]
    StateLoad {
        /// The file that failed to parse.
        path: PathBuf,
        /// Underlying JSON decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization failure while encoding state for a save.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CortexError {
    /// Whether this error is the malformed-state kind that callers are
    /// expected to recover from by starting empty.
    #[must_use]
    pub fn is_state_load(&self) -> bool {
        matches!(self, Self::StateLoad { .. })
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CortexError>;
