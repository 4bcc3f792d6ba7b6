//! Error types for heron operations.
//!
//! Expected business-rule outcomes (suppressions, validation findings) are
//! returned as data, never as errors. `HeronError` covers only fail-closed
//! structural rejection and invocation-level problems.

use thiserror::Error;

/// Result type alias for heron operations.
pub type HeronResult<T> = Result<T, HeronError>;

/// Main error type for all heron operations.
#[derive(Error, Debug)]
pub enum HeronError {
    /// The orchestrator was invoked with a mode it must reject.
    ///
    /// Only the literal mode `"trial"` is accepted; `"live"` is reserved for
    /// a cutover phase that is not yet integrated, and everything else fails
    /// closed with zero side effects.
    #[error(
        "mode \"{mode}\" is not permitted: only mode=\"trial\" is accepted \
         (\"live\" is reserved for a later cutover phase)"
    )]
    ModeNotPermitted { mode: String },

    /// A registry document could not be interpreted.
    #[error("Registry error: {0}")]
    Registry(String),

    /// Invocation-level problem (bad flag value at the CLI seam).
    #[error("Invocation error: {0}")]
    Invocation(String),

    /// IO error (CLI seam: registry/state file loading).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HeronError {
    /// Create a mode-rejection error.
    pub fn mode_not_permitted(mode: impl Into<String>) -> Self {
        Self::ModeNotPermitted { mode: mode.into() }
    }

    /// Create a registry error.
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }

    /// Create an invocation error.
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation(message.into())
    }
}
