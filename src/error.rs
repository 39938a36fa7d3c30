//! Error types for the docscout tool layer.

use docscout_search::SearchError;

/// Top-level error type for configuration loading and tool execution.
#[derive(Debug, thiserror::Error)]
pub enum DocscoutError {
    /// Configuration file could not be parsed or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Error from the search pipeline.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Tool arguments failed validation.
    #[error("tool error: {0}")]
    Tool(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, DocscoutError>;
