//! Error types for the docscout-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. No API keys or sensitive data appear in
//! error messages.
//!
//! Per-URL fetch failures have no variant here: they are reported as
//! [`crate::types::FetchStatus`] data so that one bad link never fails a
//! batch.

/// Errors that can occur during search, fetch orchestration, or fallback.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search provider rejected the credential (HTTP 401/403).
    ///
    /// Not retryable: this is a configuration problem.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The search provider kept answering HTTP 429 until retries ran out.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The search provider failed (5xx, transport error, or unexpected 4xx).
    #[error("search provider error: {0}")]
    Provider(String),

    /// The fallback language model could not produce an answer.
    #[error("fallback model error: {0}")]
    Model(String),

    /// An overall deadline elapsed before the operation finished.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// An HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a provider or model response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration or call arguments.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Returns true if this error represents a transient failure that a
    /// caller could retry later.
    ///
    /// `RateLimited`, `Provider`, `Timeout` and `Model` are transient.
    /// `Auth`, `Http`, `Parse` and `Config` need a fix rather than a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Provider(_) | Self::Timeout(_) | Self::Model(_) => true,
            Self::Auth(_) | Self::Http(_) | Self::Parse(_) | Self::Config(_) => false,
        }
    }

    /// Returns true if the documentation flow may absorb this search-side
    /// error and continue as if the provider returned zero results.
    pub fn degrades_to_empty(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Provider(_) | Self::Parse(_) | Self::Timeout(_)
        )
    }
}

/// Convenience type alias for docscout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
