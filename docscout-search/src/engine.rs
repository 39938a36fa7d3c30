//! Trait definitions for the pluggable pipeline seams.
//!
//! [`SearchBackend`] turns a query into ranked results and
//! [`ContentSource`] turns a URL into extracted page text. The concrete
//! network implementations live in [`crate::engines`] and
//! [`crate::fetcher`]; tests and callers can substitute their own.

use std::future::Future;

use crate::error::SearchError;
use crate::types::{FetchedContent, Query, SearchResult};

/// A search provider returning results in rank order.
///
/// Implementors handle their own:
///
/// - request construction and authentication
/// - retry/backoff on rate limiting and transient failures
/// - response parsing into [`SearchResult`] values with 1-based `rank`
///
/// All implementations must be `Send + Sync` so one instance can serve
/// concurrent queries.
pub trait SearchBackend: Send + Sync {
    /// Perform a search and return results in provider rank order.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Auth`] if the credential is rejected (never retried)
    /// - [`SearchError::RateLimited`] once rate-limit retries are exhausted
    /// - [`SearchError::Provider`] for server/transport failures after retries
    fn search(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Short provider name used in logs.
    fn name(&self) -> &'static str;
}

/// A source of readable page content.
///
/// `fetch` never fails: network and parse problems are reported through
/// [`FetchedContent::fetch_status`].
pub trait ContentSource: Send + Sync {
    /// Fetch `url` and extract its readable text.
    fn fetch(&self, url: &str) -> impl Future<Output = FetchedContent> + Send;
}
