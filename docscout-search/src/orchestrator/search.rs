//! Search → fetch → format pipeline for one query.
//!
//! # Pipeline
//!
//! 1. Query the [`SearchBackend`] (which retries and dedupes on its own)
//! 2. Keep at most the effective result count, in rank order
//! 3. Fetch every result page through the [`ContentSource`] with bounded
//!    concurrency; failures stay in place as [`FetchStatus`](crate::types::FetchStatus) data
//! 4. Format the pairs within the configured character budget

use std::time::Duration;

use crate::config::{FetchConfig, PipelineConfig};
use crate::engine::{ContentSource, SearchBackend};
use crate::engines::BraveSearchClient;
use crate::error::SearchError;
use crate::fetcher::{fetch_all, PageFetcher};
use crate::format::ContentFormatter;
use crate::types::{FetchedContent, FormattedBlock, Query, SearchResult};

use super::within_deadline;

/// A search result paired with the content fetched from its URL.
pub type ResultWithContent = (SearchResult, FetchedContent);

/// Drives queries through a search backend and a content source.
pub struct ResearchPipeline<S = BraveSearchClient, C = PageFetcher> {
    backend: S,
    source: C,
    formatter: ContentFormatter,
    fetch: FetchConfig,
    default_count: usize,
    overall_deadline: Option<Duration>,
}

impl ResearchPipeline<BraveSearchClient, PageFetcher> {
    /// Build the network-backed pipeline: Brave search plus HTTP page
    /// fetching.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if any section of `config` is
    /// invalid, including a missing search API key.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let backend = BraveSearchClient::new(config.search.clone())?;
        let source = PageFetcher::new(config.fetch.clone())?;
        Ok(Self::new(backend, source, config))
    }
}

impl<S: SearchBackend, C: ContentSource> ResearchPipeline<S, C> {
    /// Assemble a pipeline from explicit parts. Limits, budget and deadline
    /// come from `config`; its credentials are not used.
    pub fn new(backend: S, source: C, config: &PipelineConfig) -> Self {
        Self {
            backend,
            source,
            formatter: ContentFormatter::new(config.format.clone()),
            fetch: config.fetch.clone(),
            default_count: config.search.default_count,
            overall_deadline: config.overall_deadline(),
        }
    }

    /// The search backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn formatter(&self) -> &ContentFormatter {
        &self.formatter
    }

    pub(crate) fn overall_deadline(&self) -> Option<Duration> {
        self.overall_deadline
    }

    /// Ranked, deduplicated search results, cut to the query's effective
    /// count.
    ///
    /// # Errors
    ///
    /// Propagates the backend's error.
    pub async fn search_results(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        let count = query.effective_count(self.default_count);
        let mut results = self.backend.search(query).await?;
        results.truncate(count);
        tracing::debug!(
            backend = self.backend.name(),
            count = results.len(),
            "search results received"
        );
        Ok(results)
    }

    /// Search, then fetch every result page. The output is in rank order
    /// and has one entry per result, whether or not its fetch succeeded.
    ///
    /// # Errors
    ///
    /// Propagates the backend's error; fetch failures are data.
    pub async fn gather(&self, query: &Query) -> Result<Vec<ResultWithContent>, SearchError> {
        let results = self.search_results(query).await?;
        if results.is_empty() {
            return Ok(Vec::new());
        }

        let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
        let contents = fetch_all(&self.source, &urls, self.fetch.max_concurrency).await;
        Ok(results.into_iter().zip(contents).collect())
    }

    /// Search and return the results as a markdown list.
    ///
    /// # Errors
    ///
    /// Propagates the backend's error, or [`SearchError::Timeout`] if the
    /// overall deadline passes first.
    pub async fn search(&self, query: &Query) -> Result<String, SearchError> {
        Ok(self.search_block(query).await?.text)
    }

    /// Like [`search`](Self::search), keeping the section count so callers
    /// can tell an empty listing apart.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn search_block(&self, query: &Query) -> Result<FormattedBlock, SearchError> {
        tracing::trace!(query = %query.text, "plain search");
        within_deadline(self.overall_deadline, "search", async {
            let results = self.search_results(query).await?;
            Ok(self
                .formatter
                .format_result_list(&query.text, &results, self.formatter.budget()))
        })
        .await
    }

    /// Search, fetch every result and format the page text for an LLM
    /// prompt.
    ///
    /// # Errors
    ///
    /// Propagates the backend's error, or [`SearchError::Timeout`] if the
    /// overall deadline passes first.
    pub async fn get_content_for_llm(&self, query: &Query) -> Result<String, SearchError> {
        Ok(self.content_block(query).await?.text)
    }

    /// Like [`get_content_for_llm`](Self::get_content_for_llm), returning
    /// the whole [`FormattedBlock`].
    ///
    /// # Errors
    ///
    /// Same as [`get_content_for_llm`](Self::get_content_for_llm).
    pub async fn content_block(&self, query: &Query) -> Result<FormattedBlock, SearchError> {
        tracing::trace!(query = %query.text, "search with content");
        within_deadline(self.overall_deadline, "content search", async {
            let pairs = self.gather(query).await?;
            Ok(self.format_pairs(&format!("# Search Results for: {}", query.text), &pairs))
        })
        .await
    }

    pub(crate) fn format_pairs(&self, heading: &str, pairs: &[ResultWithContent]) -> FormattedBlock {
        let block = self
            .formatter
            .format(Some(heading), pairs, self.formatter.budget());
        tracing::debug!(
            sections = block.sections,
            chars = block.char_len(),
            truncated = block.truncated,
            "content formatted"
        );
        block
    }
}
