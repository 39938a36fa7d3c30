//! Documentation lookups with a language-model fallback.
//!
//! The resolver searches the web for `"{library} {topic} documentation"`,
//! fetches the hits, and keeps the web answer when enough pages came back
//! with enough text. Otherwise it asks the [`FallbackAnswerer`] and labels
//! the answer [`AnswerSource::FallbackModel`].

use crate::config::{PipelineConfig, ResolverConfig};
use crate::engine::{ContentSource, SearchBackend};
use crate::engines::BraveSearchClient;
use crate::error::SearchError;
use crate::fallback::{FallbackAnswerer, ModelFallback};
use crate::fetcher::PageFetcher;
use crate::format::{truncate_at_boundary, TRUNCATED_MARKER};
use crate::types::{AnswerSource, DocumentationAnswer, Query};

use super::search::{ResearchPipeline, ResultWithContent};
use super::within_deadline;

/// Why the web phase was judged insufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortfall {
    NoResults,
    TooFewFetches { ok: usize },
    TooLittleText { chars: usize },
    DeadlineExpired,
}

/// Builds documentation answers from the web, falling back to a model.
pub struct DocumentationResolver<S = BraveSearchClient, C = PageFetcher, A = ModelFallback> {
    pipeline: ResearchPipeline<S, C>,
    answerer: A,
    thresholds: ResolverConfig,
}

impl DocumentationResolver<BraveSearchClient, PageFetcher, ModelFallback> {
    /// Build the network-backed resolver.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if any section of `config`
    /// (including the fallback section) is invalid.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, SearchError> {
        let pipeline = ResearchPipeline::from_config(config)?;
        let answerer = ModelFallback::new(config.fallback.clone())?;
        Ok(Self::new(pipeline, answerer, config.resolver.clone()))
    }
}

impl<S: SearchBackend, C: ContentSource, A: FallbackAnswerer> DocumentationResolver<S, C, A> {
    pub fn new(pipeline: ResearchPipeline<S, C>, answerer: A, thresholds: ResolverConfig) -> Self {
        Self {
            pipeline,
            answerer,
            thresholds,
        }
    }

    /// The underlying search pipeline.
    pub fn pipeline(&self) -> &ResearchPipeline<S, C> {
        &self.pipeline
    }

    /// Look up documentation for `topic` in `library`, fetching at most
    /// `count` pages.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Config`] if `library` or `topic` is blank
    /// - [`SearchError::Auth`] if the search provider rejects the credential
    /// - [`SearchError::Model`] if the fallback was needed and failed
    ///
    /// Rate limiting, provider outages, malformed provider responses and
    /// an expired deadline all lead to the fallback instead of an error.
    pub async fn resolve_documentation(
        &self,
        library: &str,
        topic: &str,
        count: usize,
    ) -> Result<DocumentationAnswer, SearchError> {
        let library = library.trim();
        let topic = topic.trim();
        if library.is_empty() || topic.is_empty() {
            return Err(SearchError::Config(
                "library and topic must both be non-empty".into(),
            ));
        }

        let query_text = format!("{library} {topic} documentation");
        let query = Query::new(&query_text)
            .with_count(count)
            .with_library(library);
        tracing::trace!(library, topic, count, "documentation lookup");

        let pairs = match within_deadline(
            self.pipeline.overall_deadline(),
            "documentation web phase",
            self.web_phase(&query),
        )
        .await
        {
            Ok(pairs) => Ok(pairs),
            Err(SearchError::Timeout(_)) => Err(Shortfall::DeadlineExpired),
            Err(e) => return Err(e),
        };

        match pairs.and_then(|pairs| self.check_adequacy(pairs)) {
            Ok(pairs) => {
                let heading = format!("# Documentation Results for: {query_text}");
                let block = self.pipeline.format_pairs(&heading, &pairs);
                tracing::debug!(sections = block.sections, "documentation answered from the web");
                Ok(DocumentationAnswer {
                    source: AnswerSource::Web,
                    formatted_content: block.text,
                    result_count: block.sections,
                })
            }
            Err(shortfall) => {
                tracing::warn!(library, topic, reason = ?shortfall, "web results insufficient, using fallback model");
                self.fallback(library, topic).await
            }
        }
    }

    /// Search and fetch. Search failures that only mean "no results right
    /// now" are logged and become an empty list; credential and
    /// configuration errors propagate.
    async fn web_phase(&self, query: &Query) -> Result<Vec<ResultWithContent>, SearchError> {
        match self.pipeline.gather(query).await {
            Ok(pairs) => Ok(pairs),
            Err(e) if e.degrades_to_empty() => {
                tracing::warn!(error = %e, "documentation search failed, treating as no results");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn check_adequacy(
        &self,
        pairs: Vec<ResultWithContent>,
    ) -> Result<Vec<ResultWithContent>, Shortfall> {
        if pairs.is_empty() {
            return Err(Shortfall::NoResults);
        }
        let ok = pairs.iter().filter(|(_, c)| c.is_ok()).count();
        if ok < self.thresholds.min_successful_fetches {
            return Err(Shortfall::TooFewFetches { ok });
        }
        let chars: usize = pairs
            .iter()
            .map(|(_, c)| c.extracted_text().chars().count())
            .sum();
        if chars < self.thresholds.min_total_chars {
            return Err(Shortfall::TooLittleText { chars });
        }
        Ok(pairs)
    }

    async fn fallback(&self, library: &str, topic: &str) -> Result<DocumentationAnswer, SearchError> {
        let answer = self.answerer.answer(library, topic).await?;
        let budget = self.pipeline.formatter().budget();
        let (text, truncated) = truncate_at_boundary(&answer, budget, TRUNCATED_MARKER);
        if truncated {
            tracing::debug!(budget, "fallback answer cut to budget");
        }
        Ok(DocumentationAnswer {
            source: AnswerSource::FallbackModel,
            formatted_content: text,
            result_count: 0,
        })
    }
}
