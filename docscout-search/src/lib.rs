//! # docscout-search
//!
//! Web search, page fetching and budgeted formatting of live documentation
//! for language-model prompts.
//!
//! ## Design
//!
//! - Queries the Brave Search API, retrying rate limits and server errors
//!   with jittered exponential backoff
//! - Fetches result pages concurrently under a fixed cap; each fetch has
//!   its own timeout and a failed page never fails the batch
//! - Extracts readable text from HTML (boilerplate and scripts dropped,
//!   nothing executed)
//! - Formats results in rank order within a hard character budget
//! - Falls back to a language model for documentation lookups when the web
//!   comes up short, and labels such answers as model-generated
//!
//! Every network component sits behind a trait ([`SearchBackend`],
//! [`ContentSource`], [`FallbackAnswerer`]) so the pipeline can be driven
//! with in-memory doubles.
//!
//! ## Security
//!
//! - Credentials are passed in explicitly and never printed by `Debug`
//! - Search queries are logged only at trace level
//! - Only `http`/`https` URLs are fetched and response bodies are size-capped
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> docscout_search::Result<()> {
//! use docscout_search::{PipelineConfig, Query, ResearchPipeline};
//!
//! let mut config = PipelineConfig::default();
//! config.search.api_key = "brave-token".into();
//! let pipeline = ResearchPipeline::from_config(&config)?;
//! let text = pipeline
//!     .get_content_for_llm(&Query::new("python asyncio tutorial").with_count(3))
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod engine;
pub mod engines;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod format;
pub mod http;
pub mod orchestrator;
pub mod retry;
pub mod types;

pub use cache::CachingBackend;
pub use config::{
    FallbackConfig, FetchConfig, FormatConfig, PipelineConfig, ResolverConfig, RetryConfig,
    SearchConfig,
};
pub use engine::{ContentSource, SearchBackend};
pub use engines::BraveSearchClient;
pub use error::{Result, SearchError};
pub use fallback::{FallbackAnswerer, ModelFallback};
pub use fetcher::{fetch_all, PageFetcher};
pub use format::ContentFormatter;
pub use orchestrator::documentation::DocumentationResolver;
pub use orchestrator::search::{ResearchPipeline, ResultWithContent};
pub use types::{
    AnswerSource, DocumentationAnswer, FetchStatus, FetchedContent, FormattedBlock, Query,
    SearchResult,
};
