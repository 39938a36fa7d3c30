//! Agent-facing tools.
//!
//! - [`WebSearchTool`] (`web_search`): result listing, or page content with
//!   `fetch_content`
//! - [`FetchDocumentationTool`] (`fetch_documentation`): library/topic
//!   lookup with the model fallback
//!
//! [`build_registry`] wires both to the network-backed pipeline described by
//! a [`DocscoutConfig`].

pub mod documentation;
pub mod registry;
pub mod types;
pub mod web_search;

use std::sync::Arc;

use docscout_search::{
    BraveSearchClient, CachingBackend, DocumentationResolver, ModelFallback, PageFetcher,
    ResearchPipeline, SearchBackend,
};

pub use documentation::FetchDocumentationTool;
pub use registry::ToolRegistry;
pub use types::{DEFAULT_MAX_BYTES, Tool, ToolResult, truncate_output};
pub use web_search::WebSearchTool;

use crate::config::DocscoutConfig;
use crate::error::Result;

/// Build a registry holding `web_search` and, when a fallback credential is
/// configured, `fetch_documentation`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, for example when the
/// search API key is missing.
pub fn build_registry(config: &DocscoutConfig) -> Result<ToolRegistry> {
    config.validate()?;
    let mut registry = ToolRegistry::new();

    if config.tools.cache.enabled {
        register_with(&mut registry, config, || {
            let client = BraveSearchClient::new(config.pipeline.search.clone())?;
            Ok(CachingBackend::new(
                client,
                config.tools.cache.ttl(),
                config.tools.cache.capacity,
            )
            .with_default_count(config.pipeline.search.default_count))
        })?;
    } else {
        register_with(&mut registry, config, || {
            Ok(BraveSearchClient::new(config.pipeline.search.clone())?)
        })?;
    }

    tracing::debug!(tools = ?registry.list_available(), "tool registry ready");
    Ok(registry)
}

fn register_with<S, F>(
    registry: &mut ToolRegistry,
    config: &DocscoutConfig,
    backend: F,
) -> Result<()>
where
    S: SearchBackend + 'static,
    F: Fn() -> Result<S>,
{
    let max_bytes = config.tools.max_output_bytes;
    let pipeline = &config.pipeline;

    let search = ResearchPipeline::new(
        backend()?,
        PageFetcher::new(pipeline.fetch.clone())?,
        pipeline,
    );
    registry.register(Arc::new(WebSearchTool::new(search).with_max_bytes(max_bytes)));

    if config.has_fallback_key() {
        let docs = ResearchPipeline::new(
            backend()?,
            PageFetcher::new(pipeline.fetch.clone())?,
            pipeline,
        );
        let resolver = DocumentationResolver::new(
            docs,
            ModelFallback::new(pipeline.fallback.clone())?,
            pipeline.resolver.clone(),
        );
        registry.register(Arc::new(
            FetchDocumentationTool::new(resolver).with_max_bytes(max_bytes),
        ));
    } else {
        tracing::warn!("no fallback model key configured; fetch_documentation is disabled");
    }
    Ok(())
}
