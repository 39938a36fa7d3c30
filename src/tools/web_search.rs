//! Web search tool: Brave search results, optionally with the page text of
//! every hit.

use async_trait::async_trait;
use docscout_search::types::MAX_RESULT_COUNT;
use docscout_search::{
    BraveSearchClient, ContentSource, PageFetcher, Query, ResearchPipeline, SearchBackend,
};

use crate::error::DocscoutError;

use super::types::{DEFAULT_MAX_BYTES, Tool, ToolResult, optional_count, required_str};

/// Tool that searches the web for documentation, examples and best
/// practices.
///
/// # Arguments (JSON)
///
/// - `query` (string, required): the search query
/// - `fetch_content` (boolean, optional): also fetch and extract every
///   result page (default false)
/// - `max_results` (integer, optional): results to return, 1 to 20
pub struct WebSearchTool<S = BraveSearchClient, C = PageFetcher> {
    pipeline: ResearchPipeline<S, C>,
    max_bytes: usize,
}

impl<S, C> WebSearchTool<S, C> {
    /// Wrap `pipeline` with the default max output size.
    pub fn new(pipeline: ResearchPipeline<S, C>) -> Self {
        Self {
            pipeline,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl<S, C> Tool for WebSearchTool<S, C>
where
    S: SearchBackend + 'static,
    C: ContentSource + 'static,
{
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information, documentation, or examples. \
         Set fetch_content to also read the text of each result page."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "fetch_content": {
                    "type": "boolean",
                    "description": "Whether to fetch content from search results (default false)"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_RESULT_COUNT,
                    "description": "Maximum number of results to return"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, DocscoutError> {
        let text = required_str(&args, "query")?;
        let fetch_content = args
            .get("fetch_content")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let mut query = Query::new(text.trim());
        if let Some(count) = optional_count(&args, "max_results", MAX_RESULT_COUNT)? {
            query = query.with_count(count);
        }

        let (outcome, empty_message) = if fetch_content {
            (
                self.pipeline.content_block(&query).await,
                "No search results or content found.",
            )
        } else {
            (
                self.pipeline.search_block(&query).await,
                "No search results found.",
            )
        };

        match outcome {
            Ok(block) if block.sections == 0 => Ok(ToolResult::success(empty_message.to_string())),
            Ok(block) => Ok(ToolResult::bounded(&block.text, self.max_bytes)),
            Err(e) => {
                tracing::warn!(error = %e, fetch_content, "web search tool failed");
                Ok(ToolResult::failure(format!("web search failed: {e}")))
            }
        }
    }
}
