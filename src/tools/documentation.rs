//! Documentation lookup tool.
//!
//! Answers from live web pages when they are good enough and from the
//! fallback model otherwise. Model answers are labelled so the agent can
//! weigh them accordingly.

use async_trait::async_trait;
use docscout_search::types::{DEFAULT_RESULT_COUNT, MAX_RESULT_COUNT};
use docscout_search::{
    AnswerSource, BraveSearchClient, ContentSource, DocumentationResolver, FallbackAnswerer,
    ModelFallback, PageFetcher, SearchBackend, SearchError,
};

use crate::error::DocscoutError;

use super::types::{DEFAULT_MAX_BYTES, Tool, ToolResult, optional_count, required_str};

/// First line of every answer produced by the fallback model.
pub const FALLBACK_LABEL: &str =
    "[source: fallback_model, generated without live web results; verify before relying on it]";

/// Tool that fetches documentation for a library and topic.
///
/// # Arguments (JSON)
///
/// - `library` (string, required): library or framework name
/// - `topic` (string, required): function, class or concept to look up
/// - `max_results` (integer, optional): pages to consult, 1 to 20 (default 5)
pub struct FetchDocumentationTool<S = BraveSearchClient, C = PageFetcher, A = ModelFallback> {
    resolver: DocumentationResolver<S, C, A>,
    max_bytes: usize,
}

impl<S, C, A> FetchDocumentationTool<S, C, A> {
    pub fn new(resolver: DocumentationResolver<S, C, A>) -> Self {
        Self {
            resolver,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl<S, C, A> Tool for FetchDocumentationTool<S, C, A>
where
    S: SearchBackend + 'static,
    C: ContentSource + 'static,
    A: FallbackAnswerer + 'static,
{
    fn name(&self) -> &str {
        "fetch_documentation"
    }

    fn description(&self) -> &str {
        "Fetch documentation for a specific library or framework and topic."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "library": {
                    "type": "string",
                    "description": "The name of the library or framework"
                },
                "topic": {
                    "type": "string",
                    "description": "The specific topic or function to look up"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_RESULT_COUNT,
                    "description": "Number of web pages to consult (default 5)"
                }
            },
            "required": ["library", "topic"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, DocscoutError> {
        let library = required_str(&args, "library")?;
        let topic = required_str(&args, "topic")?;
        let count =
            optional_count(&args, "max_results", MAX_RESULT_COUNT)?.unwrap_or(DEFAULT_RESULT_COUNT);

        match self.resolver.resolve_documentation(library, topic, count).await {
            Ok(answer) => {
                let text = match answer.source {
                    AnswerSource::Web => answer.formatted_content,
                    AnswerSource::FallbackModel => {
                        format!("{FALLBACK_LABEL}\n\n{}", answer.formatted_content)
                    }
                };
                tracing::debug!(source = %answer.source, results = answer.result_count, "documentation tool answered");
                Ok(ToolResult::bounded(&text, self.max_bytes))
            }
            Err(SearchError::Config(msg)) => Err(DocscoutError::Tool(msg)),
            Err(e) => {
                tracing::warn!(error = %e, "documentation tool failed");
                Ok(ToolResult::failure(format!(
                    "documentation lookup for {} - {} failed: {e}",
                    library.trim(),
                    topic.trim()
                )))
            }
        }
    }
}
