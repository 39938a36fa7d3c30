//! Language-model fallback for documentation lookups.
//!
//! Used by [`crate::orchestrator::documentation::DocumentationResolver`]
//! when live web results are missing or too thin. Answers produced here are
//! not grounded in fetched pages and are labelled as such by the resolver.

use std::future::Future;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::FallbackConfig;
use crate::error::SearchError;
use crate::http;
use crate::retry::{run_with_retry, AttemptOutcome};

const SYSTEM_PROMPT: &str = "You are a helpful programming assistant. Your task is to provide \
accurate documentation for programming libraries and frameworks. Include code examples when relevant.";

/// Produces documentation text without web access.
pub trait FallbackAnswerer: Send + Sync {
    /// Answer a documentation request for `topic` within `library`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Model`] once the answerer's own retries are
    /// exhausted, or if it produced no text.
    fn answer(
        &self,
        library: &str,
        topic: &str,
    ) -> impl Future<Output = Result<String, SearchError>> + Send;
}

/// Anthropic Messages API client used as the fallback answerer.
#[derive(Debug, Clone)]
pub struct ModelFallback {
    client: reqwest::Client,
    config: FallbackConfig,
}

impl ModelFallback {
    /// Create the fallback client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid
    /// (including a missing API key), or [`SearchError::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(config: FallbackConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_api_client(config.timeout())?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    async fn attempt(&self, body: &serde_json::Value) -> AttemptOutcome<String> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let sent = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                return AttemptOutcome::retry(SearchError::Model(format!("request failed: {e}")));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let retry_after = http::retry_after(response.headers());
            let detail = extract_error_message(&response.text().await.unwrap_or_default());
            let error = SearchError::Model(format!("HTTP {}: {detail}", status.as_u16()));
            return if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                AttemptOutcome::Retryable { error, retry_after }
            } else {
                AttemptOutcome::Fatal(error)
            };
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return AttemptOutcome::retry(SearchError::Model(format!(
                    "response read failed: {e}"
                )));
            }
        };

        match parse_messages_response(&text) {
            Ok(answer) => AttemptOutcome::Success(answer),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

impl FallbackAnswerer for ModelFallback {
    async fn answer(&self, library: &str, topic: &str) -> Result<String, SearchError> {
        let body = build_request(&self.config, library, topic);
        tracing::trace!(library, topic, model = %self.config.model, "fallback model request");

        let answer = run_with_retry(&self.config.retry, "fallback model", |_| {
            self.attempt(&body)
        })
        .await?;

        tracing::debug!(chars = answer.chars().count(), "fallback model answered");
        Ok(answer)
    }
}

/// Build the Messages API body. The prompt carries only the library and
/// topic, never fetched page text.
pub(crate) fn build_request(config: &FallbackConfig, library: &str, topic: &str) -> serde_json::Value {
    let prompt = format!(
        "Provide documentation for the '{topic}' in the '{library}' library or framework. \
         Include code examples and usage patterns."
    );
    serde_json::json!({
        "model": config.model,
        "max_tokens": config.max_tokens,
        "system": SYSTEM_PROMPT,
        "messages": [
            { "role": "user", "content": prompt }
        ],
    })
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Concatenate the text blocks of a Messages API response.
pub(crate) fn parse_messages_response(body: &str) -> Result<String, SearchError> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Model(format!("invalid response: {e}")))?;

    let text = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(SearchError::Model("response contained no text".into()));
    }
    Ok(text.trim().to_owned())
}

/// Pull `error.message` out of an API error body, or a short preview.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "no response body".to_string()
            } else {
                body.chars().take(300).collect()
            }
        })
}
