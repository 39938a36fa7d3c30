//! Brave Search web API client.
//!
//! Uses the JSON endpoint (`/res/v1/web/search`) authenticated with an
//! `X-Subscription-Token` header. Rate limiting (HTTP 429) and server
//! errors are retried with jittered exponential backoff; credential
//! rejections are surfaced at once.

use reqwest::StatusCode;
use scraper::Html;
use serde::Deserialize;

use crate::config::SearchConfig;
use crate::engine::SearchBackend;
use crate::error::SearchError;
use crate::http;
use crate::orchestrator::dedup::dedupe_in_rank_order;
use crate::retry::{run_with_retry, AttemptOutcome};
use crate::types::{Query, SearchResult};

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Brave Search API client.
///
/// Stateless apart from the shared connection pool, so one instance (or a
/// clone) can serve concurrent queries.
#[derive(Debug, Clone)]
pub struct BraveSearchClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl BraveSearchClient {
    /// Create a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid
    /// (including a missing API key), or [`SearchError::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_api_client(config.timeout())?;
        Ok(Self { client, config })
    }

    /// One request/response exchange, classified for the retry loop.
    async fn attempt(&self, query: &Query, count: usize) -> AttemptOutcome<Vec<SearchResult>> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.text.clone()),
            ("count", count.to_string()),
        ];
        if let Some(lang) = query.language.as_deref() {
            params.push(("search_lang", lang.to_owned()));
        }

        let sent = self
            .client
            .get(&self.config.endpoint)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.config.api_key)
            .query(&params)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return AttemptOutcome::retry(SearchError::Provider(
                    "Brave request timed out".into(),
                ));
            }
            Err(e) => {
                return AttemptOutcome::retry(SearchError::Provider(format!(
                    "Brave request failed: {e}"
                )));
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = http::retry_after(response.headers());
            return AttemptOutcome::Retryable {
                error: SearchError::RateLimited("Brave returned HTTP 429".into()),
                retry_after,
            };
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return AttemptOutcome::Fatal(SearchError::Auth(format!(
                "Brave rejected the subscription token (HTTP {})",
                status.as_u16()
            )));
        }
        if status.is_server_error() {
            return AttemptOutcome::retry(SearchError::Provider(format!(
                "Brave returned HTTP {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return AttemptOutcome::Fatal(SearchError::Provider(format!(
                "Brave returned HTTP {}: {}",
                status.as_u16(),
                preview(&body)
            )));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return AttemptOutcome::retry(SearchError::Provider(format!(
                    "Brave response read failed: {e}"
                )));
            }
        };
        tracing::trace!(bytes = body.len(), "Brave response received");

        match parse_brave_response(&body, count) {
            Ok(results) => AttemptOutcome::Success(results),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

impl SearchBackend for BraveSearchClient {
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        if query.text.trim().is_empty() {
            return Err(SearchError::Config("query must not be empty".into()));
        }
        let count = query.effective_count(self.config.default_count);
        tracing::trace!(query = %query.text, library = query.library.as_deref(), count, "Brave search");

        let results = run_with_retry(&self.config.retry, "brave search", |_| {
            self.attempt(query, count)
        })
        .await?;

        tracing::debug!(count = results.len(), "Brave results parsed");
        Ok(results)
    }

    fn name(&self) -> &'static str {
        "brave"
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    #[serde(default)]
    title: String,
    url: Option<String>,
    #[serde(default)]
    description: String,
    age: Option<String>,
}

/// Parse a Brave web search JSON body into ranked results.
///
/// Entries without a URL are dropped and duplicate URLs collapse onto their
/// best-ranked entry before `max_results` is applied. A response without a
/// `web` section (Brave omits it when nothing matched) yields an empty list.
///
/// Extracted as a separate function for testability with canned JSON.
pub(crate) fn parse_brave_response(
    body: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let parsed: BraveResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid Brave response: {e}")))?;

    let results = parsed
        .web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            let url = r.url?.trim().to_owned();
            if url.is_empty() {
                return None;
            }
            let title = strip_markup(&r.title);
            Some(SearchResult {
                title: if title.is_empty() { url.clone() } else { title },
                url,
                snippet: strip_markup(&r.description),
                rank: 0,
                age: r.age.filter(|a| !a.trim().is_empty()),
            })
        })
        .collect();

    let mut results = dedupe_in_rank_order(results);
    results.truncate(max_results);
    Ok(results)
}

/// Brave highlights matches with inline tags (`<strong>`); keep the text only.
fn strip_markup(fragment: &str) -> String {
    if !fragment.contains('<') && !fragment.contains('&') {
        return fragment.trim().to_owned();
    }
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(ERROR_BODY_PREVIEW);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].trim()
}
