//! Page fetching with bounded concurrency.
//!
//! [`PageFetcher`] downloads one page and hands the body to
//! [`crate::content`] for extraction. Transport failures and 429/5xx
//! answers are retried within the per-page timeout; a 4xx is final. Every
//! failure mode is reported as a [`FetchStatus`] on the returned
//! [`FetchedContent`]; nothing here returns an error once the fetcher is
//! built.
//!
//! [`fetch_all`] fans out over any [`ContentSource`] with a concurrency cap
//! and returns results in input order.

use futures::stream::{self, StreamExt};
use url::Url;

use crate::config::FetchConfig;
use crate::content::{self, ExtractedPage};
use crate::engine::ContentSource;
use crate::error::SearchError;
use crate::http;
use crate::retry::{run_with_retry, AttemptOutcome};
use crate::types::{FetchStatus, FetchedContent};

/// Fetches result pages and extracts their readable text.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl PageFetcher {
    /// Create a fetcher from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for invalid limits, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let client = http::build_page_client(&config)?;
        Ok(Self { client, config })
    }

    /// The configuration this fetcher was built with.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch `url`, retrying transport failures and 429/5xx answers.
    async fn fetch_inner(&self, url: &Url) -> FetchedContent {
        match run_with_retry(&self.config.retry, "page fetch", |_| self.fetch_once(url)).await {
            Ok(content) => content,
            Err(SearchError::Timeout(_)) => {
                FetchedContent::failed(url.as_str(), FetchStatus::Timeout, 0)
            }
            Err(_) => FetchedContent::failed(url.as_str(), FetchStatus::HttpError, 0),
        }
    }

    /// One request. A 4xx or unparsable page settles the fetch and comes back
    /// as `Success` holding the failed content.
    async fn fetch_once(&self, url: &Url) -> AttemptOutcome<FetchedContent> {
        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::debug!(%url, "fetch timed out");
                return AttemptOutcome::retry(SearchError::Timeout(format!("GET {url}")));
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "fetch failed");
                return AttemptOutcome::retry(SearchError::Provider(format!("GET {url}: {e}")));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            tracing::debug!(%url, status = status.as_u16(), "fetch returned transient status");
            return AttemptOutcome::Retryable {
                error: SearchError::Provider(format!("GET {url}: HTTP {}", status.as_u16())),
                retry_after: http::retry_after(response.headers()),
            };
        }
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "fetch returned non-success status");
            return AttemptOutcome::Success(FetchedContent::failed(
                url.as_str(),
                FetchStatus::HttpError,
                0,
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if !content::is_textual_content_type(content_type.as_deref()) {
            tracing::debug!(%url, content_type = ?content_type, "skipping non-HTML content");
            return AttemptOutcome::Success(FetchedContent::failed(
                url.as_str(),
                FetchStatus::ParseError,
                0,
            ));
        }

        let body = match self.read_capped(response).await {
            Ok(body) => body,
            Err(FetchStatus::Timeout) => {
                return AttemptOutcome::retry(SearchError::Timeout(format!("reading {url}")));
            }
            Err(_) => {
                return AttemptOutcome::retry(SearchError::Provider(format!("reading {url}")));
            }
        };
        let raw_length = body.len();
        let text = String::from_utf8_lossy(&body);

        let is_plain = content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("text/plain"));
        let extracted = if is_plain {
            content::extract_plain_text(&text, self.config.max_chars_per_page)
        } else {
            content::extract_content(&text, self.config.max_chars_per_page)
        };

        AttemptOutcome::Success(match extracted {
            Ok(ExtractedPage { title, text, truncated }) => {
                tracing::debug!(
                    %url,
                    raw_length,
                    chars = text.chars().count(),
                    truncated,
                    "page extracted"
                );
                FetchedContent::ok(url.as_str(), title, raw_length, text)
            }
            Err(e) => {
                tracing::debug!(%url, error = %e, "extraction failed");
                FetchedContent::failed(url.as_str(), FetchStatus::ParseError, raw_length)
            }
        })
    }

    /// Read the body chunk by chunk, stopping at `max_body_bytes`.
    async fn read_capped(&self, mut response: reqwest::Response) -> Result<Vec<u8>, FetchStatus> {
        let cap = self.config.max_body_bytes;
        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    let room = cap - body.len();
                    if chunk.len() >= room {
                        body.extend_from_slice(&chunk[..room]);
                        tracing::debug!(cap, "body cut at size limit");
                        break;
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) if e.is_timeout() => return Err(FetchStatus::Timeout),
                Err(_) => return Err(FetchStatus::HttpError),
            }
        }
        Ok(body)
    }
}

impl ContentSource for PageFetcher {
    async fn fetch(&self, url: &str) -> FetchedContent {
        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                tracing::debug!(url, scheme = parsed.scheme(), "refusing non-HTTP URL");
                return FetchedContent::failed(url, FetchStatus::ParseError, 0);
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "unparsable URL");
                return FetchedContent::failed(url, FetchStatus::ParseError, 0);
            }
        };

        match tokio::time::timeout(self.config.timeout(), self.fetch_inner(&parsed)).await {
            // Report the URL as the caller gave it, not the parser's canonical form.
            Ok(content) if content.url() == url => content,
            Ok(content) => rebind_url(content, url),
            Err(_) => {
                tracing::debug!(url, timeout_ms = self.config.timeout_ms, "fetch timed out");
                FetchedContent::failed(url, FetchStatus::Timeout, 0)
            }
        }
    }
}

fn rebind_url(content: FetchedContent, url: &str) -> FetchedContent {
    if content.is_ok() {
        FetchedContent::ok(
            url,
            content.title(),
            content.raw_length(),
            content.extracted_text(),
        )
    } else {
        FetchedContent::failed(url, content.fetch_status(), content.raw_length())
    }
}

/// Fetch every URL with at most `concurrency` requests in flight.
///
/// The returned vector has the same length and order as `urls`,
/// whatever order the fetches complete in.
pub async fn fetch_all<C: ContentSource>(
    source: &C,
    urls: &[String],
    concurrency: usize,
) -> Vec<FetchedContent> {
    if urls.is_empty() {
        return Vec::new();
    }
    let limit = concurrency.clamp(1, urls.len());

    let mut slots: Vec<Option<FetchedContent>> = vec![None; urls.len()];
    let futures: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(slot, url)| async move { (slot, source.fetch(url).await) })
        .collect();
    let mut completed = stream::iter(futures).buffer_unordered(limit);

    while let Some((slot, content)) = completed.next().await {
        slots[slot] = Some(content);
    }

    let fetched: Vec<FetchedContent> = slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| FetchedContent::failed(url.as_str(), FetchStatus::HttpError, 0))
        })
        .collect();

    let ok = fetched.iter().filter(|c| c.is_ok()).count();
    tracing::debug!(requested = urls.len(), ok, concurrency = limit, "fetch fan-out complete");
    fetched
}
