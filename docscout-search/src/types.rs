//! Core types flowing through the search → fetch → format pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of results requested when a query does not say.
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Largest result count the search provider accepts per request.
pub const MAX_RESULT_COUNT: usize = 20;

/// A search request: the query text plus optional hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// The text submitted to the provider.
    pub text: String,
    /// Requested number of results. `None` uses the configured default.
    pub count: Option<usize>,
    /// Optional language hint, forwarded to the provider when supported.
    pub language: Option<String>,
    /// Optional library the query is about.
    pub library: Option<String>,
}

impl Query {
    /// Build a query with no count bound or hints.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            count: None,
            language: None,
            library: None,
        }
    }

    /// Set the requested result count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the language hint.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the library hint.
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// The result count to request, clamped to `1..=MAX_RESULT_COUNT`.
    pub fn effective_count(&self, default: usize) -> usize {
        self.count.unwrap_or(default).clamp(1, MAX_RESULT_COUNT)
    }
}

/// A single search result, in provider rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result page.
    pub url: String,
    /// Provider-supplied description of the page.
    pub snippet: String,
    /// 1-based position in the provider's ranking.
    pub rank: usize,
    /// Provider-supplied page age (e.g. "2 days ago"), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

/// Outcome of fetching one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// The page was fetched and produced readable text.
    Ok,
    /// The request did not complete within the per-fetch timeout.
    Timeout,
    /// The server answered with a non-2xx status or the transfer failed.
    HttpError,
    /// The body was not HTML/text or contained nothing extractable.
    ParseError,
}

impl FetchStatus {
    /// Stable lower-case label, used in formatted output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::HttpError => "http_error",
            Self::ParseError => "parse_error",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Readable content extracted from one fetched page.
///
/// Fields are private so a value cannot be altered once built. A failed
/// fetch always carries empty text and a non-`Ok` status; a successful one
/// always carries non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedContent {
    url: String,
    title: String,
    raw_length: usize,
    extracted_text: String,
    fetch_status: FetchStatus,
}

impl FetchedContent {
    /// Build a successful fetch. Empty text is downgraded to
    /// [`FetchStatus::ParseError`].
    pub fn ok(
        url: impl Into<String>,
        title: impl Into<String>,
        raw_length: usize,
        extracted_text: impl Into<String>,
    ) -> Self {
        let extracted_text = extracted_text.into();
        if extracted_text.trim().is_empty() {
            return Self::failed(url, FetchStatus::ParseError, raw_length);
        }
        Self {
            url: url.into(),
            title: title.into(),
            raw_length,
            extracted_text,
            fetch_status: FetchStatus::Ok,
        }
    }

    /// Build a failed fetch with the given status.
    ///
    /// Passing [`FetchStatus::Ok`] is treated as a parse error, since an
    /// `Ok` fetch must carry text.
    pub fn failed(url: impl Into<String>, status: FetchStatus, raw_length: usize) -> Self {
        let fetch_status = match status {
            FetchStatus::Ok => FetchStatus::ParseError,
            other => other,
        };
        Self {
            url: url.into(),
            title: String::new(),
            raw_length,
            extracted_text: String::new(),
            fetch_status,
        }
    }

    /// The URL that was requested.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Page title from `<title>`, empty when absent or on failure.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of body bytes received.
    pub fn raw_length(&self) -> usize {
        self.raw_length
    }

    /// Extracted readable text (empty on failure).
    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    /// Outcome of the fetch.
    pub fn fetch_status(&self) -> FetchStatus {
        self.fetch_status
    }

    /// Shorthand for `fetch_status() == FetchStatus::Ok`.
    pub fn is_ok(&self) -> bool {
        self.fetch_status == FetchStatus::Ok
    }
}

/// A bounded text block ready to be placed in a language-model prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedBlock {
    /// The formatted text. Its character count never exceeds the budget
    /// it was built with.
    pub text: String,
    /// Number of result sections written.
    pub sections: usize,
    /// Whether any section body (or the tail of the block) was cut.
    pub truncated: bool,
}

impl FormattedBlock {
    /// Length of the text in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Where a documentation answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Built from live web pages.
    Web,
    /// Synthesised by the fallback language model, not grounded in fetched pages.
    FallbackModel,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Web => f.write_str("web"),
            Self::FallbackModel => f.write_str("fallback_model"),
        }
    }
}

/// Result of one documentation lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationAnswer {
    /// Whether the content is web-grounded or model-generated.
    pub source: AnswerSource,
    /// The formatted documentation text.
    pub formatted_content: String,
    /// Number of web sources included (0 for fallback answers).
    pub result_count: usize,
}
