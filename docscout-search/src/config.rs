//! Pipeline configuration with sensible defaults.
//!
//! Every component takes its configuration explicitly at construction;
//! nothing is read from the process environment here. All structs
//! deserialise with `#[serde(default)]` so a partial TOML/JSON document
//! only needs the fields it overrides.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::{DEFAULT_RESULT_COUNT, MAX_RESULT_COUNT};

/// Default Brave Search web endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Default Anthropic API base URL.
pub const DEFAULT_MODEL_BASE_URL: &str = "https://api.anthropic.com";

/// Bounded retry with exponential backoff and full jitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles for each further attempt.
    pub base_backoff_ms: u64,
    /// Upper bound on any single backoff delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1_000,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryConfig {
    /// No waiting between attempts. Useful in tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    fn validate(&self, owner: &str) -> Result<(), SearchError> {
        if self.max_attempts == 0 {
            return Err(SearchError::Config(format!(
                "{owner}.retry.max_attempts must be greater than 0"
            )));
        }
        if self.base_backoff_ms > self.max_backoff_ms {
            return Err(SearchError::Config(format!(
                "{owner}.retry base_backoff_ms must be <= max_backoff_ms"
            )));
        }
        Ok(())
    }
}

/// Search provider settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Provider endpoint URL.
    pub endpoint: String,
    /// Subscription token sent as `X-Subscription-Token`.
    pub api_key: String,
    /// Result count used when a query does not specify one.
    pub default_count: usize,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retry policy for 429/5xx/transport failures.
    pub retry: RetryConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_owned(),
            api_key: String::new(),
            default_count: DEFAULT_RESULT_COUNT,
            timeout_seconds: 10,
            retry: RetryConfig::default(),
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("default_count", &self.default_count)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("retry", &self.retry)
            .finish()
    }
}

impl SearchConfig {
    /// Validates this configuration.
    ///
    /// The API key is checked for presence here so that a missing credential
    /// surfaces as a configuration error before any request is made.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Config("search.api_key must be set".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(SearchError::Config("search.endpoint must be set".into()));
        }
        if self.default_count == 0 || self.default_count > MAX_RESULT_COUNT {
            return Err(SearchError::Config(format!(
                "search.default_count must be between 1 and {MAX_RESULT_COUNT}"
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "search.timeout_seconds must be greater than 0".into(),
            ));
        }
        self.retry.validate("search")
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Page fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-page timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of pages fetched at the same time.
    pub max_concurrency: usize,
    /// Bodies larger than this are cut before parsing.
    pub max_body_bytes: usize,
    /// Maximum characters of extracted text kept per page.
    pub max_chars_per_page: usize,
    /// Custom User-Agent. If `None`, rotates through browser User-Agents.
    pub user_agent: Option<String>,
    /// Retry policy for transport failures and 429/5xx answers. All attempts
    /// share the per-page timeout.
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_concurrency: 3,
            max_body_bytes: 2 * 1024 * 1024,
            max_chars_per_page: 10_000,
            user_agent: None,
            retry: RetryConfig {
                max_attempts: 2,
                base_backoff_ms: 250,
                max_backoff_ms: 1_000,
            },
        }
    }
}

impl FetchConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_ms == 0 {
            return Err(SearchError::Config(
                "fetch.timeout_ms must be greater than 0".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(SearchError::Config(
                "fetch.max_concurrency must be greater than 0".into(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(SearchError::Config(
                "fetch.max_body_bytes must be greater than 0".into(),
            ));
        }
        if self.max_chars_per_page == 0 {
            return Err(SearchError::Config(
                "fetch.max_chars_per_page must be greater than 0".into(),
            ));
        }
        self.retry.validate("fetch")
    }

    /// Per-page timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Output formatting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Maximum characters in one formatted block.
    pub budget_chars: usize,
    /// Append a sources summary when it fits in the remaining budget.
    pub sources_summary: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            budget_chars: 50_000,
            sources_summary: true,
        }
    }
}

impl FormatConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.budget_chars == 0 {
            return Err(SearchError::Config(
                "format.budget_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Thresholds deciding whether web results are good enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum combined extracted characters across successful fetches.
    pub min_total_chars: usize,
    /// Minimum number of pages that must fetch successfully.
    pub min_successful_fetches: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_total_chars: 200,
            min_successful_fetches: 1,
        }
    }
}

impl ResolverConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.min_successful_fetches == 0 {
            return Err(SearchError::Config(
                "resolver.min_successful_fetches must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Fallback language-model settings (Anthropic Messages API).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Model API key, sent as `x-api-key`.
    pub api_key: String,
    /// API base URL; `/v1/messages` is appended.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// `anthropic-version` header value.
    pub api_version: String,
    /// Maximum tokens in the answer.
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retry policy for 429/5xx/transport failures.
    pub retry: RetryConfig,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_MODEL_BASE_URL.to_owned(),
            model: "claude-3-opus-20240229".to_owned(),
            api_version: "2023-06-01".to_owned(),
            max_tokens: 1_500,
            timeout_seconds: 60,
            retry: RetryConfig {
                max_attempts: 2,
                base_backoff_ms: 500,
                max_backoff_ms: 4_000,
            },
        }
    }
}

impl fmt::Debug for FallbackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("retry", &self.retry)
            .finish()
    }
}

impl FallbackConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.api_key.trim().is_empty() {
            return Err(SearchError::Config("fallback.api_key must be set".into()));
        }
        if self.model.trim().is_empty() {
            return Err(SearchError::Config("fallback.model must be set".into()));
        }
        if self.max_tokens == 0 {
            return Err(SearchError::Config(
                "fallback.max_tokens must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "fallback.timeout_seconds must be greater than 0".into(),
            ));
        }
        self.retry.validate("fallback")
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// All pipeline settings in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub format: FormatConfig,
    pub resolver: ResolverConfig,
    pub fallback: FallbackConfig,
    /// Optional deadline for each top-level call, in seconds.
    pub overall_deadline_secs: Option<u64>,
}

impl PipelineConfig {
    /// Validates the search, fetch and format sections.
    ///
    /// The fallback section is validated separately by
    /// [`crate::fallback::ModelFallback::new`] so that plain search can run
    /// without a model credential.
    pub fn validate(&self) -> Result<(), SearchError> {
        self.search.validate()?;
        self.fetch.validate()?;
        self.format.validate()?;
        self.resolver.validate()?;
        if self.overall_deadline_secs == Some(0) {
            return Err(SearchError::Config(
                "overall_deadline_secs must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }

    /// The overall deadline, if configured.
    pub fn overall_deadline(&self) -> Option<Duration> {
        self.overall_deadline_secs.map(Duration::from_secs)
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}
