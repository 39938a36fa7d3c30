//! Configuration for the docscout tools and CLI.
//!
//! The file is TOML; every section is optional. Pipeline settings live under
//! `[pipeline]` (with `[pipeline.search]`, `[pipeline.fetch]` and so on),
//! tool settings under `[tools]`.
//!
//! ```toml
//! [pipeline]
//! overall_deadline_secs = 30
//!
//! [pipeline.search]
//! default_count = 5
//!
//! [pipeline.format]
//! budget_chars = 20000
//!
//! [tools]
//! max_output_bytes = 65536
//!
//! [tools.cache]
//! ttl_secs = 600
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use docscout_search::PipelineConfig;
use docscout_search::cache::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};

use crate::error::{DocscoutError, Result};
use crate::tools::DEFAULT_MAX_BYTES;

/// Environment variable holding the Brave Search subscription token.
pub const SEARCH_KEY_ENV: &str = "BRAVE_SEARCH_API_KEY";

/// Environment variable holding the fallback model API key.
pub const MODEL_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Search result cache used by the agent tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// How long a cached result list stays valid.
    pub ttl_secs: u64,
    /// Maximum number of cached queries.
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 600,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Settings for the agent-facing tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tool output is cut to this many bytes.
    pub max_output_bytes: usize,
    pub cache: CacheConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_MAX_BYTES,
            cache: CacheConfig::default(),
        }
    }
}

/// Complete docscout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocscoutConfig {
    pub pipeline: PipelineConfig,
    pub tools: ToolsConfig,
}

impl DocscoutConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DocscoutError::Config`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DocscoutError::Config(e.to_string()))
    }

    /// Fill credentials that the file left empty from the process
    /// environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Like [`apply_env`](Self::apply_env), reading variables through
    /// `lookup`.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fill_from(&mut self.pipeline.search.api_key, SEARCH_KEY_ENV, &lookup);
        fill_from(&mut self.pipeline.fallback.api_key, MODEL_KEY_ENV, &lookup);
    }

    /// Whether a fallback model credential is available.
    pub fn has_fallback_key(&self) -> bool {
        !self.pipeline.fallback.api_key.trim().is_empty()
    }

    /// Validates the pipeline and tool sections.
    ///
    /// # Errors
    ///
    /// Returns [`DocscoutError::Search`] for invalid pipeline settings and
    /// [`DocscoutError::Config`] for invalid tool settings.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if self.tools.max_output_bytes == 0 {
            return Err(DocscoutError::Config(
                "tools.max_output_bytes must be greater than 0".into(),
            ));
        }
        if self.tools.cache.enabled && self.tools.cache.ttl_secs == 0 {
            return Err(DocscoutError::Config(
                "tools.cache.ttl_secs must be greater than 0 when the cache is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path: `~/.config/docscout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("docscout").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("docscout")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/docscout-config/config.toml")
        }
    }
}

fn fill_from(slot: &mut String, var: &str, lookup: &impl Fn(&str) -> Option<String>) {
    if !slot.trim().is_empty() {
        return;
    }
    if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(var, "credential taken from environment");
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_pipeline_defaults() {
        let config = DocscoutConfig::default();
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.tools.max_output_bytes, DEFAULT_MAX_BYTES);
        assert!(config.tools.cache.enabled);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = DocscoutConfig::from_toml(
            r#"
            [pipeline.format]
            budget_chars = 1234

            [tools.cache]
            enabled = false
            "#,
        );
        let config = match config {
            Ok(c) => c,
            Err(e) => unreachable!("valid toml: {e}"),
        };
        assert_eq!(config.pipeline.format.budget_chars, 1234);
        assert!(config.pipeline.format.sources_summary);
        assert_eq!(config.pipeline.search.default_count, 5);
        assert!(!config.tools.cache.enabled);
        assert_eq!(config.tools.cache.ttl_secs, 600);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let result = DocscoutConfig::from_toml("this is not valid toml {{{");
        assert!(matches!(result, Err(DocscoutError::Config(_))));
    }

    #[test]
    fn wrong_field_type_is_config_error() {
        let result = DocscoutConfig::from_toml("[pipeline.fetch]\ntimeout_ms = \"soon\"\n");
        assert!(matches!(result, Err(DocscoutError::Config(_))));
    }

    #[test]
    fn from_file_nonexistent_returns_io_error() {
        let result = DocscoutConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(DocscoutError::Io(_))));
    }

    #[test]
    fn env_fills_only_missing_credentials() {
        let mut config = DocscoutConfig::default();
        config.pipeline.search.api_key = "from-file".into();
        config.apply_env_from(|name| match name {
            SEARCH_KEY_ENV => Some("from-env-search".into()),
            MODEL_KEY_ENV => Some("from-env-model".into()),
            _ => None,
        });
        assert_eq!(config.pipeline.search.api_key, "from-file");
        assert_eq!(config.pipeline.fallback.api_key, "from-env-model");
        assert!(config.has_fallback_key());
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = DocscoutConfig::default();
        config.apply_env_from(|_| Some("   ".into()));
        assert!(config.pipeline.search.api_key.is_empty());
        assert!(!config.has_fallback_key());
    }

    #[test]
    fn validate_requires_search_key() {
        let config = DocscoutConfig::default();
        assert!(matches!(config.validate(), Err(DocscoutError::Search(_))));
    }

    #[test]
    fn validate_rejects_zero_output_limit() {
        let mut config = DocscoutConfig::default();
        config.pipeline.search.api_key = "k".into();
        config.tools.max_output_bytes = 0;
        assert!(matches!(config.validate(), Err(DocscoutError::Config(_))));
    }

    #[test]
    fn debug_output_hides_credentials() {
        let mut config = DocscoutConfig::default();
        config.apply_env_from(|name| Some(format!("secret-{name}")));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-"));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = DocscoutConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("docscout"));
    }
}
