//! Core tool types.
//!
//! Defines the [`Tool`] trait that agent tools implement and [`ToolResult`]
//! for capturing bounded execution output.

use async_trait::async_trait;

use crate::error::DocscoutError;

/// Default maximum output size (100 KB).
pub const DEFAULT_MAX_BYTES: usize = 100 * 1024;

/// Result of a tool execution.
///
/// Contains the output content (bounded to `max_bytes`), success/error status,
/// and a flag indicating whether output was truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Whether the tool execution succeeded.
    pub success: bool,
    /// Output content (bounded).
    pub content: String,
    /// Error message if the tool execution failed.
    pub error: Option<String>,
    /// Whether the output was truncated to fit within max_bytes.
    pub truncated: bool,
}

impl ToolResult {
    /// Create a successful tool result.
    pub fn success(content: String) -> Self {
        Self {
            success: true,
            content,
            error: None,
            truncated: false,
        }
    }

    /// Create a failed tool result with an error message.
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            content: String::new(),
            error: Some(error),
            truncated: false,
        }
    }

    /// Bound `content` to `max_bytes` and wrap it as a success.
    pub fn bounded(content: &str, max_bytes: usize) -> Self {
        let (content, truncated) = truncate_output(content, max_bytes);
        Self {
            success: true,
            content,
            error: None,
            truncated,
        }
    }
}

/// Truncate a string to at most `max_bytes`, respecting UTF-8 boundaries.
///
/// Returns `(truncated_string, was_truncated)`. The notice appended to a
/// truncated string is not counted against `max_bytes`.
pub fn truncate_output(s: &str, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s.to_string(), false);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    (
        format!("{}\n\n[output truncated at {max_bytes} bytes]", &s[..end]),
        true,
    )
}

/// An agent tool: metadata plus an async execution method taking JSON
/// arguments.
///
/// Argument problems are returned as `Err`; failures of the work itself
/// (search provider down, model unavailable) come back as a failed
/// [`ToolResult`] so the agent can read the reason.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (e.g. "web_search").
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's arguments.
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with the given JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DocscoutError::Tool`] when the arguments are invalid.
    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, DocscoutError>;
}

/// Read a required, non-blank string argument.
pub(crate) fn required_str<'a>(
    args: &'a serde_json::Value,
    name: &str,
) -> Result<&'a str, DocscoutError> {
    let value = args
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DocscoutError::Tool(format!("missing required argument: {name}")))?;
    if value.trim().is_empty() {
        return Err(DocscoutError::Tool(format!("{name} must not be empty")));
    }
    Ok(value)
}

/// Read an optional integer argument that must fall in `1..=max`.
pub(crate) fn optional_count(
    args: &serde_json::Value,
    name: &str,
    max: usize,
) -> Result<Option<usize>, DocscoutError> {
    let Some(value) = args.get(name).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    match value.as_u64() {
        Some(n) if (1..=max as u64).contains(&n) => Ok(Some(n as usize)),
        _ => Err(DocscoutError::Tool(format!(
            "{name} must be an integer between 1 and {max}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_success() {
        let result = ToolResult::success("hello world".to_string());
        assert!(result.success);
        assert_eq!(result.content, "hello world");
        assert!(result.error.is_none());
        assert!(!result.truncated);
    }

    #[test]
    fn tool_result_failure() {
        let result = ToolResult::failure("provider down".to_string());
        assert!(!result.success);
        assert!(result.content.is_empty());
        assert_eq!(result.error.as_deref(), Some("provider down"));
    }

    #[test]
    fn bounded_marks_truncation() {
        let result = ToolResult::bounded("abcdefghij", 4);
        assert!(result.success);
        assert!(result.truncated);
        assert!(result.content.starts_with("abcd\n\n[output truncated"));

        let short = ToolResult::bounded("abc", 4);
        assert!(!short.truncated);
        assert_eq!(short.content, "abc");
    }

    #[test]
    fn truncate_output_exact_boundary() {
        let (output, truncated) = truncate_output("hello", 5);
        assert_eq!(output, "hello");
        assert!(!truncated);
    }

    #[test]
    fn truncate_output_respects_utf8() {
        // 'é' is two bytes; cutting at 2 would split it.
        let (output, truncated) = truncate_output("aé bc", 2);
        assert!(truncated);
        assert!(output.starts_with("a\n\n"));
    }

    #[test]
    fn required_str_rejects_missing_and_blank() {
        let missing_args = json!({});
        let missing = required_str(&missing_args, "query");
        assert!(matches!(missing, Err(DocscoutError::Tool(m)) if m.contains("missing required argument: query")));

        let blank_args = json!({"query": "  "});
        let blank = required_str(&blank_args, "query");
        assert!(matches!(blank, Err(DocscoutError::Tool(m)) if m.contains("must not be empty")));

        let wrong_type_args = json!({"query": 7});
        let wrong_type = required_str(&wrong_type_args, "query");
        assert!(wrong_type.is_err());
    }

    #[test]
    fn optional_count_bounds() {
        assert_eq!(optional_count(&json!({}), "n", 20).ok(), Some(None));
        assert_eq!(optional_count(&json!({"n": null}), "n", 20).ok(), Some(None));
        assert_eq!(optional_count(&json!({"n": 3}), "n", 20).ok(), Some(Some(3)));
        assert!(optional_count(&json!({"n": 0}), "n", 20).is_err());
        assert!(optional_count(&json!({"n": 21}), "n", 20).is_err());
        assert!(optional_count(&json!({"n": "5"}), "n", 20).is_err());
        assert!(optional_count(&json!({"n": -1}), "n", 20).is_err());
    }
}
