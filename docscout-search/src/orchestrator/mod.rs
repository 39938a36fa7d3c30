//! Pipeline orchestration: search, fetch, dedup, format, fall back.
//!
//! [`search::ResearchPipeline`] drives one query through the search
//! backend and the content source and formats the outcome.
//! [`documentation::DocumentationResolver`] builds documentation answers on
//! top of it and consults the fallback model when the web comes up short.

pub mod dedup;
pub mod documentation;
pub mod search;
pub mod url_normalize;

use std::future::Future;
use std::time::Duration;

use crate::error::SearchError;

/// Run `fut` to completion, or fail with [`SearchError::Timeout`] once
/// `deadline` elapses. `None` means no deadline.
pub(crate) async fn within_deadline<T, F>(
    deadline: Option<Duration>,
    operation: &str,
    fut: F,
) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    let Some(limit) = deadline else {
        return fut.await;
    };
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, deadline_ms = limit.as_millis() as u64, "deadline exceeded");
            Err(SearchError::Timeout(format!(
                "{operation} exceeded {}ms",
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_deadline_runs_to_completion() {
        let value = within_deadline(None, "op", async { Ok::<_, SearchError>(7) })
            .await
            .expect("ok");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn expired_deadline_is_timeout() {
        let result: Result<(), _> = within_deadline(
            Some(Duration::from_millis(10)),
            "slow op",
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;
        let err = result.unwrap_err();
        assert!(matches!(err, SearchError::Timeout(_)));
        assert!(err.to_string().contains("slow op"));
    }
}
