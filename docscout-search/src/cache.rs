//! Optional in-memory cache in front of a search backend.
//!
//! [`CachingBackend`] wraps any [`SearchBackend`] and keeps result lists
//! keyed by (normalised query, count, language, library). The cache belongs to the
//! wrapper value; there is no process-wide state. Errors are never cached.

use std::time::Duration;

use moka::future::Cache;

use crate::engine::SearchBackend;
use crate::error::SearchError;
use crate::types::{Query, SearchResult, DEFAULT_RESULT_COUNT};

/// Default maximum number of cached result lists.
pub const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Cache key: lowercased, whitespace-collapsed query plus the effective
/// count, language hint and library hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    count: usize,
    language: Option<String>,
    library: Option<String>,
}

impl CacheKey {
    pub fn new(query: &Query, default_count: usize) -> Self {
        Self {
            query: query
                .text
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            count: query.effective_count(default_count),
            language: query.language.as_ref().map(|l| l.trim().to_lowercase()),
            library: query.library.as_ref().map(|l| l.trim().to_lowercase()),
        }
    }
}

/// A [`SearchBackend`] decorator that caches successful result lists.
pub struct CachingBackend<S> {
    inner: S,
    cache: Cache<CacheKey, Vec<SearchResult>>,
    default_count: usize,
}

impl<S: SearchBackend> CachingBackend<S> {
    /// Wrap `inner`, keeping up to `capacity` entries for `ttl` each.
    pub fn new(inner: S, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            default_count: DEFAULT_RESULT_COUNT,
        }
    }

    /// Count used to key queries that do not set one. Should match the
    /// wrapped backend's configured default.
    pub fn with_default_count(mut self, default_count: usize) -> Self {
        self.default_count = default_count;
        self
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl<S: SearchBackend> SearchBackend for CachingBackend<S> {
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        let key = CacheKey::new(query, self.default_count);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(
                backend = self.inner.name(),
                library = query.library.as_deref(),
                count = hit.len(),
                "search cache hit"
            );
            return Ok(hit);
        }

        let results = self.inner.search(query).await?;
        self.cache.insert(key, results.clone()).await;
        Ok(results)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingBackend {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl SearchBackend for CountingBackend {
        async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::Provider("down".into()));
            }
            Ok(vec![SearchResult {
                title: query.text.clone(),
                url: "https://example.com".into(),
                snippet: String::new(),
                rank: 1,
                age: None,
            }])
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn cached(fail: bool) -> CachingBackend<CountingBackend> {
        CachingBackend::new(CountingBackend::new(fail), Duration::from_secs(60), 10)
    }

    #[test]
    fn key_normalises_case_and_whitespace() {
        let a = CacheKey::new(&Query::new("  Rust   ASYNC "), 5);
        let b = CacheKey::new(&Query::new("rust async"), 5);
        assert_eq!(a, b);
    }

    #[test]
    fn key_distinguishes_count_and_language() {
        let base = CacheKey::new(&Query::new("rust"), 5);
        assert_ne!(base, CacheKey::new(&Query::new("rust").with_count(3), 5));
        assert_ne!(base, CacheKey::new(&Query::new("rust").with_language("de"), 5));
        assert_eq!(base, CacheKey::new(&Query::new("rust").with_count(5), 5));
    }

    #[test]
    fn key_distinguishes_library_hint() {
        let plain = CacheKey::new(&Query::new("spawn documentation"), 5);
        let tokio = CacheKey::new(&Query::new("spawn documentation").with_library("tokio"), 5);
        assert_ne!(plain, tokio);
        assert_eq!(
            tokio,
            CacheKey::new(&Query::new("spawn documentation").with_library(" Tokio "), 5)
        );
    }

    #[tokio::test]
    async fn second_identical_query_is_served_from_cache() {
        let backend = cached(false);
        let first = backend.search(&Query::new("tokio")).await.expect("ok");
        let second = backend.search(&Query::new("TOKIO")).await.expect("ok");
        assert_eq!(first, second);
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.name(), "counting");
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let backend = cached(true);
        assert!(backend.search(&Query::new("x")).await.is_err());
        assert!(backend.search(&Query::new("x")).await.is_err());
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let backend = cached(false);
        backend.search(&Query::new("x")).await.expect("ok");
        backend.clear().await;
        backend.search(&Query::new("x")).await.expect("ok");
        assert_eq!(backend.inner().calls.load(Ordering::SeqCst), 2);
    }
}
