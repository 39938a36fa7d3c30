//! End-to-end pipeline tests.
//!
//! The first group drives the pipeline with in-memory doubles whose fetch
//! latencies are shuffled, to check rank ordering and budget handling.
//! The second group wires the real Brave client, page fetcher and fallback
//! model to a single mock server.

use std::time::Duration;

use docscout_search::{
    AnswerSource, BraveSearchClient, ContentSource, DocumentationResolver, FallbackAnswerer,
    FallbackConfig, FetchStatus, FetchedContent, FormatConfig, ModelFallback, PageFetcher,
    PipelineConfig, Query, ResearchPipeline, RetryConfig, SearchBackend, SearchConfig,
    SearchError, SearchResult,
};
use rand::seq::SliceRandom;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ────────────────────────────────────────────────────────────────────────────
// In-memory doubles
// ────────────────────────────────────────────────────────────────────────────

struct StaticBackend {
    results: Vec<SearchResult>,
}

impl StaticBackend {
    fn with_urls(urls: &[&str]) -> Self {
        Self {
            results: urls
                .iter()
                .enumerate()
                .map(|(i, url)| SearchResult {
                    title: format!("Result {}", i + 1),
                    url: (*url).to_owned(),
                    snippet: String::new(),
                    rank: i + 1,
                    age: None,
                })
                .collect(),
        }
    }
}

impl SearchBackend for StaticBackend {
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, SearchError> {
        Ok(self
            .results
            .iter()
            .take(query.effective_count(5))
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Serves long pages after a per-URL delay chosen at random.
struct ShuffledLatencySource {
    delays_ms: Vec<(String, u64)>,
}

impl ShuffledLatencySource {
    fn new(urls: &[&str]) -> Self {
        let mut delays: Vec<u64> = (0..urls.len() as u64).map(|i| i * 40).collect();
        delays.shuffle(&mut rand::thread_rng());
        Self {
            delays_ms: urls.iter().map(|u| (*u).to_owned()).zip(delays).collect(),
        }
    }
}

impl ContentSource for ShuffledLatencySource {
    async fn fetch(&self, url: &str) -> FetchedContent {
        let delay = self
            .delays_ms
            .iter()
            .find(|(u, _)| u == url)
            .map_or(0, |(_, d)| *d);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        let text = format!("Page {url} explains event loops, tasks and coroutines. ").repeat(20);
        FetchedContent::ok(url, "", text.len(), text)
    }
}

struct CannedAnswer;

impl FallbackAnswerer for CannedAnswer {
    async fn answer(&self, library: &str, topic: &str) -> Result<String, SearchError> {
        Ok(format!("{library}.{topic}() initialises the library. Example:\n\n    {library}.{topic}()"))
    }
}

const ASYNCIO_URLS: &[&str] = &[
    "https://docs.python.org/3/library/asyncio.html",
    "https://realpython.com/async-io-python/",
    "https://superfastpython.com/python-asyncio/",
];

#[tokio::test]
async fn asyncio_tutorial_three_sections_within_budget_in_rank_order() {
    let config = PipelineConfig {
        format: FormatConfig {
            budget_chars: 2_000,
            ..Default::default()
        },
        ..Default::default()
    };
    let pipeline = ResearchPipeline::new(
        StaticBackend::with_urls(ASYNCIO_URLS),
        ShuffledLatencySource::new(ASYNCIO_URLS),
        &config,
    );

    let query = Query::new("Python asyncio tutorial").with_count(3);
    let pairs = pipeline.gather(&query).await.expect("gather");
    assert_eq!(pairs.len(), 3);
    assert!(pairs.iter().all(|(_, c)| c.extracted_text().chars().count() > 500));

    let text = pipeline.get_content_for_llm(&query).await.expect("content");
    assert!(text.chars().count() <= 2_000, "len = {}", text.chars().count());
    assert_eq!(text.matches("\nSource: ").count(), 3);

    let positions: Vec<usize> = ASYNCIO_URLS
        .iter()
        .map(|u| text.find(&format!("Source: {u}")).expect("source present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "not in rank order");
}

#[tokio::test]
async fn ordering_holds_across_repeated_shuffles() {
    let urls: Vec<String> = (1..=8).map(|i| format!("https://site{i}.example/doc")).collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();

    for _ in 0..5 {
        let pipeline = ResearchPipeline::new(
            StaticBackend::with_urls(&refs),
            ShuffledLatencySource::new(&refs),
            &PipelineConfig::default(),
        );
        let pairs = pipeline
            .gather(&Query::new("q").with_count(8))
            .await
            .expect("gather");
        let got: Vec<&str> = pairs.iter().map(|(_, c)| c.url()).collect();
        assert_eq!(got, refs);
    }
}

#[tokio::test]
async fn obscure_library_falls_back_to_model() {
    let pipeline = ResearchPipeline::new(
        StaticBackend::with_urls(&[]),
        ShuffledLatencySource::new(&[]),
        &PipelineConfig::default(),
    );
    let resolver = DocumentationResolver::new(pipeline, CannedAnswer, Default::default());

    let answer = resolver
        .resolve_documentation("obscure-lib", "init", 5)
        .await
        .expect("fallback answer");
    assert_eq!(answer.source, AnswerSource::FallbackModel);
    assert_eq!(answer.result_count, 0);
    assert!(!answer.formatted_content.is_empty());
}

// ────────────────────────────────────────────────────────────────────────────
// Network components against one mock server
// ────────────────────────────────────────────────────────────────────────────

const DOC_PAGE: &str = r#"<html><head><title>serde derive</title></head><body>
<nav>Docs home</nav>
<main>
<h1>Derive macros</h1>
<p>Add serde with the derive feature enabled, then annotate your types with
Serialize and Deserialize. The generated implementations follow the field
names of the struct, and attributes such as rename and default adjust the
mapping without writing any code by hand. Enums are represented externally
tagged unless another representation is selected.</p>
</main>
</body></html>"#;

fn network_config(server: &MockServer) -> PipelineConfig {
    PipelineConfig {
        search: SearchConfig {
            endpoint: format!("{}/res/v1/web/search", server.uri()),
            api_key: "test-brave-key".into(),
            retry: RetryConfig::immediate(3),
            ..Default::default()
        },
        fallback: FallbackConfig {
            api_key: "test-anthropic-key".into(),
            base_url: server.uri(),
            retry: RetryConfig::immediate(2),
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn mount_search(server: &MockServer, urls: &[String]) {
    let results: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(i, u)| json!({"title": format!("Doc {}", i + 1), "url": u, "description": "docs"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"web": {"results": results}})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn documentation_answered_from_live_pages() {
    let server = MockServer::start().await;
    let urls = vec![
        format!("{}/docs/derive", server.uri()),
        format!("{}/docs/missing", server.uri()),
    ];
    mount_search(&server, &urls).await;
    Mock::given(method("GET"))
        .and(path("/docs/derive"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(DOC_PAGE.as_bytes().to_vec(), "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = network_config(&server);
    let pipeline = ResearchPipeline::new(
        BraveSearchClient::new(config.search.clone()).expect("search client"),
        PageFetcher::new(config.fetch.clone()).expect("fetcher"),
        &config,
    );
    let resolver = DocumentationResolver::new(
        pipeline,
        ModelFallback::new(config.fallback.clone()).expect("fallback"),
        config.resolver.clone(),
    );

    let answer = resolver
        .resolve_documentation("serde", "derive", 2)
        .await
        .expect("web answer");

    assert_eq!(answer.source, AnswerSource::Web);
    assert_eq!(answer.result_count, 2);
    assert!(answer
        .formatted_content
        .starts_with("# Documentation Results for: serde derive documentation"));
    assert!(answer.formatted_content.contains("## 1. serde derive\n"));
    assert!(answer.formatted_content.contains("Serialize and Deserialize"));
    assert!(!answer.formatted_content.contains("Docs home"));
    assert!(answer
        .formatted_content
        .contains(&format!("[content unavailable: {}]", FetchStatus::HttpError)));
}

#[tokio::test]
async fn documentation_falls_back_when_search_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Use #[derive(Serialize)]."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = DocumentationResolver::from_config(&network_config(&server)).expect("resolver");
    let answer = resolver
        .resolve_documentation("serde", "derive", 3)
        .await
        .expect("fallback answer");

    assert_eq!(answer.source, AnswerSource::FallbackModel);
    assert_eq!(answer.formatted_content, "Use #[derive(Serialize)].");
}

#[tokio::test]
async fn plain_search_surfaces_rate_limit_after_configured_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let pipeline = ResearchPipeline::from_config(&network_config(&server)).expect("pipeline");
    let err = pipeline.search(&Query::new("anything")).await.unwrap_err();
    assert!(matches!(err, SearchError::RateLimited(_)));
}

#[tokio::test]
async fn plain_search_lists_results() {
    let server = MockServer::start().await;
    mount_search(&server, &["https://serde.rs/derive.html".to_owned()]).await;

    let pipeline = ResearchPipeline::from_config(&network_config(&server)).expect("pipeline");
    let text = pipeline.search(&Query::new("serde derive")).await.expect("search");
    assert!(text.starts_with("# Search Results for: serde derive"));
    assert!(text.contains("1. Doc 1\nURL: https://serde.rs/derive.html\nDescription: docs"));
}
