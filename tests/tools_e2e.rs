//! Tool registry end to end: configuration read from a TOML file, every
//! outbound call served by one mock server.

use std::path::PathBuf;

use docscout::tools::documentation::FALLBACK_LABEL;
use docscout::{DocscoutConfig, DocscoutError, ToolRegistry, build_registry};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><head><title>Tokio spawn</title></head><body>
<nav>Crates | Docs | Blog</nav>
<main><h1>tokio::spawn</h1>
<p>Spawns a new asynchronous task, returning a JoinHandle for it. The provided
future will start running in the background immediately when spawn is called,
even if you don't await the returned JoinHandle. Spawning a task enables the
task to execute concurrently to other tasks.</p></main>
</body></html>"#;

fn write_config(dir: &tempfile::TempDir, server: &MockServer, with_model_key: bool) -> PathBuf {
    let model_key = if with_model_key { "test-model-key" } else { "" };
    let toml = format!(
        r#"
[pipeline.search]
endpoint = "{uri}/res/v1/web/search"
api_key = "test-search-key"

[pipeline.search.retry]
max_attempts = 2
base_backoff_ms = 0
max_backoff_ms = 0

[pipeline.fallback]
api_key = "{model_key}"
base_url = "{uri}"

[pipeline.fallback.retry]
max_attempts = 1
base_backoff_ms = 0
max_backoff_ms = 0

[tools]
max_output_bytes = 8192

[tools.cache]
ttl_secs = 60
"#,
        uri = server.uri()
    );
    let path = dir.path().join("docscout.toml");
    std::fs::write(&path, toml).expect("write config");
    path
}

fn registry_for(server: &MockServer, with_model_key: bool) -> ToolRegistry {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_config(&dir, server, with_model_key);
    let config = DocscoutConfig::from_file(&path).expect("config loads");
    build_registry(&config).expect("registry builds")
}

async fn mount_search(server: &MockServer, query: &str, routes: &[&str]) {
    let results: Vec<_> = routes
        .iter()
        .enumerate()
        .map(|(i, route)| {
            json!({
                "title": format!("Result {}", i + 1),
                "url": format!("{}{route}", server.uri()),
                "description": "docs page"
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"web": {"results": results}})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn web_search_lists_results_and_caches_them() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", "tokio spawn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"web": {"results": [
            {"title": "tokio::spawn", "url": "https://docs.rs/tokio/latest/tokio/fn.spawn.html",
             "description": "Spawns a new asynchronous task"}
        ]}})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(&server, false);
    assert_eq!(registry.list_available(), vec!["web_search"]);

    for _ in 0..2 {
        let result = registry
            .execute("web_search", json!({"query": "tokio spawn"}))
            .await
            .expect("tool runs");
        assert!(result.success);
        assert!(result
            .content
            .contains("1. tokio::spawn\nURL: https://docs.rs/tokio/latest/tokio/fn.spawn.html"));
    }
}

#[tokio::test]
async fn web_search_with_content_reads_pages() {
    let server = MockServer::start().await;
    mount_search(&server, "tokio spawn docs", &["/tokio/spawn"]).await;
    Mock::given(method("GET"))
        .and(path("/tokio/spawn"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE.as_bytes().to_vec(), "text/html"))
        .mount(&server)
        .await;

    let registry = registry_for(&server, false);
    let result = registry
        .execute(
            "web_search",
            json!({"query": "tokio spawn docs", "fetch_content": true, "max_results": 1}),
        )
        .await
        .expect("tool runs");

    assert!(result.success);
    assert!(result.content.contains("## 1. Tokio spawn\n"));
    assert!(result.content.contains("returning a JoinHandle"));
    assert!(!result.content.contains("Crates | Docs"));
}

#[tokio::test]
async fn web_search_outage_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let registry = registry_for(&server, false);
    let result = registry
        .execute("web_search", json!({"query": "anything"}))
        .await
        .expect("outage is a failed result");
    assert!(!result.success);
    assert!(result.error.unwrap_or_default().contains("search provider error"));
}

#[tokio::test]
async fn fetch_documentation_uses_web_pages() {
    let server = MockServer::start().await;
    mount_search(&server, "tokio spawn documentation", &["/tokio/spawn"]).await;
    Mock::given(method("GET"))
        .and(path("/tokio/spawn"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE.as_bytes().to_vec(), "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let registry = registry_for(&server, true);
    let result = registry
        .execute("fetch_documentation", json!({"library": "tokio", "topic": "spawn"}))
        .await
        .expect("tool runs");

    assert!(result.success);
    assert!(result
        .content
        .starts_with("# Documentation Results for: tokio spawn documentation"));
    assert!(!result.content.contains(FALLBACK_LABEL));
}

#[tokio::test]
async fn fetch_documentation_falls_back_and_labels_answer() {
    let server = MockServer::start().await;
    mount_search(&server, "obscure-lib init documentation", &[]).await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Call obscure_lib.init() before use."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(&server, true);
    let result = registry
        .execute(
            "fetch_documentation",
            json!({"library": "obscure-lib", "topic": "init"}),
        )
        .await
        .expect("tool runs");

    assert!(result.success);
    assert!(result.content.starts_with(FALLBACK_LABEL));
    assert!(result.content.contains("Call obscure_lib.init() before use."));
}

#[tokio::test]
async fn invalid_arguments_are_errors() {
    let server = MockServer::start().await;
    let registry = registry_for(&server, true);

    let err = registry
        .execute("fetch_documentation", json!({"library": "tokio"}))
        .await
        .unwrap_err();
    assert!(matches!(err, DocscoutError::Tool(_)));

    let err = registry
        .execute("web_search", json!({"query": "x", "max_results": 99}))
        .await
        .unwrap_err();
    assert!(matches!(err, DocscoutError::Tool(_)));
}

#[test]
fn unreadable_config_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = DocscoutConfig::from_file(&dir.path().join("missing.toml"));
    assert!(matches!(result, Err(DocscoutError::Io(_))));
}
