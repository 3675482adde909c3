//! Integration tests for the crawl pipeline
//!
//! These tests run the full fetch-chunk-embed-upsert path against wiremock
//! servers standing in for the website, the embedding endpoint, and the
//! vector index.

use silkworm::config::{
    CleanupConfig, Config, CrawlerConfig, EmbeddingConfig, IndexConfig, OutputConfig,
    ProcessingConfig, SourcesConfig,
};
use silkworm::crawler::run_crawl;
use silkworm::embedder::HttpEmbedder;
use silkworm::index::RestIndex;
use silkworm::SilkwormError;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIMENSION: usize = 8;

/// Builds a config pointing at the three mock servers.
fn test_config(
    sources: SourcesConfig,
    embed_uri: &str,
    index_uri: &str,
    dir: &TempDir,
) -> Config {
    Config {
        sources,
        crawler: CrawlerConfig {
            max_pages: 50,
            max_depth: 3,
            request_timeout_secs: 5,
            fetch_retries: 1,
            failure_window: 20,
            failure_threshold: 0.8,
            ..CrawlerConfig::default()
        },
        processing: ProcessingConfig {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_text_length: 50,
        },
        embedding: EmbeddingConfig {
            endpoint: embed_uri.to_string(),
            model: "test-embedder".to_string(),
            dimension: DIMENSION,
            api_key_env: "EMBEDDING_API_KEY".to_string(),
            max_retries: 2,
        },
        index: IndexConfig {
            endpoint: index_uri.to_string(),
            api_key_env: "VECTOR_INDEX_API_KEY".to_string(),
            upsert_batch_size: 10,
        },
        cleanup: CleanupConfig::default(),
        output: OutputConfig {
            processed_urls_path: dir
                .path()
                .join("processed.json")
                .to_string_lossy()
                .into_owned(),
            record_log_path: dir
                .path()
                .join("records.jsonl")
                .to_string_lossy()
                .into_owned(),
        },
    }
}

fn start_url_sources(start: &str) -> SourcesConfig {
    SourcesConfig {
        use_start_url: true,
        start_url: Some(start.to_string()),
        ..SourcesConfig::default()
    }
}

/// Mounts an embedding endpoint that returns a fixed healthy vector.
async fn mount_embedder(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "embedding": vec![0.5f32; DIMENSION], "index": 0 }],
            "model": "test-embedder"
        })))
        .mount(server)
        .await;
}

/// Mounts the index stats and upsert endpoints.
async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dimension": DIMENSION,
            "totalVectorCount": 0
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "upsertedCount": 1
        })))
        .mount(server)
        .await;
}

/// Collects the record ids of every upsert request the index received.
async fn upserted_ids(server: &MockServer) -> Vec<String> {
    let mut ids = Vec::new();
    for request in server.received_requests().await.unwrap_or_default() {
        if request.url.path() == "/vectors/upsert" {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            for vector in body["vectors"].as_array().unwrap() {
                ids.push(vector["id"].as_str().unwrap().to_string());
            }
        }
    }
    ids
}

fn long_text() -> String {
    "This paragraph carries more than eighty characters of plain page text \
     so it clears the minimum chunk length comfortably."
        .to_string()
}

#[tokio::test]
async fn crawl_indexes_linked_page_and_records_failure() {
    let site = MockServer::start().await;
    let embed = MockServer::start().await;
    let index = MockServer::start().await;
    mount_embedder(&embed).await;
    mount_index(&index).await;

    // Root page: little text, links to /a (healthy) and /b (dead).
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!(
                    r#"<html><body><a href="{0}/a">a</a><a href="{0}/b">b</a></body></html>"#,
                    site.uri()
                ),
                "text/html",
            ),
        )
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!("<html><body><p>{}</p></body></html>", long_text()),
                "text/html",
            ),
        )
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        start_url_sources(&format!("{}/", site.uri())),
        &embed.uri(),
        &index.uri(),
        &dir,
    );

    let embedder = HttpEmbedder::new(&config.embedding, "key", Duration::from_secs(5)).unwrap();
    let store = RestIndex::new(&config.index, "key", Duration::from_secs(5)).unwrap();

    let report = run_crawl(&config, &embedder, &store).await.unwrap();

    // /, /a, /b all entered the visited set; only /b failed.
    assert_eq!(report.urls_visited, 3);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 1);

    // The root page text is below the minimum, so only /a produced a chunk.
    assert_eq!(report.chunks_indexed, 1);
    assert_eq!(report.batches.records_upserted, 1);
    assert_eq!(upserted_ids(&index).await.len(), 1);
}

#[tokio::test]
async fn short_page_is_crawled_but_not_indexed() {
    let site = MockServer::start().await;
    let embed = MockServer::start().await;
    let index = MockServer::start().await;
    mount_embedder(&embed).await;
    mount_index(&index).await;

    // 49 characters of text: one below the minimum of 50.
    let text = "x".repeat(49);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!("<html><body><p>{}</p></body></html>", text),
                "text/html",
            ),
        )
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        start_url_sources(&format!("{}/", site.uri())),
        &embed.uri(),
        &index.uri(),
        &dir,
    );

    let embedder = HttpEmbedder::new(&config.embedding, "key", Duration::from_secs(5)).unwrap();
    let store = RestIndex::new(&config.index, "key", Duration::from_secs(5)).unwrap();

    let report = run_crawl(&config, &embedder, &store).await.unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.chunks_indexed, 0);
    assert!(upserted_ids(&index).await.is_empty());
}

#[tokio::test]
async fn reindexing_produces_the_same_record_ids() {
    let site = MockServer::start().await;
    let embed = MockServer::start().await;
    let index = MockServer::start().await;
    mount_embedder(&embed).await;
    mount_index(&index).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                format!("<html><body><p>{}</p></body></html>", long_text()),
                "text/html",
            ),
        )
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        start_url_sources(&format!("{}/", site.uri())),
        &embed.uri(),
        &index.uri(),
        &dir,
    );

    let embedder = HttpEmbedder::new(&config.embedding, "key", Duration::from_secs(5)).unwrap();
    let store = RestIndex::new(&config.index, "key", Duration::from_secs(5)).unwrap();

    let first = run_crawl(&config, &embedder, &store).await.unwrap();
    let ids_after_first = upserted_ids(&index).await;

    let second = run_crawl(&config, &embedder, &store).await.unwrap();
    let all_ids = upserted_ids(&index).await;
    let ids_after_second = &all_ids[ids_after_first.len()..];

    // Same page, same chunking: the second run upserts the same id set,
    // overwriting rather than duplicating.
    assert_eq!(first.chunks_indexed, second.chunks_indexed);
    assert_eq!(ids_after_first, ids_after_second);
}

#[tokio::test]
async fn dead_site_aborts_via_failure_budget() {
    let site = MockServer::start().await;
    let embed = MockServer::start().await;
    let index = MockServer::start().await;
    mount_embedder(&embed).await;
    mount_index(&index).await;

    // Every page on the site is gone.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let sources = SourcesConfig {
        use_manual_urls: true,
        manual_urls: vec![
            format!("{}/one", site.uri()),
            format!("{}/two", site.uri()),
            format!("{}/three", site.uri()),
        ],
        ..SourcesConfig::default()
    };
    let mut config = test_config(sources, &embed.uri(), &index.uri(), &dir);
    config.crawler.failure_window = 2;
    config.crawler.failure_threshold = 1.0;

    let embedder = HttpEmbedder::new(&config.embedding, "key", Duration::from_secs(5)).unwrap();
    let store = RestIndex::new(&config.index, "key", Duration::from_secs(5)).unwrap();

    let result = run_crawl(&config, &embedder, &store).await;
    assert!(matches!(result, Err(SilkwormError::CrawlAborted { .. })));
}

#[tokio::test]
async fn dimension_mismatch_fails_before_any_fetch() {
    let site = MockServer::start().await;
    let embed = MockServer::start().await;
    let index = MockServer::start().await;
    mount_embedder(&embed).await;

    // The index reports a different dimensionality than the embedder.
    Mock::given(method("GET"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dimension": DIMENSION * 2
        })))
        .mount(&index)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        start_url_sources(&format!("{}/", site.uri())),
        &embed.uri(),
        &index.uri(),
        &dir,
    );

    let embedder = HttpEmbedder::new(&config.embedding, "key", Duration::from_secs(5)).unwrap();
    let store = RestIndex::new(&config.index, "key", Duration::from_secs(5)).unwrap();

    let result = run_crawl(&config, &embedder, &store).await;
    assert!(matches!(
        result,
        Err(SilkwormError::Config(
            silkworm::ConfigError::DimensionMismatch { .. }
        ))
    ));

    // No page was requested from the site.
    assert!(site.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn offsite_links_are_not_followed() {
    let site = MockServer::start().await;
    let embed = MockServer::start().await;
    let index = MockServer::start().await;
    mount_embedder(&embed).await;
    mount_index(&index).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"<html><body>
                        <a href="https://elsewhere.example.org/page">offsite</a>
                        <a href="/img/logo.png">asset</a>
                    </body></html>"#,
                "text/html",
            ),
        )
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(
        start_url_sources(&format!("{}/", site.uri())),
        &embed.uri(),
        &index.uri(),
        &dir,
    );

    let embedder = HttpEmbedder::new(&config.embedding, "key", Duration::from_secs(5)).unwrap();
    let store = RestIndex::new(&config.index, "key", Duration::from_secs(5)).unwrap();

    let report = run_crawl(&config, &embedder, &store).await.unwrap();

    // Only the root: the offsite link and the image asset never enqueue.
    assert_eq!(report.urls_visited, 1);
    assert_eq!(report.pages_fetched, 1);
}
