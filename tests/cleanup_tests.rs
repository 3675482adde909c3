//! Integration tests for the index cleanup scanner
//!
//! These tests drive the scanner against a wiremock stand-in for the vector
//! index REST surface, including multi-page listings with a stable cursor.

use silkworm::cleanup::{default_rules, ScanOutcome, Scanner};
use silkworm::config::{CleanupConfig, IndexConfig};
use silkworm::index::RestIndex;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIMENSION: usize = 4;

fn index_config(endpoint: &str) -> IndexConfig {
    IndexConfig {
        endpoint: endpoint.to_string(),
        api_key_env: "VECTOR_INDEX_API_KEY".to_string(),
        upsert_batch_size: 50,
    }
}

fn cleanup_config(scan_batch: usize, max_iterations: u32) -> CleanupConfig {
    CleanupConfig {
        scan_batch_size: scan_batch,
        delete_batch_size: 100,
        max_iterations,
        near_zero_epsilon: 1e-6,
    }
}

fn healthy_entry(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "values": vec![0.5f32; DIMENSION],
        "metadata": {
            "url": "https://example.com/page",
            "text": "a perfectly reasonable chunk of page text that is long enough",
            "chunk_index": 0
        }
    })
}

fn near_zero_entry(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "values": vec![1e-9f32; DIMENSION],
        "metadata": {
            "url": "https://example.com/page",
            "text": "a perfectly reasonable chunk of page text that is long enough",
            "chunk_index": 1
        }
    })
}

async fn mount_stats(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dimension": DIMENSION
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn scan_deletes_defective_and_completes() {
    let server = MockServer::start().await;
    mount_stats(&server).await;

    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": [{"id": "good"}, {"id": "zero"}, {"id": "naked"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": {
                "good": healthy_entry("good"),
                "zero": near_zero_entry("zero"),
                // Missing metadata entirely: malformed.
                "naked": {"id": "naked", "values": vec![0.5f32; DIMENSION]}
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/vectors/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let index = RestIndex::new(&index_config(&server.uri()), "key", Duration::from_secs(5)).unwrap();
    let rules = default_rules(DIMENSION, 1e-6, 50);
    let scanner = Scanner::new(&index, rules, &cleanup_config(100, 10));

    let report = scanner.run().await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Completed);
    assert_eq!(report.examined, 3);
    assert_eq!(report.defective, 2);
    assert_eq!(report.deleted, 2);
    assert!(report.deleted <= report.examined);
    assert_eq!(report.remaining_suspected(), 0);
}

#[tokio::test]
async fn clean_index_deletes_nothing() {
    let server = MockServer::start().await;
    mount_stats(&server).await;

    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": [{"id": "a"}, {"id": "b"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": {
                "a": healthy_entry("a"),
                "b": healthy_entry("b")
            }
        })))
        .mount(&server)
        .await;

    // expect(0) asserts no delete request is ever sent.
    Mock::given(method("POST"))
        .and(path("/vectors/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let index = RestIndex::new(&index_config(&server.uri()), "key", Duration::from_secs(5)).unwrap();
    let rules = default_rules(DIMENSION, 1e-6, 50);
    let scanner = Scanner::new(&index, rules, &cleanup_config(100, 10));

    let report = scanner.run().await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Completed);
    assert_eq!(report.examined, 2);
    assert_eq!(report.deleted, 0);
}

#[tokio::test]
async fn cursor_pages_through_the_index() {
    let server = MockServer::start().await;
    mount_stats(&server).await;

    // The token-bearing mock must be mounted first so it wins the match.
    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .and(query_param("paginationToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": [{"id": "c"}, {"id": "d"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": [{"id": "a"}, {"id": "b"}],
            "pagination": {"next": "page-2"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .and(query_param("ids", "a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": {
                "a": healthy_entry("a"),
                "b": near_zero_entry("b")
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .and(query_param("ids", "c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": {
                "c": healthy_entry("c"),
                "d": healthy_entry("d")
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/vectors/delete"))
        .and(body_partial_json(serde_json::json!({"ids": ["b"]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let index = RestIndex::new(&index_config(&server.uri()), "key", Duration::from_secs(5)).unwrap();
    let rules = default_rules(DIMENSION, 1e-6, 50);
    let scanner = Scanner::new(&index, rules, &cleanup_config(2, 10));

    let report = scanner.run().await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Completed);
    assert_eq!(report.examined, 4);
    assert_eq!(report.iterations, 2);
    assert_eq!(report.deleted, 1);
}

#[tokio::test]
async fn iteration_cap_reports_incomplete() {
    let server = MockServer::start().await;
    mount_stats(&server).await;

    // Every page claims another follows; the cap has to stop the scan.
    Mock::given(method("GET"))
        .and(path("/vectors/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": [{"id": "x"}],
            "pagination": {"next": "again"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "vectors": {"x": healthy_entry("x")}
        })))
        .mount(&server)
        .await;

    let index = RestIndex::new(&index_config(&server.uri()), "key", Duration::from_secs(5)).unwrap();
    let rules = default_rules(DIMENSION, 1e-6, 50);
    let scanner = Scanner::new(&index, rules, &cleanup_config(1, 3));

    let report = scanner.run().await.unwrap();

    assert_eq!(report.outcome, ScanOutcome::Incomplete);
    assert_eq!(report.iterations, 3);
    assert_eq!(report.examined, 3);
}
