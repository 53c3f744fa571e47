//! End-to-end pipeline test: flyer bytes in, synced records out, with
//! both remote services mocked.

use flyer_sync::config::TransportConfig;
use flyer_sync::contacts::InMemoryContactBook;
use flyer_sync::extraction::FlyerExtractor;
use flyer_sync::sync::SyncOrchestrator;
use flyer_sync::transport::RetryingClient;
use flyer_sync::types::{ContactRecord, SyncStatus};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> RetryingClient {
    RetryingClient::new(&TransportConfig {
        max_attempts: 3,
        base_delay_ms: 5,
        timeout_seconds: 5,
    })
    .unwrap()
}

fn fenced_flyer_payload() -> String {
    let events = json!([
        {
            "mainArtist": "Gold Casio",
            "fullLineup": "Gold Casio, Sick Sad World",
            "date": "2025-05-01",
            "location": "Sunset Tavern, Seattle, WA"
        },
        {
            "mainArtist": "The Black Tones",
            "fullLineup": "",
            "date": "2025-05-02",
            "location": "Neumos, Seattle, WA"
        }
    ]);
    format!("```json\n{}\n```", events)
}

#[tokio::test]
async fn extracts_from_flyer_and_syncs_every_record() {
    let ai_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": fenced_flyer_payload() }] } }]
        })))
        .expect(1)
        .mount(&ai_server)
        .await;

    let proxy_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"notionPageId": "pg-1"})))
        .expect(2)
        .mount(&proxy_server)
        .await;

    let extractor =
        FlyerExtractor::new(transport(), ai_server.uri(), "test-key".to_string());
    let mut records = extractor.extract(b"fake-jpeg-bytes").await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == SyncStatus::ReadyToSync));
    assert_ne!(records[0].id, records[1].id);

    let contacts = InMemoryContactBook::new(vec![ContactRecord {
        artist: "Sick Sad World".to_string(),
        manager: "Dana Wells".to_string(),
        email: "dana@booking.example".to_string(),
        phone: "555-0123".to_string(),
    }]);
    let orchestrator =
        SyncOrchestrator::new(transport(), proxy_server.uri(), Arc::new(contacts));
    let report = orchestrator.sync_all(&mut records).await;

    assert_eq!(report.success_count, 2);
    assert_eq!(report.fail_count, 0);
    assert!(records.iter().all(|r| r.status == SyncStatus::Success));
    assert!(records.iter().all(|r| r.page_id.as_deref() == Some("pg-1")));

    // The proxy saw the resolved contact for the support act.
    let requests = proxy_server.received_requests().await.unwrap();
    let first_body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(first_body.contains("Gold Casio: Sunset Tavern"));
    assert!(first_body.contains("Dana Wells"));
}

#[tokio::test]
async fn extraction_failure_produces_no_records_and_no_sync_traffic() {
    let ai_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [] } }]
        })))
        .expect(1)
        .mount(&ai_server)
        .await;

    let extractor = FlyerExtractor::new(transport(), ai_server.uri(), "test-key".to_string());
    let err = extractor.extract(b"fake-jpeg-bytes").await.unwrap_err();
    assert_eq!(err.to_string(), "AI did not return structured data");
}

#[tokio::test]
async fn flaky_ai_endpoint_is_retried_transparently() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let ai_server = MockServer::start().await;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();
    Mock::given(method("POST"))
        .respond_with(move |_: &wiremock::Request| {
            if hits_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(502)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": fenced_flyer_payload() }] } }]
                }))
            }
        })
        .expect(2)
        .mount(&ai_server)
        .await;

    let extractor = FlyerExtractor::new(transport(), ai_server.uri(), "test-key".to_string());
    let records = extractor.extract(b"fake-jpeg-bytes").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
