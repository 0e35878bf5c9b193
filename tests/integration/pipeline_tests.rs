//! End-to-end pipeline tests with mock websites and a mock oracle endpoint

use sitescout::config::{Config, OracleConfig, UserAgentConfig};
use sitescout::crawler::HttpFetcher;
use sitescout::oracle::AnthropicOracle;
use sitescout::pipeline::{Pipeline, PipelineRequest};
use sitescout::progress::{NdjsonSink, ProgressEvent, WireEvent, WireKind};
use sitescout::storage::{ResponseStatus, ResponseStore, SqliteStorage};
use sitescout::{FetchError, PipelineError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn oracle_answer(answer: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": answer}],
        "stop_reason": "end_turn"
    }))
}

fn oracle_config(oracle_server: &MockServer) -> OracleConfig {
    OracleConfig {
        api_url: format!("{}/v1/messages", oracle_server.uri()),
        timeout_secs: 5,
        ..OracleConfig::default()
    }
}

fn build_pipeline(oracle_server: &MockServer, fetch_timeout: Duration) -> Pipeline {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        ..UserAgentConfig::default()
    };
    let fetcher =
        HttpFetcher::with_timeout(&user_agent, fetch_timeout, 5).expect("Failed to build fetcher");
    let oracle = AnthropicOracle::new(&oracle_config(oracle_server), "test-key")
        .expect("Failed to build oracle");
    Pipeline::new(Arc::new(fetcher), Arc::new(oracle))
}

/// Site with a directory page and two listings naming the same company
async fn mount_directory_site(site: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<h1>Directory</h1><a href="/x">Listing X</a><a href="/y">Listing Y</a>"#,
        ))
        .mount(site)
        .await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html("<p>Acme Corp, 123 Main St</p>"))
        .mount(site)
        .await;

    Mock::given(method("GET"))
        .and(path("/y"))
        .respond_with(html("<p>ACME CORP at 123 main st (branch listing)</p>"))
        .mount(site)
        .await;
}

/// Oracle that recognizes the two listing pages and finds nothing elsewhere
async fn mount_directory_oracle(oracle: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("Acme Corp, 123 Main St"))
        .respond_with(oracle_answer(
            r#"[{"company_name": "Acme Corp", "address": "123 Main St"}]"#,
        ))
        .mount(oracle)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("branch listing"))
        .respond_with(oracle_answer(
            "```json\n[{\"company_name\": \"ACME CORP\", \"address\": \"123 main st\"}]\n```",
        ))
        .mount(oracle)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(oracle_answer("[]"))
        .mount(oracle)
        .await;
}

#[tokio::test]
async fn test_pipeline_deduplicates_across_pages() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    mount_directory_site(&site).await;
    mount_directory_oracle(&oracle).await;

    let pipeline = build_pipeline(&oracle, Duration::from_secs(5));
    let request = PipelineRequest {
        start_url: format!("{}/", site.uri()),
        max_depth: 1,
        max_pages: 10,
    };

    let mut events = Vec::new();
    let report = pipeline
        .run(&request, &mut events, &CancellationToken::new())
        .await
        .expect("Pipeline failed");

    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.companies_found, 1);
    assert_eq!(report.companies[0].company_name, "Acme Corp");
    assert_eq!(report.companies[0].source_url, format!("{}/x", site.uri()));

    let requests = oracle.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    assert!(matches!(events.first(), Some(ProgressEvent::Started { .. })));
    assert!(matches!(events.last(), Some(ProgressEvent::Complete { .. })));
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
}

#[tokio::test]
async fn test_seed_timeout_still_completes() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<p>Slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&site)
        .await;

    Mock::given(method("POST"))
        .respond_with(oracle_answer("[]"))
        .expect(0)
        .mount(&oracle)
        .await;

    let pipeline = build_pipeline(&oracle, Duration::from_millis(200));
    let request = PipelineRequest::new(format!("{}/", site.uri()));

    let mut events = Vec::new();
    let report = pipeline
        .run(&request, &mut events, &CancellationToken::new())
        .await
        .expect("A single fetch failure must not fail the pipeline");

    assert_eq!(report.pages_crawled, 1);
    assert_eq!(report.companies_found, 0);

    let seed_error = events.iter().find_map(|event| match event {
        ProgressEvent::PageFetched { error, .. } => error.clone(),
        _ => None,
    });
    assert!(matches!(seed_error, Some(FetchError::Network { .. })));
    assert!(matches!(events.last(), Some(ProgressEvent::Complete { .. })));
}

#[tokio::test]
async fn test_oracle_outage_is_not_fatal() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    mount_directory_site(&site).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&oracle)
        .await;

    let pipeline = build_pipeline(&oracle, Duration::from_secs(5));
    let request = PipelineRequest {
        start_url: format!("{}/", site.uri()),
        max_depth: 1,
        max_pages: 10,
    };

    let mut events = Vec::new();
    let report = pipeline
        .run(&request, &mut events, &CancellationToken::new())
        .await
        .expect("Oracle failures must not fail the pipeline");

    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.companies_found, 0);
    assert!(matches!(events.last(), Some(ProgressEvent::Complete { .. })));
}

#[tokio::test]
async fn test_ndjson_stream_and_persistence() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    mount_directory_site(&site).await;
    mount_directory_oracle(&oracle).await;

    let pipeline = build_pipeline(&oracle, Duration::from_secs(5));
    let request = PipelineRequest {
        start_url: format!("{}/", site.uri()),
        max_depth: 1,
        max_pages: 10,
    };

    let mut stream = NdjsonSink::new(Vec::new());
    let mut events = Vec::new();
    pipeline
        .run(&request, (&mut stream, &mut events), &CancellationToken::new())
        .await
        .expect("Pipeline failed");

    let output = String::from_utf8(stream.into_inner()).unwrap();
    let wire: Vec<WireEvent> = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("Every line must be a wire event"))
        .collect();

    assert_eq!(wire.len(), events.len());
    assert!(wire.iter().all(|event| event.kind != WireKind::Message));
    assert_eq!(wire[0].message, format!("Starting scrape of {}/...", site.uri()));
    let last = wire.last().unwrap();
    assert_eq!(last.kind, WireKind::Complete);
    assert_eq!(last.message, "✅ Complete! Found 1 companies.");
    assert_eq!(last.data.as_ref().unwrap()["companies_found"], serde_json::json!(1));

    let dir = tempfile::tempdir().unwrap();
    let mut storage = SqliteStorage::new(&dir.path().join("responses.db")).unwrap();
    let id = storage
        .save_response(&request, &wire, Some("confighash"))
        .unwrap();

    let stored = storage.get_response(id).unwrap();
    assert_eq!(stored.status, ResponseStatus::Complete);
    assert_eq!(stored.request, request);
    assert_eq!(stored.report().unwrap().companies_found, 1);
}

#[tokio::test]
async fn test_invalid_request_makes_no_requests() {
    let oracle = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(oracle_answer("[]"))
        .expect(0)
        .mount(&oracle)
        .await;

    let pipeline = build_pipeline(&oracle, Duration::from_secs(5));
    let request = PipelineRequest {
        start_url: "not a url".to_string(),
        max_depth: 2,
        max_pages: 20,
    };

    let mut events = Vec::new();
    let result = pipeline
        .run(&request, &mut events, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(PipelineError::Validation(_))));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].to_wire().kind, WireKind::Error);
}

#[tokio::test]
async fn test_spawned_pipeline_from_config() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;
    mount_directory_site(&site).await;
    mount_directory_oracle(&oracle).await;

    std::env::set_var("SITESCOUT_INTEGRATION_TEST_KEY", "test-key");
    let mut config = Config::default();
    config.oracle = OracleConfig {
        api_key_env: "SITESCOUT_INTEGRATION_TEST_KEY".to_string(),
        ..oracle_config(&oracle)
    };
    config.crawler.max_depth = 1;

    let pipeline = Arc::new(Pipeline::from_config(&config).expect("Failed to build pipeline"));
    let request = PipelineRequest::from_config(format!("{}/", site.uri()), &config.crawler);

    let mut handle = pipeline.spawn(request, CancellationToken::new());
    let mut names = Vec::new();
    while let Some(event) = handle.events.recv().await {
        names.push(event.name());
    }

    assert_eq!(names.first(), Some(&"started"));
    assert_eq!(names.last(), Some(&"complete"));

    let report = handle.finish().await.expect("Pipeline failed");
    assert_eq!(report.companies_found, 1);
}

#[tokio::test]
async fn test_cancellation_mid_crawl() {
    let site = MockServer::start().await;
    let oracle = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<p>Home</p><a href="/slow">Slow</a>"#))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>Slow</p>").set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;

    Mock::given(method("POST"))
        .respond_with(oracle_answer("[]"))
        .mount(&oracle)
        .await;

    let pipeline = Arc::new(build_pipeline(&oracle, Duration::from_secs(10)));
    let cancel = CancellationToken::new();
    let mut handle = pipeline.spawn(PipelineRequest::new(format!("{}/", site.uri())), cancel.clone());

    // Cancel once the slow page has been dequeued
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        if matches!(&event, ProgressEvent::ExtractionProgress { index: 1, .. }) {
            cancel.cancel();
        }
        events.push(event);
    }

    let result = handle.finish().await;
    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Error {
            reason: "Pipeline cancelled".to_string()
        })
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, ProgressEvent::Complete { .. })));
}
