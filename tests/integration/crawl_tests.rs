//! Fetcher and crawler tests against mock HTTP servers

use sitescout::config::UserAgentConfig;
use sitescout::crawler::{
    ContentExtractor, CrawlLimits, Crawler, ExtractorLimits, Fetch, HttpFetcher, PageResult,
};
use sitescout::url::{normalize_url, DomainScope};
use sitescout::FetchError;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: Some("https://example.com/contact".to_string()),
        contact_email: Some("test@example.com".to_string()),
    }
}

fn fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::with_timeout(&test_user_agent(), timeout, 5).expect("Failed to build fetcher")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn crawl_all(
    fetcher: &HttpFetcher,
    seed: &str,
    max_depth: u32,
    max_pages: u32,
) -> Vec<PageResult> {
    let seed = normalize_url(seed).expect("Failed to normalize seed");
    let scope = DomainScope::for_seed(&seed, false).expect("Failed to scope seed");
    let extractor = ContentExtractor::new(scope, ExtractorLimits::default());
    let mut crawler = Crawler::new(
        fetcher,
        seed,
        CrawlLimits {
            max_depth,
            max_pages,
        },
        extractor,
    );

    let mut pages = Vec::new();
    while let Some(page) = crawler.next_page().await {
        pages.push(page);
    }
    pages
}

#[tokio::test]
async fn test_fetch_returns_body_and_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(html("<p>Hello</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert!(body.contains("Hello"));
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await;

    assert_eq!(result, Err(FetchError::HttpStatus { code: 404 }));
}

#[tokio::test]
async fn test_fetch_timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html("<p>Too late</p>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let result = fetcher(Duration::from_millis(200))
        .fetch(&format!("{}/", mock_server.uri()))
        .await;

    assert!(
        matches!(result, Err(FetchError::Network { .. })),
        "expected network error, got {:?}",
        result
    );
}

#[tokio::test]
async fn test_off_site_redirect_not_followed() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/ext", elsewhere.uri()).as_str()),
        )
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<p>External site content</p>"))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let result = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/r", site.uri()))
        .await;

    assert_eq!(result, Err(FetchError::HttpStatus { code: 302 }));
}

#[tokio::test]
async fn test_fetch_follows_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<p>Moved here</p>"))
        .mount(&mock_server)
        .await;

    let body = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/old", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert!(body.contains("Moved here"));
}

#[tokio::test]
async fn test_crawl_stays_on_seed_site() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let other_url = other_server.uri();

    // A different port is a different site; nothing there may be fetched
    Mock::given(method("GET"))
        .respond_with(html("<p>External</p>"))
        .expect(0)
        .mount(&other_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<a href="{base}/one">One</a>
               <a href="{other}/x">External X</a>
               <a href="/two">Two</a>
               <a href="{other}/y">External Y</a>
               <a href="three">Three</a>"#,
            base = base_url,
            other = other_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html(r#"<a href="/deeper">Deeper</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    for page_path in ["/two", "/three"] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(html("<p>Leaf</p>"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    // Beyond max_depth=1
    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html("<p>Deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let pages = crawl_all(
        &fetcher(Duration::from_secs(5)),
        &format!("{}/", base_url),
        1,
        10,
    )
    .await;

    let paths: Vec<&str> = pages.iter().map(|p| p.url.path()).collect();
    assert_eq!(paths, vec!["/", "/one", "/two", "/three"]);
    assert!(pages.iter().all(PageResult::is_ok));
    assert_eq!(pages[0].depth, 0);
    assert!(pages[1..].iter().all(|p| p.depth == 1));
}

#[tokio::test]
async fn test_crawl_records_failures_and_continues() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/broken">Broken</a><a href="/ok">Ok</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<p>Fine</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pages = crawl_all(
        &fetcher(Duration::from_secs(5)),
        &format!("{}/", mock_server.uri()),
        2,
        20,
    )
    .await;

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[1].error, Some(FetchError::HttpStatus { code: 500 }));
    assert!(pages[1].text.is_empty());
    assert!(pages[2].is_ok());
    assert_eq!(pages[2].text, "Fine");
}

#[tokio::test]
async fn test_crawl_page_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a><a href="/4">4</a><a href="/5">5</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pages = crawl_all(
        &fetcher(Duration::from_secs(5)),
        &format!("{}/", mock_server.uri()),
        3,
        1,
    )
    .await;

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].links.len(), 5);

    // Only the seed was requested
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
