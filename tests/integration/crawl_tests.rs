//! Integration tests for the crawler
//!
//! These tests crawl a wiremock site through the plain HTTP renderer and
//! check the full crawl cycle end-to-end.

use faqsmith::config::{LocalEngine, RendererConfig, UserAgentConfig};
use faqsmith::crawler::{crawl_site, CrawlRequest};
use faqsmith::render::{DefaultConnector, RenderProfile};
use faqsmith::retry::RetryPolicy;
use faqsmith::url::ScopeRules;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_connector() -> DefaultConnector {
    let renderer = RendererConfig {
        local_engine: LocalEngine::Http,
        navigation_timeout_secs: 5,
        ..RendererConfig::default()
    };
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    DefaultConnector::new(renderer, user_agent)
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(5),
        max_jitter: Duration::ZERO,
    }
}

async fn mount_page(server: &MockServer, page: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

/// Home links to two pages; page1 links deeper and off-site
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <nav>Menu</nav>
            <main><h1>Welcome</h1><p>We build widgets.</p>
            <a href="/page1">Page 1</a>
            <a href="/page2#section">Page 2</a>
            <a href="/brochure.pdf">Brochure</a>
            <a href="https://other.example.org/">Elsewhere</a>
            </main></body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body>
            <main><h2>Shipping</h2><p>We ship worldwide.</p>
            <a href="/page1/details">Details</a>
            <a href="/">Home</a>
            </main></body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body>
            <article><p>Returns are free within 30 days.</p></article>
            </body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/page1/details",
        r#"<html><head><title>Details</title></head><body>
            <main><p>Delivery takes three to five days.</p></main>
            </body></html>"#
            .to_string(),
    )
    .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let request = CrawlRequest::new(mock_server.uri(), 10);
    let mut progress = Vec::new();

    let report = crawl_site(
        &create_connector(),
        RenderProfile::Trusted,
        &request,
        &fast_retry(),
        &CancellationToken::new(),
        |p| progress.push(p.pages_scraped),
    )
    .await
    .expect("Crawl failed");

    let base = mock_server.uri();
    let urls: Vec<String> = report.pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base),
            format!("{}/page1/details", base),
        ]
    );

    let home = &report.pages[0];
    assert_eq!(home.title, "Home");
    assert!(home.content.contains("We build widgets."));
    assert!(!home.content.contains("Menu"));
    assert_eq!(home.headings, vec!["Welcome".to_string()]);
    assert!(home.links.iter().all(|l| l.starts_with(&base)));

    assert_eq!(report.backend, "http");
    assert!(report.failed.is_empty());
    assert_eq!(progress, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_budget_stops_crawl() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let request = CrawlRequest::new(mock_server.uri(), 2);

    let report = crawl_site(
        &create_connector(),
        RenderProfile::Trusted,
        &request,
        &fast_retry(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert!(report.pending > 0);
}

#[tokio::test]
async fn test_scope_rules_applied() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let mut request = CrawlRequest::new(mock_server.uri(), 10);
    request.scope = ScopeRules {
        path_prefixes: vec![],
        exclude_paths: vec!["/page1".to_string()],
        max_depth: Some(1),
    };

    let report = crawl_site(
        &create_connector(),
        RenderProfile::Trusted,
        &request,
        &fast_retry(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .expect("Crawl failed");

    let titles: Vec<&str> = report.pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "Page 2"]);
}

#[tokio::test]
async fn test_broken_page_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body><main>
            <a href="/gone">Gone</a><a href="/alive">Alive</a>
            </main></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/alive",
        "<html><head><title>Alive</title></head><body><main>Still here</main></body></html>"
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = crawl_site(
        &create_connector(),
        RenderProfile::Trusted,
        &CrawlRequest::new(mock_server.uri(), 10),
        &fast_retry(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, format!("{}/gone", mock_server.uri()));
    assert_eq!(report.visited, 3);
}

#[tokio::test]
async fn test_transient_failure_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/",
        "<html><head><title>Recovered</title></head><body><main>Back up</main></body></html>"
            .to_string(),
    )
    .await;

    let report = crawl_site(
        &create_connector(),
        RenderProfile::Trusted,
        &CrawlRequest::new(mock_server.uri(), 5),
        &fast_retry(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].title, "Recovered");
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn test_redirect_to_other_host_is_rejected() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    // Same port, different host name
    let other_base = other_server.uri().replace("127.0.0.1", "localhost");

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body><main>
            <p>Acme sells widgets.</p><a href="/partner">Partner</a>
            </main></body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/partner"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/landing", other_base).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &other_server,
        "/landing",
        r#"<html><head><title>Other Corp</title></head><body><main>
            <p>Other corp sells gadgets.</p></main></body></html>"#
            .to_string(),
    )
    .await;

    let report = crawl_site(
        &create_connector(),
        RenderProfile::Trusted,
        &CrawlRequest::new(mock_server.uri(), 10),
        &fast_retry(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .expect("Crawl failed");

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].title, "Home");
    assert!(report
        .pages
        .iter()
        .all(|p| !p.content.contains("gadgets")));

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, format!("{}/partner", mock_server.uri()));
    assert!(report.failed[0].error.contains("off-site"));
}
