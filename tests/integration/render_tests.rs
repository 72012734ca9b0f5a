//! Integration tests for the plain HTTP renderer

use faqsmith::config::{RendererConfig, UserAgentConfig};
use faqsmith::render::{HttpSession, RenderSession};
use faqsmith::{ErrorCategory, FaqError};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_session() -> HttpSession {
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    let renderer = RendererConfig {
        navigation_timeout_secs: 5,
        ..RendererConfig::default()
    };
    HttpSession::new(&user_agent, &renderer).expect("Failed to build session")
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page)).expect("Failed to parse URL")
}

#[tokio::test]
async fn test_open_returns_html_and_sends_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><title>About</title></html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = create_session();
    let url = page_url(&mock_server, "/about");
    let page = session.open(&url).await.expect("Render failed");

    assert_eq!(page.requested_url, url);
    assert_eq!(page.final_url, url);
    assert!(page.html.contains("<title>About</title>"));
}

#[tokio::test]
async fn test_redirect_sets_final_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>Moved here</body></html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let session = create_session();
    let page = session
        .open(&page_url(&mock_server, "/old"))
        .await
        .expect("Render failed");

    assert_eq!(page.requested_url.path(), "/old");
    assert_eq!(page.final_url.path(), "/new");
}

#[tokio::test]
async fn test_not_found_is_permanent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = create_session()
        .open(&page_url(&mock_server, "/missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, FaqError::HttpStatus { status: 404, .. }));
    assert_eq!(err.category(), ErrorCategory::Permanent);
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = create_session()
        .open(&page_url(&mock_server, "/"))
        .await
        .unwrap_err();

    assert!(matches!(err, FaqError::HttpStatus { status: 503, .. }));
    assert_eq!(err.category(), ErrorCategory::Transient);
}

#[tokio::test]
async fn test_non_html_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let err = create_session()
        .open(&page_url(&mock_server, "/report"))
        .await
        .unwrap_err();

    match &err {
        FaqError::ContentMismatch { content_type, .. } => {
            assert_eq!(content_type, "application/pdf")
        }
        other => panic!("expected content mismatch, got {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Permanent);
}
