//! End-to-end tests: config file, HTTP crawl and FAQ generation
//!
//! The site and the chat completions API are both served by wiremock.

use faqsmith::config::load_config_with_hash;
use faqsmith::generation::{OpenAiClient, TextGenerator};
use faqsmith::output::{run_pipeline, write_json, FaqRunStatus, PipelineRequest, ScrapeStatus};
use faqsmith::render::DefaultConnector;
use faqsmith::{Config, ErrorCategory};
use serde_json::json;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a config pointing the generator at `api_base` and loads it
fn load_test_config(api_base: &str) -> (Config, String, tempfile::NamedTempFile) {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
[crawler]
max-pages = 5

[retry]
max-attempts = 2
base-delay-ms = 5
max-jitter-ms = 0

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"

[renderer]
local-engine = "http"
navigation-timeout-secs = 5

[generation]
base-url = "{}"
model = "test-model"
min-confidence = 0.7
request-timeout-secs = 5
"#,
        api_base
    )
    .expect("Failed to write config");

    let (mut config, hash) = load_config_with_hash(file.path()).expect("Failed to load config");
    config.generation.api_key = Some("sk-test".to_string());
    (config, hash, file)
}

async fn mount_site(site: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Acme</title></head><body><main>
                <h1>Acme Widgets</h1><p>Acme sells widgets to small teams.</p>
                <a href="/pricing">Pricing</a>
                </main></body></html>"#,
            "text/html",
        ))
        .mount(site)
        .await;

    Mock::given(method("GET"))
        .and(path("/pricing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Pricing</title></head><body><main>
                <h2>Plans</h2><p>The starter plan is free for up to three users.</p>
                </main></body></html>"#,
            "text/html",
        ))
        .mount(site)
        .await;
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

fn faq_payload(site: &str) -> String {
    json!({
        "faqs": [
            {
                "question": "How much does the starter plan cost?",
                "answer": "The starter plan is free for up to three users.",
                "confidence": 0.92,
                "sourceUrl": format!("{}/pricing", site),
                "sourcePage": "Pricing",
                "metadata": { "relevance": 0.9, "category": "pricing", "keywords": ["plan"] }
            },
            {
                "question": "Does Acme have a mobile app?",
                "answer": "The site does not mention a mobile app at all.",
                "confidence": 0.4,
                "sourceUrl": format!("{}/", site),
                "sourcePage": "Acme"
            }
        ]
    })
    .to_string()
}

fn owner_request(site: &MockServer, hash: String) -> PipelineRequest {
    let mut request = PipelineRequest::new(site.uri());
    request.site_owner = true;
    request.config_hash = Some(hash);
    request
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    mount_site(&site).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&faq_payload(&site.uri()))))
        .expect(1)
        .mount(&api)
        .await;

    let (config, hash, _file) = load_test_config(&api.uri());
    let connector = DefaultConnector::new(config.renderer.clone(), config.user_agent.clone());
    let client = OpenAiClient::new(&config.generation).expect("Failed to build client");

    let mut request = owner_request(&site, hash.clone());
    request.options = (&config.generation).into();

    let report = run_pipeline(
        &config,
        &connector,
        Some(&client as &dyn TextGenerator),
        &request,
        &CancellationToken::new(),
        |_| {},
    )
    .await;

    assert!(report.success());
    assert_eq!(report.scrape.status, ScrapeStatus::FaqGenerated);
    assert_eq!(report.scrape.pages.len(), 2);
    assert_eq!(report.scrape.metadata.renderer.as_deref(), Some("http"));
    assert_eq!(report.scrape.metadata.config_hash.as_deref(), Some(hash.as_str()));

    let faq = report.faq.as_ref().expect("FAQ run missing");
    assert_eq!(faq.status, FaqRunStatus::Completed);
    assert_eq!(faq.faqs.len(), 1);
    assert_eq!(faq.faqs[0].source_page, "Pricing");
    assert_eq!(faq.metadata.filtered_low_confidence, 1);
    assert_eq!(faq.metadata.model, "test-model");

    // The exported JSON carries both records
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("run.json");
    write_json(&report, &out).expect("Failed to write JSON");
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["scrape"]["status"], "faq_generated");
    assert_eq!(value["faq"]["scrape_id"], value["scrape"]["id"]);
    assert_eq!(
        value["faq"]["faqs"][0]["question"],
        "How much does the starter plan cost?"
    );
}

#[tokio::test]
async fn test_invalid_model_output_recorded() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    mount_site(&site).await;

    let bad = r#"{"faqs":[{"question":"Why?","answer":"Because it is that way.","confidence":0.9,"sourceUrl":"https://example.com","sourcePage":"Home"}]}"#;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(bad)))
        .expect(1)
        .mount(&api)
        .await;

    let (config, hash, _file) = load_test_config(&api.uri());
    let connector = DefaultConnector::new(config.renderer.clone(), config.user_agent.clone());
    let client = OpenAiClient::new(&config.generation).expect("Failed to build client");

    let report = run_pipeline(
        &config,
        &connector,
        Some(&client as &dyn TextGenerator),
        &owner_request(&site, hash),
        &CancellationToken::new(),
        |_| {},
    )
    .await;

    assert!(!report.success());
    assert_eq!(report.scrape.status, ScrapeStatus::ScrapingCompleted);

    let faq = report.faq.expect("FAQ run missing");
    assert_eq!(faq.status, FaqRunStatus::Error);
    assert_eq!(faq.error_category, Some(ErrorCategory::Validation));
    assert_eq!(faq.raw_response.as_deref(), Some(bad));
    assert!(faq.faqs.is_empty());
}

#[tokio::test]
async fn test_rate_limited_generation_retried() {
    let site = MockServer::start().await;
    let api = MockServer::start().await;
    mount_site(&site).await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&api)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&faq_payload(&site.uri()))))
        .expect(1)
        .mount(&api)
        .await;

    let (config, hash, _file) = load_test_config(&api.uri());
    let connector = DefaultConnector::new(config.renderer.clone(), config.user_agent.clone());
    let client = OpenAiClient::new(&config.generation).expect("Failed to build client");

    let report = run_pipeline(
        &config,
        &connector,
        Some(&client as &dyn TextGenerator),
        &owner_request(&site, hash),
        &CancellationToken::new(),
        |_| {},
    )
    .await;

    assert!(report.success());
    assert_eq!(report.faq.map(|f| f.faqs.len()), Some(1));
}

#[tokio::test]
async fn test_third_party_site_without_credential_fails() {
    let site = MockServer::start().await;
    mount_site(&site).await;

    let (config, hash, _file) = load_test_config("https://api.example.com/v1");
    let connector = DefaultConnector::new(config.renderer.clone(), config.user_agent.clone());

    let mut request = owner_request(&site, hash);
    request.site_owner = false;

    let report = run_pipeline(
        &config,
        &connector,
        None,
        &request,
        &CancellationToken::new(),
        |_| {},
    )
    .await;

    assert!(!report.success());
    assert_eq!(report.scrape.status, ScrapeStatus::Error);
    assert_eq!(
        report.scrape.metadata.error_category,
        Some(ErrorCategory::Permanent)
    );
    assert!(report.scrape.pages.is_empty());
}
