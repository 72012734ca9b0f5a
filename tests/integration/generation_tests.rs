//! Integration tests for the OpenAI-compatible generation client

use faqsmith::config::GenerationConfig;
use faqsmith::generation::{CompletionRequest, OpenAiClient, TextGenerator};
use faqsmith::{ErrorCategory, FaqError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(server: &MockServer) -> OpenAiClient {
    let config = GenerationConfig {
        base_url: format!("{}/", server.uri()),
        model: "test-model".to_string(),
        request_timeout_secs: 5,
        api_key: Some("sk-test".to_string()),
        ..GenerationConfig::default()
    };
    OpenAiClient::new(&config).expect("Failed to build client")
}

fn request() -> CompletionRequest {
    CompletionRequest {
        system_prompt: "You write FAQs.".to_string(),
        user_prompt: "Page: Home".to_string(),
        temperature: 0.3,
        max_output_tokens: 512,
    }
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 20, "completion_tokens": 30, "total_tokens": 50 }
    })
}

#[tokio::test]
async fn test_complete_returns_message_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 512,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": "You write FAQs." },
                { "role": "user", "content": "Page: Home" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("{\"faqs\":[]}"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let text = client.complete(&request()).await.expect("Completion failed");

    assert_eq!(text, "{\"faqs\":[]}");
    assert_eq!(client.model(), "test-model");
}

#[tokio::test]
async fn test_rate_limit_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&mock_server)
        .await;

    let err = create_client(&mock_server)
        .complete(&request())
        .await
        .unwrap_err();

    match &err {
        FaqError::Generation { status, message } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "slow down");
        }
        other => panic!("expected generation error, got {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Transient);
}

#[tokio::test]
async fn test_unauthorized_is_permanent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let err = create_client(&mock_server)
        .complete(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, FaqError::Generation { status: 401, .. }));
    assert_eq!(err.category(), ErrorCategory::Permanent);
}

#[tokio::test]
async fn test_missing_content_is_parse_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&mock_server)
        .await;

    let err = create_client(&mock_server)
        .complete(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, FaqError::ResponseParse { .. }));
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.raw_response().unwrap().contains("chatcmpl-1"));
}

#[tokio::test]
async fn test_garbage_payload_is_parse_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&mock_server)
        .await;

    let err = create_client(&mock_server)
        .complete(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, FaqError::ResponseParse { .. }));
    assert_eq!(err.raw_response(), Some("<html>proxy error</html>"));
}
