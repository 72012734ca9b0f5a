//! Text-generation backends
//!
//! The pipeline only needs "prompt in, text out". [`TextGenerator`] is that
//! seam; [`OpenAiClient`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint.

use crate::config::GenerationConfig;
use crate::FaqError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single prompt submitted to a text generator
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Black-box text completion capability
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated text for `request`
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FaqError>;

    /// Model identifier recorded in statistics
    fn model(&self) -> &str;
}

/// Client for OpenAI-compatible chat completion APIs
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Builds a client from the `[generation]` section
    ///
    /// Fails with [`FaqError::MissingCredential`] when no API key was
    /// supplied.
    pub fn new(config: &GenerationConfig) -> Result<Self, FaqError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FaqError::MissingCredential {
                name: "generation API key".to_string(),
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| FaqError::Backend(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn to_api_request(&self, request: &CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            response_format: ResponseFormat {
                kind: "json_object".to_string(),
            },
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FaqError> {
        let api_request = self.to_api_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FaqError::Timeout {
                        operation: "generation request".to_string(),
                        seconds: self.timeout_secs,
                    }
                } else {
                    FaqError::GenerationRequest(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FaqError::Generation {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(FaqError::GenerationRequest)?;

        let api_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| FaqError::ResponseParse {
                message: format!("unexpected completion payload: {}", e),
                raw: body.clone(),
            })?;

        if let Some(usage) = &api_response.usage {
            tracing::debug!(
                "Generation used {} prompt and {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| FaqError::ResponseParse {
                message: "no content in completion".to_string(),
                raw: body,
            })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
