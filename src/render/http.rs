//! Static HTTP renderer
//!
//! Fetches pages with a plain GET and returns the served HTML unchanged. No
//! scripts run, so this backend suits server-rendered sites. Errors are
//! classified the same way as browser navigation failures:
//!
//! | Condition | Error | Retried |
//! |-----------|-------|---------|
//! | Timeout | `Timeout` | yes |
//! | Connection failure | `Http` | yes |
//! | HTTP 408 / 429 / 5xx | `HttpStatus` | yes |
//! | Other HTTP 4xx | `HttpStatus` | no |
//! | Non-HTML Content-Type | `ContentMismatch` | no |

use crate::config::{RendererConfig, UserAgentConfig};
use crate::render::{RenderSession, RenderedPage};
use crate::FaqError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the crawler's identity and timeouts
///
/// # Example
///
/// ```no_run
/// use faqsmith::config::UserAgentConfig;
/// use faqsmith::render::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "faqsmith".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Render session backed by a reusable HTTP client
pub struct HttpSession {
    client: Client,
    timeout_secs: u64,
}

impl HttpSession {
    pub fn new(user_agent: &UserAgentConfig, renderer: &RendererConfig) -> Result<Self, FaqError> {
        let client = build_http_client(user_agent, renderer.navigation_timeout_secs)
            .map_err(|e| FaqError::Backend(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs: renderer.navigation_timeout_secs,
        })
    }

    fn classify_send_error(&self, url: &Url, error: reqwest::Error) -> FaqError {
        if error.is_timeout() {
            FaqError::Timeout {
                operation: format!("GET {}", url),
                seconds: self.timeout_secs,
            }
        } else {
            FaqError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn open(&self, url: &Url) -> Result<RenderedPage, FaqError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify_send_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FaqError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml+xml")
        {
            return Err(FaqError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().clone();
        let html = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(url, e))?;

        Ok(RenderedPage {
            requested_url: url.clone(),
            final_url,
            html,
        })
    }

    async fn close(self: Box<Self>) -> Result<(), FaqError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
