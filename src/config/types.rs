use serde::{Deserialize, Serialize};

/// Main configuration structure for Faqsmith
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Default page budget for a crawl session
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum BFS depth from the seed (unbounded when absent)
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Delay between consecutive page renders (milliseconds)
    #[serde(default)]
    pub page_delay_ms: u64,

    /// Only follow links whose path starts with one of these
    #[serde(default)]
    pub path_prefixes: Vec<String>,

    /// Never follow links whose path contains one of these
    #[serde(default)]
    pub exclude_paths: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: None,
            page_delay_ms: 0,
            path_prefixes: Vec::new(),
            exclude_paths: Vec::new(),
        }
    }
}

/// Retry/backoff configuration shared by page renders and generation calls
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound of the random jitter added to each backoff delay
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the user agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Engine used for the trusted rendering profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalEngine {
    /// Locally launched headless Chromium
    Chromium,
    /// Plain HTTP fetch, no script execution
    Http,
}

/// Rendering backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RendererConfig {
    #[serde(default = "default_local_engine")]
    pub local_engine: LocalEngine,

    /// Upper bound for a single page navigation (seconds)
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// CDP websocket endpoint of the remote proxy-broker
    #[serde(default)]
    pub remote_endpoint: Option<String>,

    /// Query parameter the broker expects the credential in
    #[serde(default = "default_credential_param")]
    pub credential_param: String,

    /// Access credential for the remote broker, supplied out of band
    #[serde(skip)]
    pub proxy_credential: Option<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            local_engine: default_local_engine(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            remote_endpoint: None,
            credential_param: default_credential_param(),
            proxy_credential: None,
        }
    }
}

/// Text-generation backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Records below this confidence are dropped
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Approximate characters per token used for token estimates
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// Upper bound on FAQs requested from the model
    #[serde(default = "default_max_faqs")]
    pub max_faqs: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// API key for the generation backend, supplied out of band
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            min_confidence: default_min_confidence(),
            chars_per_token: default_chars_per_token(),
            max_faqs: default_max_faqs(),
            request_timeout_secs: default_request_timeout_secs(),
            api_key: None,
        }
    }
}

fn default_max_pages() -> usize {
    20
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_jitter_ms() -> u64 {
    1000
}

fn default_local_engine() -> LocalEngine {
    LocalEngine::Chromium
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_credential_param() -> String {
    "token".to_string()
}

fn default_generation_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    4000
}

fn default_min_confidence() -> f64 {
    0.7
}

fn default_chars_per_token() -> usize {
    4
}

fn default_max_faqs() -> usize {
    20
}

fn default_request_timeout_secs() -> u64 {
    120
}
