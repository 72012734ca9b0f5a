//! Faqsmith: crawl a website and turn its content into a validated FAQ set
//!
//! This crate implements a bounded breadth-first crawler that renders and
//! extracts pages from a single site, and an extraction pipeline that feeds the
//! crawled content to a text-generation backend and validates the structured
//! question/answer records it returns.

pub mod config;
pub mod crawler;
pub mod generation;
pub mod output;
pub mod render;
pub mod retry;
pub mod url;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Retry classification attached to every error
///
/// Only `Transient` failures are retried by [`retry::with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Network, navigation, timeout or rate-limit failures
    Transient,
    /// Missing credentials, invalid configuration, unrecoverable responses
    Permanent,
    /// Model output that does not parse or match the FAQ schema
    Validation,
}

/// Main error type for Faqsmith operations
#[derive(Debug, Error)]
pub enum FaqError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required credential: {name}")]
    MissingCredential { name: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("{url} redirected off-site to {final_url}")]
    OffSiteRedirect { url: String, final_url: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Rendering backend unavailable: {0}")]
    Backend(String),

    #[error("Failed to extract content from {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Generation backend error ({status}): {message}")]
    Generation { status: u16, message: String },

    #[error("Generation request failed: {0}")]
    GenerationRequest(#[source] reqwest::Error),

    #[error("Failed to parse model response: {message}")]
    ResponseParse { message: String, raw: String },

    #[error("Model response failed schema validation: {message}")]
    SchemaViolation { message: String, raw: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{operation} was cancelled")]
    Cancelled { operation: String },
}

impl FaqError {
    /// Returns the retry classification of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            FaqError::Config(_)
            | FaqError::MissingCredential { .. }
            | FaqError::ContentMismatch { .. }
            | FaqError::OffSiteRedirect { .. }
            | FaqError::Extraction { .. }
            | FaqError::UrlError(_)
            | FaqError::UrlParse(_)
            | FaqError::Io(_)
            | FaqError::Serialization(_) => ErrorCategory::Permanent,

            FaqError::HttpStatus { status, .. } | FaqError::Generation { status, .. } => {
                classify_status(*status)
            }

            FaqError::ResponseParse { .. } | FaqError::SchemaViolation { .. } => {
                ErrorCategory::Validation
            }

            FaqError::Http { .. }
            | FaqError::GenerationRequest(_)
            | FaqError::Timeout { .. }
            | FaqError::Navigation { .. }
            | FaqError::Backend(_)
            | FaqError::Cancelled { .. } => ErrorCategory::Transient,
        }
    }

    /// Returns true if this error represents an external cancellation
    ///
    /// Cancellations are transient but must never be retried.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FaqError::Cancelled { .. })
    }

    /// Returns the raw model response attached to validation failures
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            FaqError::ResponseParse { raw, .. } | FaqError::SchemaViolation { raw, .. } => {
                Some(raw)
            }
            _ => None,
        }
    }

    pub(crate) fn cancelled(operation: impl Into<String>) -> Self {
        FaqError::Cancelled {
            operation: operation.into(),
        }
    }
}

/// Maps an HTTP status code onto a retry category
///
/// Request timeouts, rate limits and server errors are worth retrying;
/// every other failing status is not.
pub fn classify_status(status: u16) -> ErrorCategory {
    match status {
        408 | 429 => ErrorCategory::Transient,
        500..=599 => ErrorCategory::Transient,
        _ => ErrorCategory::Permanent,
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Faqsmith operations
pub type Result<T> = std::result::Result<T, FaqError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, CrawlRequest, ScrapedPage};
pub use generation::{FaqRecord, GenerationOptions, GenerationReport};
pub use output::{run_pipeline, PipelineReport, PipelineRequest};
pub use render::RenderProfile;
