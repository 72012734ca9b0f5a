//! FAQ extraction pipeline
//!
//! Turns crawled pages into validated FAQ records with a single generation
//! call: combine page content, prompt the generator (retrying transient
//! failures), parse and validate the response, drop low-confidence records
//! and compute statistics. Failures are reported in the returned
//! [`GenerationReport`] rather than as an `Err`.

use crate::config::GenerationConfig;
use crate::crawler::ScrapedPage;
use crate::generation::client::{CompletionRequest, TextGenerator};
use crate::generation::prompt::{build_user_prompt, combine_content, SYSTEM_PROMPT};
use crate::generation::schema::{parse_response, FaqRecord};
use crate::retry::{with_retry, RetryPolicy};
use crate::{ErrorCategory, FaqError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-tunable generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Records below this confidence are dropped
    pub min_confidence: f64,
    pub max_faqs: usize,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Divisor for the input token estimate
    pub chars_per_token: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            max_faqs: config.max_faqs,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            chars_per_token: config.chars_per_token,
        }
    }
}

/// Aggregate numbers for one generation call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub total_faqs: usize,
    /// Estimated input tokens of the combined content
    pub total_tokens: usize,
    /// Mean confidence of accepted records, 0 when there are none
    pub average_confidence: f64,
    pub processing_time_ms: u64,
    pub model: String,
    pub chunks_processed: usize,
    pub filtered_low_confidence: usize,
}

/// Outcome of [`generate_faqs`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub success: bool,
    pub faqs: Vec<FaqRecord>,
    pub stats: GenerationStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    /// Model output that failed parsing or validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl GenerationReport {
    fn failure(error: FaqError, stats: GenerationStats) -> Self {
        tracing::error!("FAQ generation failed: {}", error);

        Self {
            success: false,
            faqs: Vec::new(),
            stats,
            error: Some(error.to_string()),
            error_category: Some(error.category()),
            raw_response: error.raw_response().map(str::to_string),
        }
    }
}

/// Estimates the token count of `text`, rounding up
pub fn estimate_tokens(text: &str, chars_per_token: usize) -> usize {
    text.chars().count().div_ceil(chars_per_token.max(1))
}

/// Generates validated FAQ records from crawled pages
///
/// All pages are submitted in one request, in the order given. Transient
/// generator failures are retried per `retry`; parse and schema failures
/// are not. An empty page list succeeds without calling the generator.
pub async fn generate_faqs(
    generator: &dyn TextGenerator,
    pages: &[ScrapedPage],
    options: &GenerationOptions,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
) -> GenerationReport {
    let started = Instant::now();
    let combined = combine_content(pages);

    let mut stats = GenerationStats {
        total_tokens: estimate_tokens(&combined, options.chars_per_token),
        model: generator.model().to_string(),
        ..GenerationStats::default()
    };

    if pages.is_empty() {
        tracing::info!("No pages to generate FAQs from");
        return GenerationReport {
            success: true,
            faqs: Vec::new(),
            stats,
            error: None,
            error_category: None,
            raw_response: None,
        };
    }

    tracing::info!(
        "Generating FAQs from {} pages (~{} tokens) with {}",
        pages.len(),
        stats.total_tokens,
        stats.model
    );

    let request = CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: build_user_prompt(&combined, options.max_faqs),
        temperature: options.temperature,
        max_output_tokens: options.max_output_tokens,
    };
    let request = &request;

    let raw = with_retry(retry, "FAQ generation", cancel, move |_| async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FaqError::cancelled("FAQ generation")),
            result = generator.complete(request) => result,
        }
    })
    .await;

    stats.chunks_processed = 1;

    let records = match raw.and_then(|raw| parse_response(&raw)) {
        Ok(records) => records,
        Err(e) => {
            stats.processing_time_ms = started.elapsed().as_millis() as u64;
            return GenerationReport::failure(e, stats);
        }
    };

    let received = records.len();
    let mut faqs: Vec<FaqRecord> = records
        .into_iter()
        .filter(|record| record.confidence >= options.min_confidence)
        .collect();
    stats.filtered_low_confidence = received - faqs.len();

    if faqs.len() > options.max_faqs {
        tracing::debug!(
            "Model returned {} FAQs, keeping the first {}",
            faqs.len(),
            options.max_faqs
        );
        faqs.truncate(options.max_faqs);
    }

    stats.total_faqs = faqs.len();
    stats.average_confidence = if faqs.is_empty() {
        0.0
    } else {
        faqs.iter().map(|f| f.confidence).sum::<f64>() / faqs.len() as f64
    };
    stats.processing_time_ms = started.elapsed().as_millis() as u64;

    tracing::info!(
        "Accepted {} FAQs ({} below confidence {})",
        stats.total_faqs,
        stats.filtered_low_confidence,
        options.min_confidence
    );

    GenerationReport {
        success: true,
        faqs,
        stats,
        error: None,
        error_category: None,
        raw_response: None,
    }
}
