//! Persistence shapes
//!
//! Faqsmith does not store anything itself. A pipeline run produces one
//! [`ScrapeRecord`] and, when generation ran, one [`FaqRunRecord`]; callers
//! save them wherever they like.
//!
//! # Scrape Status Lifecycle
//!
//! ```text
//! pending -> scraping -> scraping_completed -> faq_generated
//!               |
//!               +-> error
//! ```
//!
//! A scrape stays `scraping_completed` when generation fails; the failure is
//! recorded on the FAQ run instead.

use crate::crawler::{CrawlReport, FailedPage, ScrapedPage};
use crate::generation::{FaqRecord, GenerationOptions, GenerationReport};
use crate::{ErrorCategory, FaqError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Pending,
    Scraping,
    ScrapingCompleted,
    FaqGenerated,
    Error,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scraping => "scraping",
            Self::ScrapingCompleted => "scraping_completed",
            Self::FaqGenerated => "faq_generated",
            Self::Error => "error",
        }
    }
}

/// Status of an FAQ generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqRunStatus {
    Pending,
    Completed,
    Error,
}

impl FaqRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeMetadata {
    pub pages_scraped: usize,
    pub max_pages: usize,
    pub total_content_chars: usize,
    pub site_owner: bool,

    /// Rendering backend that served the crawl
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,

    /// SHA-256 of the configuration file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    /// Frontier entries left when the budget ran out
    pub pending_urls: usize,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_pages: Vec<FailedPage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
}

/// One crawl of one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    pub id: Uuid,
    pub url: String,
    pub status: ScrapeStatus,
    pub pages: Vec<ScrapedPage>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: ScrapeMetadata,
}

impl ScrapeRecord {
    /// Creates a pending scrape
    pub fn new(url: impl Into<String>, max_pages: usize, site_owner: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            status: ScrapeStatus::Pending,
            pages: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
            metadata: ScrapeMetadata {
                max_pages,
                site_owner,
                ..ScrapeMetadata::default()
            },
        }
    }

    /// Moves the record to `scraping_completed` with the crawl's pages
    pub fn complete(&mut self, report: CrawlReport) {
        self.metadata.pages_scraped = report.pages.len();
        self.metadata.total_content_chars = report.total_content_chars();
        self.metadata.renderer = Some(report.backend);
        self.metadata.pending_urls = report.pending;
        self.metadata.failed_pages = report.failed;
        self.pages = report.pages;
        self.status = ScrapeStatus::ScrapingCompleted;
        self.completed_at = Some(Utc::now());
    }

    /// Moves the record to `error`
    pub fn fail(&mut self, error: &FaqError) {
        self.status = ScrapeStatus::Error;
        self.metadata.error = Some(error.to_string());
        self.metadata.error_category = Some(error.category());
        self.completed_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRunMetadata {
    pub chunks_processed: usize,
    pub total_tokens: usize,
    pub model: String,
    pub processing_time_ms: u64,
    pub average_confidence: f64,
    pub filtered_low_confidence: usize,
    pub options: GenerationOptions,
}

/// FAQ generation for one scrape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRunRecord {
    pub id: Uuid,
    pub scrape_id: Uuid,
    pub faqs: Vec<FaqRecord>,
    pub status: FaqRunStatus,
    pub created_at: DateTime<Utc>,
    pub metadata: FaqRunMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,

    /// Model output kept for diagnosing validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl FaqRunRecord {
    /// Records the outcome of a generation call
    pub fn from_report(scrape_id: Uuid, report: GenerationReport, options: &GenerationOptions) -> Self {
        let stats = report.stats;

        Self {
            id: Uuid::new_v4(),
            scrape_id,
            faqs: report.faqs,
            status: if report.success {
                FaqRunStatus::Completed
            } else {
                FaqRunStatus::Error
            },
            created_at: Utc::now(),
            metadata: FaqRunMetadata {
                chunks_processed: stats.chunks_processed,
                total_tokens: stats.total_tokens,
                model: stats.model,
                processing_time_ms: stats.processing_time_ms,
                average_confidence: stats.average_confidence,
                filtered_low_confidence: stats.filtered_low_confidence,
                options: options.clone(),
            },
            error: report.error,
            error_category: report.error_category,
            raw_response: report.raw_response,
        }
    }
}
