//! Crawler module for bounded single-site crawls
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier and visited set
//! - DOM extraction of title, main text, headings and links
//! - The crawl loop that drives a render session page by page

mod coordinator;
mod parser;
mod scheduler;

pub use coordinator::{crawl_site, Crawler};
pub use parser::{extract_page, ExtractedPage};
pub use scheduler::{Frontier, FrontierEntry};

use crate::config::CrawlerConfig;
use crate::url::ScopeRules;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One successfully crawled page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPage {
    /// Normalized URL the page was requested under; unique within a crawl
    pub url: String,
    pub title: String,
    /// Main-content text
    pub content: String,
    pub headings: Vec<String>,
    /// In-scope links discovered on the page
    pub links: Vec<String>,
}

/// Parameters for a single crawl session
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub seed_url: String,

    /// Stop after this many successful pages
    pub max_pages: usize,

    pub scope: ScopeRules,

    /// Pause between consecutive page renders
    pub page_delay: Duration,
}

impl CrawlRequest {
    pub fn new(seed_url: impl Into<String>, max_pages: usize) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_pages,
            scope: ScopeRules::default(),
            page_delay: Duration::ZERO,
        }
    }

    /// Builds a request from the `[crawler]` section, optionally overriding
    /// its page budget
    pub fn from_config(
        seed_url: impl Into<String>,
        max_pages: Option<usize>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_pages: max_pages.unwrap_or(config.max_pages),
            scope: ScopeRules {
                path_prefixes: config.path_prefixes.clone(),
                exclude_paths: config.exclude_paths.clone(),
                max_depth: config.max_depth,
            },
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }
}

/// A page that was dequeued but could not be crawled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
}

/// Outcome of a crawl session
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages in dequeue order
    pub pages: Vec<ScrapedPage>,

    /// Entries left in the frontier when the crawl stopped
    pub pending: usize,

    /// URLs dequeued, successful or not
    pub visited: usize,

    pub failed: Vec<FailedPage>,

    /// Name of the rendering backend that served the crawl
    pub backend: String,
}

impl CrawlReport {
    /// Total characters of extracted content
    pub fn total_content_chars(&self) -> usize {
        self.pages.iter().map(|p| p.content.chars().count()).sum()
    }
}

/// Emitted after each successful page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlProgress {
    pub pages_scraped: usize,
    pub max_pages: usize,
    pub url: String,
}
