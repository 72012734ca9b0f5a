//! End-to-end pipeline: crawl a site, then generate its FAQ

use crate::config::{validate_page_budget, Config};
use crate::crawler::{crawl_site, CrawlProgress, CrawlRequest};
use crate::generation::{generate_faqs, GenerationOptions, TextGenerator};
use crate::output::records::{FaqRunRecord, FaqRunStatus, ScrapeRecord, ScrapeStatus};
use crate::render::{BackendConnector, RenderProfile};
use crate::retry::RetryPolicy;
use crate::FaqError;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Inputs for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub url: String,

    /// Page budget; the `[crawler]` default when absent
    pub max_pages: Option<usize>,

    /// Whether the caller owns the site, which selects the render profile
    pub site_owner: bool,

    pub options: GenerationOptions,

    /// Hash of the configuration file, recorded in scrape metadata
    pub config_hash: Option<String>,
}

impl PipelineRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: None,
            site_owner: false,
            options: GenerationOptions::default(),
            config_hash: None,
        }
    }
}

/// Records produced by a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub scrape: ScrapeRecord,

    /// Absent when the crawl failed or generation was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faq: Option<FaqRunRecord>,
}

impl PipelineReport {
    /// True unless the crawl or the generation step failed
    pub fn success(&self) -> bool {
        self.scrape.status != ScrapeStatus::Error
            && self
                .faq
                .as_ref()
                .map_or(true, |faq| faq.status == FaqRunStatus::Completed)
    }
}

/// Crawls `request.url` and, given a generator, turns the pages into FAQs
///
/// Never returns an error: failures are recorded on the returned records.
/// A crawl that finds no pages still succeeds. Passing `None` for
/// `generator` stops after the crawl.
pub async fn run_pipeline<F>(
    config: &Config,
    connector: &dyn BackendConnector,
    generator: Option<&dyn TextGenerator>,
    request: &PipelineRequest,
    cancel: &CancellationToken,
    on_progress: F,
) -> PipelineReport
where
    F: FnMut(CrawlProgress),
{
    let max_pages = request.max_pages.unwrap_or(config.crawler.max_pages);

    let mut scrape = ScrapeRecord::new(&request.url, max_pages, request.site_owner);
    scrape.metadata.config_hash = request.config_hash.clone();

    tracing::info!("Starting scrape {} of {}", scrape.id, request.url);

    if let Err(e) = validate_page_budget(max_pages) {
        let error = FaqError::from(e);
        tracing::error!("Scrape {} rejected: {}", scrape.id, error);
        scrape.fail(&error);
        return PipelineReport { scrape, faq: None };
    }

    scrape.status = ScrapeStatus::Scraping;

    let retry = RetryPolicy::from(&config.retry);
    let profile = RenderProfile::for_site_owner(request.site_owner);
    let crawl_request = CrawlRequest::from_config(&request.url, Some(max_pages), &config.crawler);

    match crawl_site(connector, profile, &crawl_request, &retry, cancel, on_progress).await {
        Ok(report) => scrape.complete(report),
        Err(e) => {
            tracing::error!("Scrape {} failed: {}", scrape.id, e);
            scrape.fail(&e);
            return PipelineReport { scrape, faq: None };
        }
    }

    tracing::info!(
        "Scrape {} completed with {} pages",
        scrape.id,
        scrape.pages.len()
    );

    let Some(generator) = generator else {
        return PipelineReport { scrape, faq: None };
    };

    let generation = generate_faqs(generator, &scrape.pages, &request.options, &retry, cancel).await;
    let faq = FaqRunRecord::from_report(scrape.id, generation, &request.options);

    if faq.status == FaqRunStatus::Completed {
        scrape.status = ScrapeStatus::FaqGenerated;
        tracing::info!("Generated {} FAQs for scrape {}", faq.faqs.len(), scrape.id);
    } else {
        tracing::warn!(
            "FAQ generation for scrape {} failed; scrape kept as {}",
            scrape.id,
            scrape.status.as_str()
        );
    }

    PipelineReport {
        scrape,
        faq: Some(faq),
    }
}
