//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier, the render
//! session and the extractor together:
//! - Dequeue the next unvisited URL
//! - Render it through the session, retrying transient failures
//! - Extract its fields and enqueue in-scope links
//! - Report progress and stop once the page budget is spent
//!
//! Pages are processed strictly one after another. A page that fails to
//! render or extract is logged and skipped; only failing to acquire the
//! render session aborts a crawl. A page whose redirects end on another host
//! counts as failed, so no foreign content is ever recorded.

use crate::crawler::parser::extract_page;
use crate::crawler::scheduler::{Frontier, FrontierEntry};
use crate::crawler::{CrawlProgress, CrawlReport, CrawlRequest, FailedPage, ScrapedPage};
use crate::render::{BackendConnector, RenderProfile, RenderSession};
use crate::retry::{with_retry, RetryPolicy};
use crate::url::{normalize_url, LinkScope};
use crate::FaqError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drives one crawl session over an already acquired render session
pub struct Crawler<'a> {
    session: &'a dyn RenderSession,
    scope: LinkScope,
    frontier: Frontier,
    retry: RetryPolicy,
    max_pages: usize,
    page_delay: Duration,
}

impl<'a> Crawler<'a> {
    /// Creates a crawler whose frontier holds only the normalized seed
    pub fn new(
        session: &'a dyn RenderSession,
        request: &CrawlRequest,
        retry: RetryPolicy,
    ) -> Result<Self, FaqError> {
        let seed = normalize_url(&request.seed_url)?;

        Ok(Self {
            session,
            scope: LinkScope::new(seed.clone(), request.scope.clone()),
            frontier: Frontier::new(seed),
            retry,
            max_pages: request.max_pages,
            page_delay: request.page_delay,
        })
    }

    /// Runs the crawl loop until the budget is spent or the frontier drains
    ///
    /// `on_progress` is called once after every successful page. Cancelling
    /// `cancel` aborts the in-flight render and returns
    /// [`FaqError::Cancelled`].
    pub async fn run<F>(
        mut self,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<CrawlReport, FaqError>
    where
        F: FnMut(CrawlProgress),
    {
        tracing::info!(
            "Starting crawl with a budget of {} pages",
            self.max_pages
        );

        let mut pages: Vec<ScrapedPage> = Vec::new();
        let mut failed = Vec::new();
        let mut attempted = 0usize;

        while pages.len() < self.max_pages {
            if cancel.is_cancelled() {
                return Err(FaqError::cancelled("crawl"));
            }

            let entry = match self.frontier.pop() {
                Some(entry) => entry,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            if attempted > 0 && !self.page_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(FaqError::cancelled("crawl")),
                    _ = tokio::time::sleep(self.page_delay) => {}
                }
            }
            attempted += 1;

            tracing::debug!("Processing {} (depth {})", entry.url, entry.depth);

            match self.process(&entry, cancel).await {
                Ok(page) => {
                    pages.push(page);
                    tracing::info!(
                        "Scraped {} ({}/{})",
                        entry.url,
                        pages.len(),
                        self.max_pages
                    );
                    on_progress(CrawlProgress {
                        pages_scraped: pages.len(),
                        max_pages: self.max_pages,
                        url: entry.url.to_string(),
                    });
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", entry.url, e);
                    failed.push(FailedPage {
                        url: entry.url.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Crawl finished: {} pages scraped, {} failed, {} left in frontier",
            pages.len(),
            failed.len(),
            self.frontier.len()
        );

        Ok(CrawlReport {
            pages,
            pending: self.frontier.len(),
            visited: self.frontier.visited_count(),
            failed,
            backend: self.session.backend_name().to_string(),
        })
    }

    /// Renders and extracts one page, enqueueing its in-scope links
    async fn process(
        &mut self,
        entry: &FrontierEntry,
        cancel: &CancellationToken,
    ) -> Result<ScrapedPage, FaqError> {
        let session = self.session;
        let url = &entry.url;

        let rendered = with_retry(&self.retry, &format!("Render {}", url), cancel, move |_| async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(FaqError::cancelled(format!("render of {}", url))),
                result = session.open(url) => result,
            }
        })
        .await?;

        if !self.scope.is_same_site(&rendered.final_url) {
            return Err(FaqError::OffSiteRedirect {
                url: url.to_string(),
                final_url: rendered.final_url.to_string(),
            });
        }

        let extracted = extract_page(&rendered.html, &rendered.final_url)?;

        let child_depth = entry.depth + 1;
        let mut links: Vec<String> = Vec::new();
        let mut enqueued = 0;

        for href in &extracted.links {
            let Some(link) = self.scope.admit(&rendered.final_url, href) else {
                continue;
            };

            if links.iter().any(|l| l == link.as_str()) {
                continue;
            }
            links.push(link.to_string());

            if self.scope.allows_depth(child_depth) && self.frontier.push(link, child_depth) {
                enqueued += 1;
            }
        }

        tracing::debug!(
            "{}: {} links on page, {} in scope, {} newly enqueued",
            url,
            extracted.links.len(),
            links.len(),
            enqueued
        );

        Ok(ScrapedPage {
            url: url.to_string(),
            title: extracted.title,
            content: extracted.content,
            headings: extracted.headings,
            links,
        })
    }
}

/// Acquires a render session for `profile`, crawls, and releases the session
///
/// The session is closed on every exit path. Failing to acquire it is the
/// only fatal error besides cancellation; per-page failures end up in
/// [`CrawlReport::failed`].
///
/// # Example
///
/// ```no_run
/// use faqsmith::config::{RendererConfig, UserAgentConfig};
/// use faqsmith::crawler::crawl_site;
/// use faqsmith::render::DefaultConnector;
/// use faqsmith::retry::RetryPolicy;
/// use faqsmith::{CrawlRequest, RenderProfile};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(user_agent: UserAgentConfig) -> Result<(), faqsmith::FaqError> {
/// let connector = DefaultConnector::new(RendererConfig::default(), user_agent);
/// let request = CrawlRequest::new("https://example.com", 10);
/// let report = crawl_site(
///     &connector,
///     RenderProfile::Trusted,
///     &request,
///     &RetryPolicy::default(),
///     &CancellationToken::new(),
///     |progress| println!("{}/{}", progress.pages_scraped, progress.max_pages),
/// )
/// .await?;
/// println!("{} pages", report.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl_site<F>(
    connector: &dyn BackendConnector,
    profile: RenderProfile,
    request: &CrawlRequest,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
    on_progress: F,
) -> Result<CrawlReport, FaqError>
where
    F: FnMut(CrawlProgress),
{
    // Reject a bad seed before paying for a browser
    normalize_url(&request.seed_url)?;

    let session = with_retry(retry, "Connect rendering backend", cancel, move |_| async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FaqError::cancelled("backend connection")),
            result = connector.connect(profile) => result,
        }
    })
    .await?;

    let backend = session.backend_name();
    tracing::info!("Rendering backend '{}' ready", backend);

    let result = match Crawler::new(session.as_ref(), request, *retry) {
        Ok(crawler) => crawler.run(cancel, on_progress).await,
        Err(e) => Err(e),
    };

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close {} session: {}", backend, e);
    }

    result
}
