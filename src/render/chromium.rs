//! Headless Chromium renderer
//!
//! Used in two ways: launched locally for owned sites, or attached over a
//! CDP websocket to a remote proxy-broker for third-party sites. Each
//! [`RenderSession::open`] call creates a fresh tab, navigates, snapshots the
//! DOM and closes the tab again.

use crate::config::RendererConfig;
use crate::render::{RenderSession, RenderedPage};
use crate::FaqError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Handler, Page};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// Render session driving a Chromium instance through CDP
pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
    /// True when this process owns the browser and must reap it
    launched: bool,
}

impl ChromiumSession {
    /// Launches a local headless Chromium
    pub async fn launch(renderer: &RendererConfig) -> Result<Self, FaqError> {
        let navigation_timeout = Duration::from_secs(renderer.navigation_timeout_secs);

        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(navigation_timeout)
            .build()
            .map_err(|e| FaqError::Backend(format!("invalid browser config: {}", e)))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| FaqError::Backend(format!("failed to launch Chromium: {}", e)))?;

        Ok(Self {
            browser,
            handler_task: spawn_handler(handler),
            navigation_timeout,
            launched: true,
        })
    }

    /// Attaches to a remote browser exposed over a CDP websocket
    pub async fn connect(endpoint: &Url, renderer: &RendererConfig) -> Result<Self, FaqError> {
        let (browser, handler) = Browser::connect(endpoint.as_str())
            .await
            .map_err(|e| {
                FaqError::Backend(format!(
                    "failed to connect to {}: {}",
                    endpoint.host_str().unwrap_or("remote browser"),
                    e
                ))
            })?;

        Ok(Self {
            browser,
            handler_task: spawn_handler(handler),
            navigation_timeout: Duration::from_secs(renderer.navigation_timeout_secs),
            launched: false,
        })
    }

    async fn navigate(&self, page: &Page, url: &Url) -> Result<RenderedPage, FaqError> {
        let load = async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            let html = page.content().await?;
            let final_url = page.url().await?;
            Ok::<_, CdpError>((html, final_url))
        };

        match tokio::time::timeout(self.navigation_timeout, load).await {
            Err(_) => Err(FaqError::Timeout {
                operation: format!("navigation to {}", url),
                seconds: self.navigation_timeout.as_secs(),
            }),
            Ok(Err(e)) => Err(FaqError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Ok(Ok((html, final_url))) => {
                let final_url = final_url
                    .and_then(|u| Url::parse(&u).ok())
                    .unwrap_or_else(|| url.clone());

                Ok(RenderedPage {
                    requested_url: url.clone(),
                    final_url,
                    html,
                })
            }
        }
    }
}

/// Drives the CDP event loop until the browser connection ends
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!("Browser handler error: {:?}", e);
            }
        }
        tracing::debug!("Browser event handler finished");
    })
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn open(&self, url: &Url) -> Result<RenderedPage, FaqError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FaqError::Backend(format!("failed to open tab: {}", e)))?;

        let result = self.navigate(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }

        result
    }

    async fn close(self: Box<Self>) -> Result<(), FaqError> {
        let ChromiumSession {
            mut browser,
            handler_task,
            launched,
            ..
        } = *self;

        let result = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| FaqError::Backend(format!("failed to close browser: {}", e)));

        if launched {
            if let Err(e) = browser.wait().await {
                tracing::warn!("Failed to wait for browser exit: {}", e);
            }
        }

        handler_task.abort();
        result
    }

    fn backend_name(&self) -> &'static str {
        if self.launched {
            "chromium"
        } else {
            "chromium-remote"
        }
    }
}
