//! Rendering backends
//!
//! The crawler never talks to a browser directly. It acquires a
//! [`RenderSession`] from a [`BackendConnector`] once per crawl, asks it to
//! open pages, and closes it on every exit path. Extraction runs on the
//! rendered DOM snapshot returned by [`RenderSession::open`], so the same
//! extractor works for every backend.
//!
//! Two profiles exist:
//! - [`RenderProfile::Trusted`]: the site belongs to the caller; pages are
//!   rendered by a locally controlled engine (headless Chromium or plain HTTP).
//! - [`RenderProfile::Proxied`]: third-party sites are rendered through a
//!   remote proxy-broker, which requires an access credential.

mod chromium;
mod http;

pub use chromium::ChromiumSession;
pub use http::{build_http_client, HttpSession};

use crate::config::{LocalEngine, RendererConfig, UserAgentConfig};
use crate::FaqError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Which rendering backend a crawl is routed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderProfile {
    Trusted,
    Proxied,
}

impl RenderProfile {
    /// Owners crawl their own site locally; everything else goes via the broker
    pub fn for_site_owner(site_owner: bool) -> Self {
        if site_owner {
            RenderProfile::Trusted
        } else {
            RenderProfile::Proxied
        }
    }
}

/// DOM snapshot of a page after navigation settled
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The URL that was asked for
    pub requested_url: Url,
    /// Where the browser ended up after redirects
    pub final_url: Url,
    /// Serialized document
    pub html: String,
}

/// A live connection to a rendering backend
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Navigates to `url`, waits for the page to load, and snapshots the DOM
    async fn open(&self, url: &Url) -> Result<RenderedPage, FaqError>;

    /// Releases the backend
    async fn close(self: Box<Self>) -> Result<(), FaqError>;

    /// Short backend name for logs and metadata
    fn backend_name(&self) -> &'static str;
}

/// Acquires render sessions for a profile
#[async_trait]
pub trait BackendConnector: Send + Sync {
    async fn connect(&self, profile: RenderProfile) -> Result<Box<dyn RenderSession>, FaqError>;
}

/// Connector that builds sessions from [`RendererConfig`]
#[derive(Debug, Clone)]
pub struct DefaultConnector {
    renderer: RendererConfig,
    user_agent: UserAgentConfig,
}

impl DefaultConnector {
    pub fn new(renderer: RendererConfig, user_agent: UserAgentConfig) -> Self {
        Self {
            renderer,
            user_agent,
        }
    }

    /// Builds the websocket URL for the proxy-broker, credential included
    ///
    /// Fails with a permanent error when either the endpoint or the
    /// credential is missing.
    pub fn remote_endpoint(&self) -> Result<Url, FaqError> {
        let endpoint = self.renderer.remote_endpoint.as_deref().ok_or_else(|| {
            FaqError::Config(crate::ConfigError::Validation(
                "renderer.remote-endpoint is required for third-party sites".to_string(),
            ))
        })?;

        let credential = self
            .renderer
            .proxy_credential
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FaqError::MissingCredential {
                name: "proxy-broker credential".to_string(),
            })?;

        let mut url = Url::parse(endpoint)?;
        url.query_pairs_mut()
            .append_pair(&self.renderer.credential_param, credential);
        Ok(url)
    }
}

#[async_trait]
impl BackendConnector for DefaultConnector {
    async fn connect(&self, profile: RenderProfile) -> Result<Box<dyn RenderSession>, FaqError> {
        match profile {
            RenderProfile::Trusted => match self.renderer.local_engine {
                LocalEngine::Http => {
                    tracing::info!("Using HTTP renderer for owned site");
                    let session = HttpSession::new(&self.user_agent, &self.renderer)?;
                    Ok(Box::new(session))
                }
                LocalEngine::Chromium => {
                    tracing::info!("Launching local headless Chromium");
                    let session = ChromiumSession::launch(&self.renderer).await?;
                    Ok(Box::new(session))
                }
            },
            RenderProfile::Proxied => {
                let endpoint = self.remote_endpoint()?;
                tracing::info!(
                    "Connecting to remote rendering broker at {}",
                    endpoint.host_str().unwrap_or("<unknown>")
                );
                let session = ChromiumSession::connect(&endpoint, &self.renderer).await?;
                Ok(Box::new(session))
            }
        }
    }
}
