//! Dynamic extraction through a headless browser.
//!
//! The [`Renderer`] trait produces fully rendered markup for a URL; the
//! [`DynamicExtractor`] runs it and harvests text with
//! [`extract_rendered`]. The chromiumoxide-backed renderer lives behind the
//! `render` feature.

#[cfg(feature = "render")]
mod headless;

#[cfg(feature = "render")]
pub use headless::HeadlessRenderer;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use pagechat_core::{AppConfig, Error, Method};

use crate::coordinator::{ContentSource, LoadOptions};
use crate::extract::{ExtractConfig, PageText, extract_rendered};

/// Errors that can occur during page rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to open a tab or talk to the browser.
    #[error("browser session failed: {0}")]
    Session(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to get page content.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// Navigation or body wait exceeded the page-load bound.
    #[error("page load timed out after {0}ms")]
    Timeout(u64),
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Timeout(_) => Error::Timeout(err.to_string()),
            other => Error::Browser(other.to_string()),
        }
    }
}

/// Options for rendering a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Bound on navigation and on waiting for `<body>` (default: 30s).
    pub timeout: Duration,

    /// Fixed wait after the body appears (default: 2s).
    pub settle: Duration,

    /// Pause between scrolling to the bottom and back to the top.
    pub scroll_pause: Duration,

    /// Viewport dimensions (default: 1280x720).
    pub viewport: (u32, u32),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(30_000),
            settle: Duration::from_millis(2_000),
            scroll_pause: Duration::from_millis(500),
            viewport: (1280, 720),
        }
    }
}

impl From<&AppConfig> for RenderOptions {
    fn from(config: &AppConfig) -> Self {
        Self { timeout: config.page_load_timeout(), settle: config.settle_delay(), ..Default::default() }
    }
}

impl RenderOptions {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Result of rendering a page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Rendered HTML content.
    pub html: String,

    /// Document title reported by the browser.
    pub title: Option<String>,

    /// Final URL after redirects.
    pub final_url: Url,

    /// Time taken to render in milliseconds.
    pub render_time_ms: u64,
}

/// Renderer trait for headless browser page rendering.
///
/// Implementations own the whole browser session for one call and must
/// release it before returning, on success and on every error.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a URL to HTML via headless browser.
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError>;
}

/// Content source that renders the page before harvesting text.
pub struct DynamicExtractor {
    renderer: Arc<dyn Renderer>,
    options: RenderOptions,
    config: ExtractConfig,
}

impl DynamicExtractor {
    pub fn new(renderer: Arc<dyn Renderer>, options: RenderOptions, config: ExtractConfig) -> Self {
        Self { renderer, options, config }
    }

    pub fn from_config(renderer: Arc<dyn Renderer>, config: &AppConfig) -> Self {
        Self::new(renderer, RenderOptions::from(config), ExtractConfig::from(config))
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

#[async_trait]
impl ContentSource for DynamicExtractor {
    fn method(&self) -> Method {
        Method::Dynamic
    }

    async fn extract(&self, url: &Url, opts: &LoadOptions) -> Result<PageText, Error> {
        let mut render_opts = self.options.clone();
        if let Some(timeout) = opts.page_load_timeout {
            render_opts.timeout = timeout;
        }

        let rendered = self.renderer.render(url, &render_opts).await?;
        tracing::debug!(
            url = %url,
            final_url = %rendered.final_url,
            render_ms = rendered.render_time_ms,
            bytes = rendered.html.len(),
            "page rendered"
        );

        extract_rendered(&rendered.html, rendered.title.as_deref(), &self.config)
    }
}
