//! chromiumoxide-backed renderer.
//!
//! Every call launches its own browser, drives one tab, and tears the
//! browser down before returning. Nothing is shared between calls.

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use futures_util::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

use super::{RenderError, RenderOptions, RenderedPage, Renderer};

const BODY_POLL_INTERVAL: Duration = Duration::from_millis(250);

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";
const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0)";

/// Headless Chrome/Chromium renderer using chromiumoxide.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    /// Extra command-line flags passed to the browser.
    extra_args: Vec<String>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_args(extra_args: Vec<String>) -> Self {
        Self { extra_args }
    }

    /// Launch a browser and spawn the task that drives its CDP connection.
    async fn launch(&self, opts: &RenderOptions) -> Result<(Browser, JoinHandle<()>), RenderError> {
        let (width, height) = opts.viewport;
        let config = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .args(self.extra_args.iter().map(String::as_str))
            .window_size(width, height)
            .request_timeout(opts.timeout)
            .build()
            .map_err(RenderError::BrowserLaunch)?;

        let (browser, mut handler) =
            Browser::launch(config).await.map_err(|e| RenderError::BrowserLaunch(e.to_string()))?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    async fn drive(&self, browser: &Browser, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let start = Instant::now();

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Session(e.to_string()))?;

        match tokio::time::timeout(opts.timeout, page.goto(url.as_str())).await {
            Err(_) | Ok(Err(CdpError::Timeout)) => return Err(RenderError::Timeout(opts.timeout_ms())),
            Ok(Err(e)) => return Err(RenderError::Navigation(e.to_string())),
            Ok(Ok(_)) => {}
        }

        wait_for_body(&page, opts).await?;
        tokio::time::sleep(opts.settle).await;
        scroll_cycle(&page, opts.scroll_pause).await;

        let html = page
            .content()
            .await
            .map_err(|e| RenderError::ContentRetrieval(e.to_string()))?;

        let title = page.get_title().await.ok().flatten();
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        if let Err(e) = page.close().await {
            tracing::debug!("page close failed: {e}");
        }

        Ok(RenderedPage { html, title, final_url, render_time_ms: start.elapsed().as_millis() as u64 })
    }
}

#[async_trait]
impl Renderer for HeadlessRenderer {
    async fn render(&self, url: &Url, opts: &RenderOptions) -> Result<RenderedPage, RenderError> {
        let (mut browser, handle) = self.launch(opts).await?;
        let result = self.drive(&browser, url, opts).await;
        teardown(&mut browser, handle).await;
        result
    }
}

async fn wait_for_body(page: &Page, opts: &RenderOptions) -> Result<(), RenderError> {
    let poll = async {
        loop {
            if page.find_element("body").await.is_ok() {
                return;
            }
            tokio::time::sleep(BODY_POLL_INTERVAL).await;
        }
    };

    tokio::time::timeout(opts.timeout, poll)
        .await
        .map_err(|_| RenderError::Timeout(opts.timeout_ms()))
}

/// Scroll to the bottom and back so lazy-loaded content materializes.
/// Scroll failures are logged and ignored.
async fn scroll_cycle(page: &Page, pause: Duration) {
    if let Err(e) = page.evaluate(SCROLL_TO_BOTTOM).await {
        tracing::debug!("scroll to bottom failed: {e}");
        return;
    }
    tokio::time::sleep(pause).await;
    if let Err(e) = page.evaluate(SCROLL_TO_TOP).await {
        tracing::debug!("scroll to top failed: {e}");
    }
}

async fn teardown(browser: &mut Browser, handle: JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        tracing::warn!("browser close failed, killing process: {e}");
        if let Some(Err(e)) = browser.kill().await {
            tracing::warn!("browser kill failed: {e}");
        }
    }
    if let Err(e) = browser.wait().await {
        tracing::debug!("browser wait failed: {e}");
    }
    handle.abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Chrome/Chromium installation"]
    async fn test_headless_renderer_launch_and_teardown() {
        let renderer = HeadlessRenderer::new();
        let (mut browser, handle) = renderer.launch(&RenderOptions::default()).await.unwrap();
        teardown(&mut browser, handle).await;
    }

    #[tokio::test]
    #[ignore = "requires network and Chrome/Chromium"]
    async fn test_render_simple_page() {
        let renderer = HeadlessRenderer::new();
        let url = Url::parse("https://example.com").unwrap();
        let opts = RenderOptions { settle: Duration::from_millis(200), ..Default::default() };

        let page = renderer.render(&url, &opts).await.unwrap();
        assert!(page.html.contains("Example Domain"));
        assert_eq!(page.title.as_deref(), Some("Example Domain"));
        assert_eq!(page.final_url.as_str(), "https://example.com/");
    }
}
