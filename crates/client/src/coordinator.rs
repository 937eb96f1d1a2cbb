//! Extraction coordinator.
//!
//! Walks a small state machine per call:
//!
//! ```text
//! NotStarted -> TryDynamic -> Succeeded (DYNAMIC)
//!     |              |
//!     |              v
//!     +--------> TryStatic -> Succeeded (STATIC) | Failed
//! ```
//!
//! The dynamic step is skipped when no dynamic source is configured or the
//! caller opts out. Strategies run strictly one after the other. Each call
//! owns everything it touches; an [`Extractor`] can be shared across tasks.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use pagechat_core::{AppConfig, Error, ExtractedPage, ExtractionAttempt, Method, PageOutcome};

use crate::extract::{ExtractConfig, PageText, extract_static};
use crate::fetch::{FetchClient, FetchConfig, HtmlFetcher, normalize};

/// Appended to the terminal error when only static extraction could run.
pub const DYNAMIC_UNAVAILABLE_NOTE: &str =
    "dynamic rendering is unavailable in this environment; only static extraction was attempted";

/// Per-call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Try dynamic rendering first when it is available (default: true).
    pub render: bool,

    /// Override for the page-load bound of dynamic rendering.
    pub page_load_timeout: Option<Duration>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { render: true, page_load_timeout: None }
    }
}

impl LoadOptions {
    /// Build options from caller-facing parameters.
    ///
    /// `render: None` tries dynamic rendering when available; `Some(true)`
    /// requires it and fails with `RenderDisabled` when it is unavailable;
    /// `Some(false)` goes straight to static extraction.
    pub fn from_request(render: Option<bool>, timeout_ms: Option<u64>, dynamic_available: bool) -> Result<Self, Error> {
        if render == Some(true) && !dynamic_available {
            return Err(Error::RenderDisabled);
        }

        let page_load_timeout = match timeout_ms {
            Some(ms) if !(1_000..=300_000).contains(&ms) => {
                return Err(Error::InvalidInput(format!("timeout_ms must be between 1000 and 300000, got {ms}")));
            }
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        };

        Ok(Self { render: render.unwrap_or(true), page_load_timeout })
    }
}

/// One extraction strategy.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Method reported when this source succeeds.
    fn method(&self) -> Method;

    /// Extract title and composed text for an already-normalized URL.
    async fn extract(&self, url: &Url, opts: &LoadOptions) -> Result<PageText, Error>;
}

/// Content source that fetches raw HTML and applies the static heuristics.
pub struct StaticExtractor {
    fetcher: Arc<dyn HtmlFetcher>,
    config: ExtractConfig,
}

impl StaticExtractor {
    pub fn new(fetcher: Arc<dyn HtmlFetcher>, config: ExtractConfig) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl ContentSource for StaticExtractor {
    fn method(&self) -> Method {
        Method::Static
    }

    async fn extract(&self, url: &Url, _opts: &LoadOptions) -> Result<PageText, Error> {
        let response = self.fetcher.fetch(url).await?;
        tracing::debug!(
            url = %url,
            final_url = %response.final_url,
            status = response.status.as_u16(),
            fetch_ms = response.fetch_ms,
            "static fetch complete"
        );
        extract_static(&response.html(), &self.config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    NotStarted,
    TryDynamic,
    TryStatic,
    Succeeded,
    Failed,
}

/// Runs dynamic extraction when available, with static extraction as the
/// always-available fallback.
#[derive(Clone)]
pub struct Extractor {
    dynamic: Option<Arc<dyn ContentSource>>,
    fallback: Arc<dyn ContentSource>,
}

impl Extractor {
    pub fn new(dynamic: Option<Arc<dyn ContentSource>>, fallback: Arc<dyn ContentSource>) -> Self {
        Self { dynamic, fallback }
    }

    /// Build the production pipeline.
    ///
    /// A dynamic source exists only when the `render` feature is compiled in
    /// and `render_enabled` is set.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let fetcher = Arc::new(FetchClient::new(FetchConfig::from(config))?);
        let fallback: Arc<dyn ContentSource> = Arc::new(StaticExtractor::new(fetcher, ExtractConfig::from(config)));
        Ok(Self::new(dynamic_source(config), fallback))
    }

    /// Whether dynamic rendering can be attempted at all.
    pub fn dynamic_available(&self) -> bool {
        self.dynamic.is_some()
    }

    /// Normalize `raw_url` and extract its text.
    ///
    /// URL validation failures return before any network access.
    pub async fn load(&self, raw_url: &str, opts: &LoadOptions) -> Result<ExtractedPage, Error> {
        let url = normalize(raw_url)?;

        let mut state = LoadState::NotStarted;
        let mut dynamic_error: Option<Error> = None;
        let mut outcome: Option<Result<ExtractedPage, Error>> = None;

        loop {
            tracing::trace!(url = %url, ?state, "extraction state");
            state = match state {
                LoadState::NotStarted => match &self.dynamic {
                    Some(_) if opts.render => LoadState::TryDynamic,
                    _ => LoadState::TryStatic,
                },
                LoadState::TryDynamic => {
                    let Some(source) = &self.dynamic else {
                        break;
                    };
                    match self.attempt(source.as_ref(), &url, opts).await {
                        Ok(page) => {
                            outcome = Some(Ok(page));
                            LoadState::Succeeded
                        }
                        Err(e) => {
                            dynamic_error = Some(e);
                            LoadState::TryStatic
                        }
                    }
                }
                LoadState::TryStatic => match self.attempt(self.fallback.as_ref(), &url, opts).await {
                    Ok(page) => {
                        let page = if dynamic_error.is_some() { page.as_fallback() } else { page };
                        outcome = Some(Ok(page));
                        LoadState::Succeeded
                    }
                    Err(e) => {
                        outcome = Some(Err(self.terminal_error(e, dynamic_error.as_ref(), opts)));
                        LoadState::Failed
                    }
                },
                LoadState::Succeeded | LoadState::Failed => break,
            };
        }

        match outcome {
            Some(Ok(page)) => {
                tracing::info!(
                    url = %page.url,
                    method = %page.method,
                    fallback = page.fallback,
                    chars = page.stats.char_count,
                    "page extracted"
                );
                Ok(page)
            }
            Some(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "page extraction failed");
                Err(e)
            }
            None => Err(Error::Browser("extraction ended without a result".to_string())),
        }
    }

    /// [`Extractor::load`] folded into the tagged record handed to callers.
    pub async fn load_outcome(&self, raw_url: &str, opts: &LoadOptions) -> PageOutcome {
        PageOutcome::from(self.load(raw_url, opts).await)
    }

    async fn attempt(&self, source: &dyn ContentSource, url: &Url, opts: &LoadOptions) -> Result<ExtractedPage, Error> {
        let method = source.method();
        let result = source.extract(url, opts).await;

        let attempt = match &result {
            Ok(_) => ExtractionAttempt::succeeded(method),
            Err(e) => ExtractionAttempt::failed(method, e),
        };
        tracing::debug!(
            url = %url,
            strategy = %attempt.strategy,
            success = attempt.success,
            error = attempt.error.as_deref().unwrap_or(""),
            "extraction attempt"
        );

        result.map(|text| ExtractedPage::new(url.as_str(), text.title, text.text, method))
    }

    /// Static failure annotated with why dynamic rendering did not help.
    fn terminal_error(&self, static_error: Error, dynamic_error: Option<&Error>, opts: &LoadOptions) -> Error {
        match dynamic_error {
            Some(dynamic) => static_error.with_context(&format!("dynamic rendering also failed: {dynamic}")),
            None if self.dynamic.is_none() => static_error.with_context(DYNAMIC_UNAVAILABLE_NOTE),
            None if !opts.render => static_error.with_context("dynamic rendering was not requested"),
            None => static_error,
        }
    }
}

#[cfg(feature = "render")]
fn dynamic_source(config: &AppConfig) -> Option<Arc<dyn ContentSource>> {
    use crate::render::{DynamicExtractor, HeadlessRenderer};

    config
        .render_enabled
        .then(|| Arc::new(DynamicExtractor::from_config(Arc::new(HeadlessRenderer::new()), config)) as Arc<dyn ContentSource>)
}

#[cfg(not(feature = "render"))]
fn dynamic_source(_config: &AppConfig) -> Option<Arc<dyn ContentSource>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSource {
        method: Method,
        result: Result<PageText, Error>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn ok(method: Method, body: &str) -> Arc<Self> {
            let text = PageText { title: "Mock".to_string(), text: format!("Title: Mock\n{body}") };
            Arc::new(Self { method, result: Ok(text), calls: AtomicUsize::new(0) })
        }

        fn err(method: Method, error: Error) -> Arc<Self> {
            Arc::new(Self { method, result: Err(error), calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for MockSource {
        fn method(&self) -> Method {
            self.method
        }

        async fn extract(&self, _url: &Url, _opts: &LoadOptions) -> Result<PageText, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn insufficient() -> Error {
        Error::InsufficientContent("extracted 12 characters, below the 200 character minimum".to_string())
    }

    #[tokio::test]
    async fn test_invalid_url_touches_nothing() {
        let dynamic = MockSource::ok(Method::Dynamic, "dynamic");
        let fallback = MockSource::ok(Method::Static, "static");
        let extractor = Extractor::new(Some(dynamic.clone()), fallback.clone());

        let err = extractor.load("   ", &LoadOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(dynamic.calls(), 0);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_success() {
        let dynamic = MockSource::ok(Method::Dynamic, "dynamic body");
        let fallback = MockSource::ok(Method::Static, "static body");
        let extractor = Extractor::new(Some(dynamic.clone()), fallback.clone());

        let page = extractor.load("example.com", &LoadOptions::default()).await.unwrap();
        assert_eq!(page.method, Method::Dynamic);
        assert!(!page.fallback);
        assert_eq!(page.url, "https://example.com/");
        assert_eq!(dynamic.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_unavailable_goes_straight_to_static() {
        let fallback = MockSource::ok(Method::Static, "static body");
        let extractor = Extractor::new(None, fallback.clone());

        let page = extractor.load("example.com", &LoadOptions::default()).await.unwrap();
        assert_eq!(page.method, Method::Static);
        assert!(!page.fallback);
        assert_eq!(fallback.calls(), 1);
        assert!(!extractor.dynamic_available());
    }

    #[tokio::test]
    async fn test_render_opt_out_skips_dynamic() {
        let dynamic = MockSource::ok(Method::Dynamic, "dynamic body");
        let fallback = MockSource::ok(Method::Static, "static body");
        let extractor = Extractor::new(Some(dynamic.clone()), fallback.clone());
        let opts = LoadOptions { render: false, ..Default::default() };

        let page = extractor.load("example.com", &opts).await.unwrap();
        assert_eq!(page.method, Method::Static);
        assert_eq!(dynamic.calls(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_failure_falls_back() {
        let dynamic = MockSource::err(Method::Dynamic, Error::Timeout("page load timed out after 30000ms".into()));
        let fallback = MockSource::ok(Method::Static, "static body");
        let extractor = Extractor::new(Some(dynamic.clone()), fallback.clone());

        let page = extractor.load("https://example.com/a", &LoadOptions::default()).await.unwrap();
        assert_eq!(page.method, Method::Static);
        assert!(page.fallback);
        assert_eq!(dynamic.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_fail_reports_static_error_with_dynamic_context() {
        let dynamic = MockSource::err(Method::Dynamic, Error::Browser("launch failed".into()));
        let fallback = MockSource::err(Method::Static, insufficient());
        let extractor = Extractor::new(Some(dynamic), fallback);

        let err = extractor.load("example.com", &LoadOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientContent(_)));
        assert!(err.to_string().contains("dynamic rendering also failed: BROWSER_ERROR: launch failed"));
    }

    #[tokio::test]
    async fn test_static_failure_mentions_unavailable_renderer() {
        let fallback = MockSource::err(Method::Static, Error::Network("status 503".into()));
        let extractor = Extractor::new(None, fallback);

        let err = extractor.load("example.com", &LoadOptions::default()).await.unwrap_err();
        assert_eq!(err.kind(), "NETWORK_ERROR");
        assert!(err.to_string().ends_with(&format!("({DYNAMIC_UNAVAILABLE_NOTE})")));
    }

    #[tokio::test]
    async fn test_load_outcome_tags_errors() {
        let fallback = MockSource::err(Method::Static, insufficient());
        let extractor = Extractor::new(None, fallback);

        let outcome = extractor.load_outcome("example.com", &LoadOptions::default()).await;
        match outcome {
            PageOutcome::Error { kind, message } => {
                assert_eq!(kind, "INSUFFICIENT_CONTENT");
                assert!(message.starts_with("extracted 12 characters"));
            }
            PageOutcome::Success(_) => panic!("expected error outcome"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_are_independent() {
        let fallback = MockSource::ok(Method::Static, "static body");
        let extractor = Arc::new(Extractor::new(None, fallback.clone()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let extractor = extractor.clone();
            handles.push(tokio::spawn(async move {
                extractor.load(&format!("example.com/{i}"), &LoadOptions::default()).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let page = handle.await.unwrap().unwrap();
            assert_eq!(page.url, format!("https://example.com/{i}"));
        }
        assert_eq!(fallback.calls(), 8);
    }

    #[test]
    fn test_load_options_from_request() {
        let opts = LoadOptions::from_request(None, None, false).unwrap();
        assert_eq!(opts, LoadOptions::default());

        let opts = LoadOptions::from_request(Some(false), Some(5_000), true).unwrap();
        assert!(!opts.render);
        assert_eq!(opts.page_load_timeout, Some(Duration::from_secs(5)));

        assert!(LoadOptions::from_request(Some(true), None, true).unwrap().render);
        assert_eq!(LoadOptions::from_request(Some(true), None, false), Err(Error::RenderDisabled));
        assert!(matches!(LoadOptions::from_request(None, Some(10), true), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_from_config_without_render() {
        let config = AppConfig { render_enabled: false, ..Default::default() };
        let extractor = Extractor::from_config(&config).unwrap();
        assert!(!extractor.dynamic_available());
    }
}
