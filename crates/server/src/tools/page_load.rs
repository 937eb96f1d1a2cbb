//! page_load tool implementation.
//!
//! Extracts the readable text of one URL, trying dynamic rendering first
//! when it is available and falling back to static extraction.

use pagechat_client::{Extractor, LoadOptions};
use pagechat_core::{Error, PageOutcome};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input parameters for page_load tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageLoadParams {
    /// The URL to load. A missing scheme defaults to https.
    pub url: String,

    /// Headless rendering: omit to use it when available, `true` to require
    /// it, `false` to skip it.
    #[serde(default)]
    pub render: Option<bool>,

    /// Page-load bound for dynamic rendering in milliseconds (1000-300000).
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Validate parameters into load options.
pub fn load_options(extractor: &Extractor, render: Option<bool>, timeout_ms: Option<u64>) -> Result<LoadOptions, Error> {
    LoadOptions::from_request(render, timeout_ms, extractor.dynamic_available())
}

/// Implementation of the page_load tool.
///
/// Parameter problems are protocol errors; extraction failures come back as
/// an `error` outcome in the tool result.
pub async fn load_impl(extractor: &Extractor, params: PageLoadParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let opts = load_options(extractor, params.render, params.timeout_ms)?;
    let outcome = extractor.load_outcome(&params.url, &opts).await;

    outcome_result(&outcome)
}

/// Serialize an outcome as the tool's JSON text content.
pub fn outcome_result(outcome: &PageOutcome) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(outcome)
        .map_err(|e| McpError::internal_error(format!("failed to serialize outcome: {e}"), None))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagechat_core::AppConfig;

    fn extractor() -> Extractor {
        Extractor::from_config(&AppConfig::default()).unwrap()
    }

    fn result_json(result: &CallToolResult) -> serde_json::Value {
        let text = result.content.first().and_then(|c| c.as_text()).map(|t| t.text.clone()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_load_empty_url() {
        let params = PageLoadParams { url: "  ".into(), ..Default::default() };
        let err = load_impl(&extractor(), params).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32602));
    }

    #[tokio::test]
    async fn test_load_invalid_timeout() {
        let params = PageLoadParams { url: "example.com".into(), timeout_ms: Some(5), ..Default::default() };
        let err = load_impl(&extractor(), params).await.unwrap_err();
        assert!(err.message.contains("timeout_ms"));
    }

    #[tokio::test]
    async fn test_load_render_required_but_disabled() {
        let params = PageLoadParams { url: "example.com".into(), render: Some(true), ..Default::default() };
        let err = load_impl(&extractor(), params).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32011));
    }

    #[tokio::test]
    async fn test_load_validation_failure_is_an_outcome() {
        let params = PageLoadParams { url: "ftp://example.com".into(), ..Default::default() };
        let result = load_impl(&extractor(), params).await.unwrap();

        let json = result_json(&result);
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    #[ignore = "requires network"]
    async fn test_load_live_page() {
        let params =
            PageLoadParams { url: "https://www.rust-lang.org".into(), render: Some(false), ..Default::default() };
        let result = load_impl(&extractor(), params).await.unwrap();

        let json = result_json(&result);
        assert_eq!(json["status"], "success");
        assert_eq!(json["method"], "STATIC");
    }
}
