//! page_batch_load tool implementation.
//!
//! Loads several URLs with bounded concurrency. Every URL is an independent
//! extraction; one failure never affects the others.

use pagechat_client::Extractor;
use pagechat_core::{Error, PageOutcome};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::tools::page_load::load_options;

/// Upper bound on `max_concurrency`.
const MAX_CONCURRENCY: u8 = 16;

/// Input parameters for page_batch_load tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageBatchLoadParams {
    /// URLs to load.
    pub urls: Vec<String>,

    /// Headless rendering preference, applied to every URL.
    #[serde(default)]
    pub render: Option<bool>,

    /// Page-load bound for dynamic rendering in milliseconds (1000-300000).
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum number of concurrent extractions (default: 4, max: 16).
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: Option<u8>,
}

fn default_max_concurrency() -> Option<u8> {
    Some(4)
}

/// Individual batch result item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchItem {
    /// The URL as given by the caller.
    pub input: String,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

/// Batch summary statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BatchSummary {
    pub total: u32,
    pub succeeded: u32,
    pub failed: u32,
}

/// Output structure for page_batch_load tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageBatchLoadOutput {
    /// Individual results for each URL (in input order).
    pub results: Vec<BatchItem>,
    pub summary: BatchSummary,
}

/// Implementation of the page_batch_load tool.
pub async fn batch_load_impl(
    extractor: Arc<Extractor>, params: PageBatchLoadParams,
) -> Result<CallToolResult, McpError> {
    let output = batch_load(extractor, params).await?;
    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| McpError::internal_error(format!("failed to serialize output: {e}"), None))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Run every extraction and collect outcomes in input order.
pub async fn batch_load(extractor: Arc<Extractor>, params: PageBatchLoadParams) -> Result<PageBatchLoadOutput, Error> {
    if params.urls.is_empty() {
        return Err(Error::InvalidInput("urls cannot be empty".into()));
    }

    let max_concurrency = params.max_concurrency.unwrap_or(4).min(MAX_CONCURRENCY) as usize;
    if max_concurrency == 0 {
        return Err(Error::InvalidInput("max_concurrency must be at least 1".into()));
    }

    let opts = load_options(&extractor, params.render, params.timeout_ms)?;
    let semaphore = Arc::new(Semaphore::new(max_concurrency));
    let mut join_set = JoinSet::new();

    for (index, url) in params.urls.iter().cloned().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::InvalidInput(format!("concurrency limiter closed: {e}")))?;
        let extractor = extractor.clone();
        let opts = opts.clone();

        join_set.spawn(async move {
            let _permit = permit;
            let outcome = extractor.load_outcome(&url, &opts).await;
            (index, BatchItem { input: url, outcome })
        });
    }

    let mut slots: Vec<Option<BatchItem>> = vec![None; params.urls.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, item)) => slots[index] = Some(item),
            Err(e) => tracing::error!("batch extraction task failed: {e}"),
        }
    }

    let results: Vec<BatchItem> = slots
        .into_iter()
        .zip(params.urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| BatchItem {
                input: url,
                outcome: PageOutcome::Error {
                    kind: "BROWSER_ERROR".to_string(),
                    message: "extraction task aborted".to_string(),
                },
            })
        })
        .collect();

    let succeeded = results.iter().filter(|item| item.outcome.is_success()).count() as u32;
    let summary = BatchSummary { total: results.len() as u32, succeeded, failed: results.len() as u32 - succeeded };

    tracing::info!(total = summary.total, succeeded = summary.succeeded, "batch load complete");

    Ok(PageBatchLoadOutput { results, summary })
}
