//! Page extraction result types.
//!
//! An extraction either produces an [`ExtractedPage`] or an [`Error`]. The
//! [`PageOutcome`] record is the serialised form handed to tool and CLI
//! callers: one explicit `status` tag instead of sniffing the text for an
//! error marker.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Which extraction strategy produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    /// Rendered through a headless browser.
    Dynamic,
    /// Fetched over plain HTTP without running scripts.
    Static,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Dynamic => "DYNAMIC",
            Method::Static => "STATIC",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size statistics of the final page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageStats {
    pub char_count: usize,
    pub word_count: usize,
}

impl PageStats {
    pub fn from_text(text: &str) -> Self {
        Self { char_count: text.chars().count(), word_count: text.split_whitespace().count() }
    }
}

/// A successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedPage {
    /// Normalized URL that was loaded.
    pub url: String,
    /// Page title (also the first line of `text`).
    pub title: String,
    /// Title-prefixed, deduplicated, whitespace-normalized and clamped text.
    pub text: String,
    /// Strategy that produced the text.
    pub method: Method,
    /// True when static extraction succeeded after a failed dynamic attempt.
    pub fallback: bool,
    pub stats: PageStats,
}

impl ExtractedPage {
    pub fn new(url: impl Into<String>, title: impl Into<String>, text: String, method: Method) -> Self {
        let stats = PageStats::from_text(&text);
        Self { url: url.into(), title: title.into(), text, method, fallback: false, stats }
    }

    /// Mark as produced by the static fallback.
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}

/// Tagged success/failure record for external callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Success(ExtractedPage),
    Error { kind: String, message: String },
}

impl PageOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PageOutcome::Success(_))
    }

    pub fn page(&self) -> Option<&ExtractedPage> {
        match self {
            PageOutcome::Success(page) => Some(page),
            PageOutcome::Error { .. } => None,
        }
    }
}

impl From<Result<ExtractedPage, Error>> for PageOutcome {
    fn from(result: Result<ExtractedPage, Error>) -> Self {
        match result {
            Ok(page) => PageOutcome::Success(page),
            Err(err) => PageOutcome::Error { kind: err.kind().to_string(), message: err.message() },
        }
    }
}

/// One strategy run inside the coordinator; logged and then dropped.
#[derive(Debug, Clone)]
pub struct ExtractionAttempt {
    pub strategy: Method,
    pub success: bool,
    pub error: Option<String>,
}

impl ExtractionAttempt {
    pub fn succeeded(strategy: Method) -> Self {
        Self { strategy, success: true, error: None }
    }

    pub fn failed(strategy: Method, error: &Error) -> Self {
        Self { strategy, success: false, error: Some(error.to_string()) }
    }
}
