//! Gemini API client error types.

use std::sync::Arc;

use pagechat_core::Error;

/// Errors from the Gemini API client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeminiError {
    /// No API key configured.
    #[error("missing API key: set PAGECHAT_GEMINI_API_KEY")]
    MissingApiKey,

    /// Prompt was empty.
    #[error("empty prompt")]
    EmptyPrompt,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("invalid API response: {0}")]
    Parse(String),

    /// Response carried no usable candidate.
    #[error("no candidates in API response")]
    NoCandidates,
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GeminiError::Timeout } else { GeminiError::Network(Arc::new(err)) }
    }
}

impl From<GeminiError> for Error {
    fn from(err: GeminiError) -> Self {
        Error::Llm(err.to_string())
    }
}
