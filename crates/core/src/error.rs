//! Unified error types for pagechat.
//!
//! Every failure in the extraction pipeline is returned as one of these
//! values. The display form is `CODE: message` so callers can surface it
//! verbatim.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the extraction pipeline and its callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The raw URL could not be turned into an absolute http(s) URL with a host.
    #[error("VALIDATION_ERROR: {0}")]
    Validation(String),

    /// Page navigation exceeded its bound.
    #[error("TIMEOUT_ERROR: {0}")]
    Timeout(String),

    /// The headless browser session could not be created or crashed.
    #[error("BROWSER_ERROR: {0}")]
    Browser(String),

    /// HTTP-level failure after the retry was spent.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Extraction ran but the cleaned text is below the minimum floor.
    #[error("INSUFFICIENT_CONTENT: {0}")]
    InsufficientContent(String),

    /// Invalid tool or command parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Dynamic rendering was requested but is not available.
    #[error("RENDER_DISABLED")]
    RenderDisabled,

    /// The LLM backend rejected or failed the request.
    #[error("LLM_ERROR: {0}")]
    Llm(String),
}

impl Error {
    /// Stable code string for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Timeout(_) => "TIMEOUT_ERROR",
            Error::Browser(_) => "BROWSER_ERROR",
            Error::Network(_) => "NETWORK_ERROR",
            Error::InsufficientContent(_) => "INSUFFICIENT_CONTENT",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::RenderDisabled => "RENDER_DISABLED",
            Error::Llm(_) => "LLM_ERROR",
        }
    }

    /// Message without the code prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::Timeout(msg)
            | Error::Browser(msg)
            | Error::Network(msg)
            | Error::InsufficientContent(msg)
            | Error::InvalidInput(msg)
            | Error::Llm(msg) => msg.clone(),
            Error::RenderDisabled => "dynamic rendering is disabled".to_string(),
        }
    }

    /// Append a note to the message, keeping the variant.
    ///
    /// `RenderDisabled` has no message and is returned unchanged.
    pub fn with_context(self, note: &str) -> Self {
        let join = |msg: String| format!("{msg} ({note})");
        match self {
            Error::Validation(msg) => Error::Validation(join(msg)),
            Error::Timeout(msg) => Error::Timeout(join(msg)),
            Error::Browser(msg) => Error::Browser(join(msg)),
            Error::Network(msg) => Error::Network(join(msg)),
            Error::InsufficientContent(msg) => Error::InsufficientContent(join(msg)),
            Error::InvalidInput(msg) => Error::InvalidInput(join(msg)),
            Error::Llm(msg) => Error::Llm(join(msg)),
            Error::RenderDisabled => Error::RenderDisabled,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::Validation(_) => -32003,
            Error::InsufficientContent(_) => -32000,
            Error::Timeout(_) => -32006,
            Error::Network(_) => -32008,
            Error::Browser(_) => -32012,
            Error::RenderDisabled => -32011,
            Error::Llm(_) => -32013,
        };

        McpError { code: ErrorCode(code), message: err.message().into(), data: None }
    }
}
