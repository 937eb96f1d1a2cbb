//! Gemini API client for page question answering.
//!
//! ### API contract
//!
//! - **Endpoint**: `{base}/models/{model}:generateContent`
//! - **Authentication**: API key in the `key` query parameter.
//! - **Request**: the whole prompt as one content part, with
//!   `maxOutputTokens` and `temperature`.
//! - **Answer**: first candidate's first text part, trimmed.

pub mod error;
pub mod request;
pub mod response;

pub use error::GeminiError;
pub use request::{GenerateRequest, GenerationConfig};
pub use response::GenerateResponse;

use async_trait::async_trait;
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pagechat_core::{AppConfig, ChatSession, Error};

/// Default base URL for the Gemini API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = concat!("pagechat/", env!("CARGO_PKG_VERSION"));

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Model name (default: gemini-1.5-flash).
    pub model: String,
    pub base_url: String,
    /// Request timeout (default: 30s).
    pub timeout: Duration,
    pub generation: GenerationConfig,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            generation: GenerationConfig { max_output_tokens: 2000, temperature: 0.8 },
        }
    }
}

impl GeminiConfig {
    /// Build from application config. Fails when no API key is set.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GeminiError> {
        let api_key = config.require_gemini_api_key().map_err(|_| GeminiError::MissingApiKey)?;

        Ok(Self {
            api_key: api_key.to_string(),
            model: config.gemini_model.clone(),
            generation: GenerationConfig {
                max_output_tokens: config.max_output_tokens,
                temperature: config.temperature,
            },
            ..Default::default()
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

/// Text completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` and return the answer text.
    async fn generate(&self, prompt: &str) -> Result<String, Error>;
}

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if config.api_key.is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeminiError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, GeminiError> {
        Self::new(GeminiConfig::from_app_config(config)?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send one `generateContent` request.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiError> {
        if prompt.trim().is_empty() {
            return Err(GeminiError::EmptyPrompt);
        }

        let start = Instant::now();
        let body = GenerateRequest::new(prompt, self.config.generation);

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "calling Gemini API");

        let http_response = self
            .http
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .header(header::USER_AGENT, DEFAULT_USER_AGENT)
            .json(&body)
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("Gemini API response status: {}", status);

        if status == 401 || status == 403 {
            return Err(GeminiError::AuthError);
        }

        if status == 429 {
            return Err(GeminiError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(GeminiError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&bytes).map_err(|e| GeminiError::Parse(e.to_string()))?;
        let answer = parsed.answer()?;

        tracing::debug!("generation completed in {:?}, {} chars", start.elapsed(), answer.chars().count());
        Ok(answer)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        Ok(self.generate_content(prompt).await?)
    }
}

/// Ask a question about the session's page and record the turn.
///
/// The session is left untouched when the prompt cannot be built or the
/// model call fails.
pub async fn ask_session(
    model: &dyn LanguageModel,
    session: &mut ChatSession,
    question: &str,
    max_prompt_chars: usize,
) -> Result<String, Error> {
    let prompt = session.prompt_for(question, max_prompt_chars)?;
    let answer = model.generate(&prompt).await?;
    session.record(question.trim(), answer.clone());
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagechat_core::{ExtractedPage, Method};
    use std::sync::Mutex;

    struct EchoModel {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn generate(&self, prompt: &str) -> Result<String, Error> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            Ok(format!("answer {}", prompts.len()))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn generate(&self, _prompt: &str) -> Result<String, Error> {
            Err(GeminiError::Timeout.into())
        }
    }

    fn loaded_session() -> ChatSession {
        let mut session = ChatSession::new();
        session.load(ExtractedPage::new(
            "https://example.com/",
            "Example",
            "Title: Example\nSome page text.".to_string(),
            Method::Static,
        ));
        session
    }

    #[test]
    fn test_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.generation.max_output_tokens, 2000);
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig {
            gemini_api_key: Some("secret".to_string()),
            gemini_model: "gemini-pro".to_string(),
            max_output_tokens: 512,
            ..Default::default()
        };
        let config = GeminiConfig::from_app_config(&app).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.generation.max_output_tokens, 512);
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_config_missing_key() {
        let result = GeminiConfig::from_app_config(&AppConfig::default());
        assert!(matches!(result, Err(GeminiError::MissingApiKey)));
    }

    #[test]
    fn test_client_new_missing_key() {
        let result = GeminiClient::new(GeminiConfig::default());
        assert!(matches!(result, Err(GeminiError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_generate_content_rejects_empty_prompt() {
        let client = GeminiClient::new(GeminiConfig { api_key: "k".into(), ..Default::default() }).unwrap();
        let result = client.generate_content("   ").await;
        assert!(matches!(result, Err(GeminiError::EmptyPrompt)));
    }

    #[tokio::test]
    async fn test_ask_session_records_turns() {
        let model = EchoModel { prompts: Mutex::new(Vec::new()) };
        let mut session = loaded_session();

        let first = ask_session(&model, &mut session, "What is this page?", 15_000).await.unwrap();
        let second = ask_session(&model, &mut session, "  Anything else? ", 15_000).await.unwrap();

        assert_eq!(first, "answer 1");
        assert_eq!(second, "answer 2");
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[1].question, "Anything else?");

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[1].contains("User: What is this page?\nAssistant: answer 1\n"));
        assert!(prompts[1].ends_with("User: Anything else?\nAssistant:"));
    }

    #[tokio::test]
    async fn test_ask_session_failure_keeps_history() {
        let mut session = loaded_session();
        let err = ask_session(&FailingModel, &mut session, "Why?", 15_000).await.unwrap_err();
        assert_eq!(err.kind(), "LLM_ERROR");
        assert!(session.turns().is_empty());
    }

    #[tokio::test]
    async fn test_ask_session_without_page() {
        let model = EchoModel { prompts: Mutex::new(Vec::new()) };
        let mut session = ChatSession::new();
        let err = ask_session(&model, &mut session, "Why?", 15_000).await.unwrap_err();
        assert_eq!(err.kind(), "INVALID_INPUT");
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires network and PAGECHAT_GEMINI_API_KEY"]
    async fn test_generate_live() {
        let config = AppConfig::load().unwrap();
        let client = GeminiClient::from_app_config(&config).unwrap();
        let answer = client.generate("Reply with the single word: pong").await.unwrap();
        assert!(!answer.is_empty());
    }
}
