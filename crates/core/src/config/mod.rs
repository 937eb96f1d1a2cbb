//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGECHAT_*)
//! 2. TOML config file (if PAGECHAT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Hard ceiling for the extracted page text.
pub const MAX_PAGE_CHARS: usize = 20_000;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGECHAT_*)
/// 2. TOML config file (if PAGECHAT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key used for question answering.
    ///
    /// Set via PAGECHAT_GEMINI_API_KEY environment variable.
    /// Required only when a question is asked.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name.
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Maximum bytes to read from a static fetch.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Static HTTP request timeout in milliseconds.
    ///
    /// Set via PAGECHAT_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Whether dynamic rendering (headless browser) is permitted here.
    ///
    /// Set via PAGECHAT_RENDER_ENABLED environment variable.
    #[serde(default)]
    pub render_enabled: bool,

    /// Navigation bound for dynamic rendering in milliseconds.
    #[serde(default = "default_page_load_timeout_ms")]
    pub page_load_timeout_ms: u64,

    /// Settle delay after the document body appears, in milliseconds.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Maximum characters of extracted page text.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Minimum characters of cleaned text for an extraction to count.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Characters of page text handed to the prompt.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,

    /// LLM output token cap.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// LLM sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_page_load_timeout_ms() -> u64 {
    30_000
}

fn default_settle_ms() -> u64 {
    2_000
}

fn default_max_chars() -> usize {
    MAX_PAGE_CHARS
}

fn default_min_content_chars() -> usize {
    200
}

fn default_max_prompt_chars() -> usize {
    15_000
}

fn default_max_output_tokens() -> u32 {
    2_000
}

fn default_temperature() -> f32 {
    0.8
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            render_enabled: false,
            page_load_timeout_ms: default_page_load_timeout_ms(),
            settle_ms: default_settle_ms(),
            max_chars: default_max_chars(),
            min_content_chars: default_min_content_chars(),
            max_prompt_chars: default_max_prompt_chars(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl AppConfig {
    /// Static fetch timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Dynamic navigation bound.
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }

    /// Settle delay after the body appears.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGECHAT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("PAGECHAT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a config from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check if the Gemini API key is available (deferred until first question).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_gemini_api_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "gemini_api_key".into(),
                hint: "Set PAGECHAT_GEMINI_API_KEY environment variable".into(),
            })
    }
}
