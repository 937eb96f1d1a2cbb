//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, MAX_PAGE_CHARS};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        ConfigError::Invalid { field: field.into(), reason: reason.into() }
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::InvalidInput(err.to_string())
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `page_load_timeout_ms` is less than 1s or exceeds 5 minutes
    /// - `settle_ms` exceeds 30s
    /// - `max_chars` is 0 or exceeds 20000
    /// - `min_content_chars` is 0 or not below `max_chars`
    /// - `temperature` is outside 0.0..=2.0
    /// - `gemini_model` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if !(1_000..=300_000).contains(&self.page_load_timeout_ms) {
            return Err(ConfigError::invalid("page_load_timeout_ms", "must be between 1000ms and 300000ms"));
        }

        if self.settle_ms > 30_000 {
            return Err(ConfigError::invalid("settle_ms", "must not exceed 30000ms"));
        }

        if self.max_chars == 0 || self.max_chars > MAX_PAGE_CHARS {
            return Err(ConfigError::invalid("max_chars", "must be between 1 and 20000"));
        }

        if self.min_content_chars == 0 || self.min_content_chars >= self.max_chars {
            return Err(ConfigError::invalid("min_content_chars", "must be greater than 0 and below max_chars"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::invalid("temperature", "must be between 0.0 and 2.0"));
        }

        if self.gemini_model.trim().is_empty() {
            return Err(ConfigError::invalid("gemini_model", "must not be empty"));
        }

        if self.max_prompt_chars < self.min_content_chars {
            tracing::warn!(
                max_prompt_chars = self.max_prompt_chars,
                min_content_chars = self.min_content_chars,
                "max_prompt_chars is below min_content_chars; prompts will carry less text than a valid page"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_max_bytes_exceeds_limit() {
        let config = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_page_load_timeout_bounds() {
        let config = AppConfig { page_load_timeout_ms: 999, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "page_load_timeout_ms"));

        let config = AppConfig { page_load_timeout_ms: 300_001, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_settle_too_long() {
        let config = AppConfig { settle_ms: 30_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "settle_ms"));
    }

    #[test]
    fn test_validate_max_chars_above_ceiling() {
        let config = AppConfig { max_chars: 20_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_chars"));
    }

    #[test]
    fn test_validate_min_content_not_below_max() {
        let config = AppConfig { max_chars: 500, min_content_chars: 500, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "min_content_chars"));
    }

    #[test]
    fn test_validate_temperature() {
        let config = AppConfig { temperature: 2.5, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "temperature"));
    }

    #[test]
    fn test_validate_empty_model() {
        let config = AppConfig { gemini_model: "  ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "gemini_model"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            max_bytes: 1,
            timeout_ms: 100,
            page_load_timeout_ms: 1_000,
            settle_ms: 0,
            max_chars: 2,
            min_content_chars: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_into_error() {
        let err: crate::Error = ConfigError::invalid("max_chars", "bad").into();
        assert_eq!(err.kind(), "INVALID_INPUT");
    }
}
