//! URL normalization for raw user input.
//!
//! No network access happens here.

use pagechat_core::Error;

/// Error type for URL normalization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("no host in URL: {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Error::Validation(err.to_string())
    }
}

/// Turn a raw user string into an absolute http(s) URL with a host.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Prepend `https://` unless the input starts with `http://` or `https://`
/// 3. Parse and require a non-empty host
/// 4. Lowercase the host
/// 5. Remove fragment (#...)
pub fn normalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let lowered = trimmed.to_ascii_lowercase();
    let url_str = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        trimmed.to_string()
    } else if let Some((scheme, _)) = trimmed.split_once("://")
        && !scheme.is_empty()
        && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return Err(UrlError::UnsupportedScheme(scheme.to_ascii_lowercase()));
    } else {
        format!("https://{trimmed}")
    };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(format!("{trimmed}: {e}")))?;

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(UrlError::MissingHost(trimmed.to_string())),
    };
    parsed
        .set_host(Some(&host))
        .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        let url = normalize("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_normalize_prepends_https() {
        let url = normalize("example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_prepends_https_with_path() {
        let url = normalize("en.wikipedia.org/wiki/Rust").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.path(), "/wiki/Rust");
    }

    #[test]
    fn test_normalize_keeps_http() {
        let url = normalize("http://example.com").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_normalize_scheme_case_insensitive() {
        let url = normalize("HTTPS://Example.COM/Path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/Path");
    }

    #[test]
    fn test_normalize_remove_fragment() {
        let url = normalize("https://example.com/page?q=1#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("q=1"));
    }

    #[test]
    fn test_normalize_trim_whitespace() {
        let url = normalize("  example.com  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), Err(UrlError::Empty));
    }

    #[test]
    fn test_normalize_whitespace_only() {
        assert_eq!(normalize("   "), Err(UrlError::Empty));
    }

    #[test]
    fn test_normalize_colons_only() {
        assert!(normalize("::::").is_err());
    }

    #[test]
    fn test_normalize_unsupported_scheme() {
        let result = normalize("ftp://example.com/file");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[test]
    fn test_normalize_missing_host() {
        assert!(normalize("https://").is_err());
        assert!(normalize("http://:80/").is_err());
    }

    #[test]
    fn test_url_error_is_validation() {
        let err: Error = UrlError::Empty.into();
        assert_eq!(err.kind(), "VALIDATION_ERROR");
    }
}
