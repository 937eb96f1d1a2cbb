//! Gemini `generateContent` response types.

use serde::Deserialize;

use super::GeminiError;

/// Raw response body.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Trimmed text of the first candidate's first part.
    pub fn answer(&self) -> Result<String, GeminiError> {
        let candidate = self.candidates.first().ok_or(GeminiError::NoCandidates)?;
        let text = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or_else(|| {
                GeminiError::Parse(format!(
                    "first candidate has no text (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })?;

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_first_candidate() {
        let raw = r#"{"candidates":[
            {"content":{"parts":[{"text":"  The page is about Rust.  "},{"text":"ignored"}]},"finishReason":"STOP"},
            {"content":{"parts":[{"text":"second candidate"}]}}
        ]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.answer().unwrap(), "The page is about Rust.");
    }

    #[test]
    fn test_answer_no_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert!(matches!(response.answer(), Err(GeminiError::NoCandidates)));
    }

    #[test]
    fn test_answer_missing_text() {
        let raw = r#"{"candidates":[{"finishReason":"SAFETY"}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        let err = response.answer().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }
}
