//! Gemini `generateContent` request body.

use serde::Serialize;

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

/// One conversation entry; the whole prompt is sent as a single entry.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

/// Sampling settings.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, generation_config: GenerationConfig) -> Self {
        Self { contents: vec![Content { parts: vec![Part { text: prompt.into() }] }], generation_config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let req = GenerateRequest::new("hello", GenerationConfig { max_output_tokens: 2000, temperature: 0.5 });
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"parts": [{"text": "hello"}]}],
                "generationConfig": {"maxOutputTokens": 2000, "temperature": 0.5}
            })
        );
    }
}
