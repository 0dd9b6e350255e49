//! Gemini `generateContent` client.

use super::{CommentaryError, CommentaryProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CommentaryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CommentaryError::Other(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

impl CommentaryProvider for GeminiClient {
    fn comment(&self, model: &str, prompt: &str) -> Result<String, CommentaryError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(%model, "requesting commentary");

        let resp = self
            .client
            .post(self.endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| CommentaryError::Other(format!("request failed: {}", e.without_url())))?;

        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        if !status.is_success() {
            return Err(CommentaryError::from_status(status.as_u16(), &text, model));
        }

        parse_response(&text)
    }
}

/// Text of the first part of the first candidate.
fn parse_response(body: &str) -> Result<String, CommentaryError> {
    let data: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CommentaryError::Other(format!("unexpected response: {e}")))?;

    data.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CommentaryError::Other("empty response".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_candidate_text() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "  Resistance near $150.\n"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(parse_response(body).unwrap(), "Resistance near $150.");
    }

    #[test]
    fn empty_candidates_is_other() {
        assert!(matches!(
            parse_response(r#"{"candidates": []}"#),
            Err(CommentaryError::Other(_))
        ));
        assert!(matches!(
            parse_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(CommentaryError::Other(_))
        ));
    }

    #[test]
    fn garbage_is_other() {
        assert!(matches!(
            parse_response("<html>"),
            Err(CommentaryError::Other(_))
        ));
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new("k")
            .unwrap()
            .with_base_url("http://localhost:9/v1beta/");
        assert_eq!(
            client.endpoint("gemini-2.0-flash-exp"),
            "http://localhost:9/v1beta/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let client = GeminiClient::new("secret-key").unwrap();
        assert!(!format!("{client:?}").contains("secret-key"));
    }
}
