//! Optional natural-language commentary on a ticker.
//!
//! Commentary is decoration: a failed request is classified and reported
//! next to the analysis but never invalidates it.

mod gemini;

pub use gemini::GeminiClient;

use crate::domain::Instrument;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentaryError {
    #[error("commentary service is rate limiting requests")]
    RateLimited,

    #[error("commentary model {model} not found")]
    ModelNotFound { model: String },

    #[error("commentary failed: {0}")]
    Other(String),
}

impl CommentaryError {
    /// Classify a non-success HTTP response.
    ///
    /// Quota exhaustion is reported either as 429 or as a
    /// `RESOURCE_EXHAUSTED` status inside the error body, so the body is
    /// checked as well.
    pub fn from_status(status: u16, body: &str, model: &str) -> Self {
        if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
            return CommentaryError::RateLimited;
        }
        if status == 404 {
            return CommentaryError::ModelNotFound {
                model: model.to_string(),
            };
        }
        let detail = error_message(body).unwrap_or_else(|| truncate(body.trim(), 200));
        if detail.is_empty() {
            CommentaryError::Other(format!("HTTP {status}"))
        } else {
            CommentaryError::Other(format!("HTTP {status}: {detail}"))
        }
    }
}

/// `error.message` from a JSON error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// A service that turns a prompt into a short comment.
pub trait CommentaryProvider: Send + Sync {
    fn comment(&self, model: &str, prompt: &str) -> Result<String, CommentaryError>;
}

/// Prompt asking for a brief take on overhead resistance and +10% upside.
pub fn build_prompt(
    instrument: &Instrument,
    close: f64,
    high_52w: f64,
    max_chars: usize,
    language: &str,
) -> String {
    format!(
        "{} is trading at ${close:.2}. Its 52-week high is ${high_52w:.2}. \
         From a professional trader's point of view, comment on overhead resistance \
         and the chance of a further +10% move in at most {max_chars} characters. \
         Reply in {language}.",
        instrument.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        assert_eq!(
            CommentaryError::from_status(429, "", "m"),
            CommentaryError::RateLimited
        );
    }

    #[test]
    fn resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error":{"code":400,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            CommentaryError::from_status(400, body, "m"),
            CommentaryError::RateLimited
        );
    }

    #[test]
    fn status_404_names_the_model() {
        assert_eq!(
            CommentaryError::from_status(404, "", "gemini-x"),
            CommentaryError::ModelNotFound {
                model: "gemini-x".into()
            }
        );
    }

    #[test]
    fn other_statuses_carry_the_message() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            CommentaryError::from_status(403, body, "m"),
            CommentaryError::Other("HTTP 403: API key not valid".into())
        );
        assert_eq!(
            CommentaryError::from_status(500, "", "m"),
            CommentaryError::Other("HTTP 500".into())
        );
        assert_eq!(
            CommentaryError::from_status(502, "bad gateway", "m"),
            CommentaryError::Other("HTTP 502: bad gateway".into())
        );
    }

    #[test]
    fn prompt_mentions_prices_and_limit() {
        let nvda = Instrument::new("NVDA", "NVIDIA Corp");
        let prompt = build_prompt(&nvda, 123.456, 150.0, 40, "English");
        assert!(prompt.starts_with("NVIDIA Corp is trading at $123.46."));
        assert!(prompt.contains("52-week high is $150.00"));
        assert!(prompt.contains("+10%"));
        assert!(prompt.contains("at most 40 characters"));
        assert!(prompt.ends_with("Reply in English."));
    }
}
