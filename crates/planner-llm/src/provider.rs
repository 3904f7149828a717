use std::time::Duration;

use async_trait::async_trait;
use planner_core::PlannerError;
use thiserror::Error;

use crate::extract::TextSource;

const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("client setup error: {0}")]
    Setup(String),
}

pub type Result<T> = std::result::Result<T, CompletionError>;

impl CompletionError {
    pub fn api(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        Self::Api { status, body }
    }
}

impl From<CompletionError> for PlannerError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Timeout(limit) => PlannerError::Timeout(limit),
            CompletionError::Api { status, .. } => PlannerError::Upstream {
                status: Some(status),
                message: err.to_string(),
            },
            CompletionError::Setup(message) => PlannerError::Internal(message),
            other => PlannerError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

/// Text produced for one prompt, already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub source: TextSource,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    ///
    /// A response that carries no usable text is not an error; it yields the
    /// fallback plan with [`TextSource::Fallback`].
    async fn complete(&self, prompt: &str) -> Result<Completion>;

    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status_for_passthrough() {
        let err: PlannerError = CompletionError::api(429, "slow down").into();
        assert_eq!(err.status_code(), 429);
        assert_eq!(
            err.to_string(),
            "Completion service error: API error: HTTP 429: slow down"
        );
    }

    #[test]
    fn api_error_body_is_truncated() {
        let long = "x".repeat(1_000);
        match CompletionError::api(500, &long) {
            CompletionError::Api { body, .. } => {
                assert_eq!(body.len(), MAX_ERROR_BODY_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn timeout_becomes_gateway_timeout() {
        let err: PlannerError = CompletionError::Timeout(Duration::from_secs(30)).into();
        assert_eq!(err.status_code(), 504);
    }

    #[test]
    fn transport_failure_becomes_bad_gateway() {
        let err: PlannerError = CompletionError::Http("connection refused".to_string()).into();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn setup_failure_is_internal() {
        let err: PlannerError = CompletionError::Setup("tls backend".to_string()).into();
        assert_eq!(err.status_code(), 500);
    }
}
