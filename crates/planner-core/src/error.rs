use std::time::Duration;

use thiserror::Error;

use crate::storage::StoreError;

pub type Result<T, E = PlannerError> = std::result::Result<T, E>;

/// Every failure the request handler can report to a client.
///
/// The `Display` text is what ends up in the `error` field of the failure
/// body, so variants never carry credentials or raw request payloads.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{0}")]
    Validation(String),

    #[error("Completion service error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Completion service timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status reported alongside the failure body.
    pub fn status_code(&self) -> u16 {
        match self {
            PlannerError::Validation(_) => 400,
            PlannerError::Upstream {
                status: Some(status),
                ..
            } if (400..=599).contains(status) => *status,
            PlannerError::Upstream { .. } => 502,
            PlannerError::Timeout(_) => 504,
            PlannerError::Storage(_) => 500,
            PlannerError::Internal(_) => 500,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            PlannerError::Validation(_) => "validation",
            PlannerError::Upstream { .. } | PlannerError::Timeout(_) => "upstream",
            PlannerError::Storage(_) => "storage",
            PlannerError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Internal(format!("serialization failed: {err}"))
    }
}
