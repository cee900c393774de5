//! Errors from a single completion call
//!
//! The classification here drives the generation retry policy. Transient
//! failures are re-issued with backoff; everything else resolves straight to
//! fallback text.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP 429; `retry_after` is set only when the provider sent the header
    #[error("Provider rate limited the request")]
    RateLimited { retry_after: Option<Duration> },

    /// Any other non-success HTTP status
    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Could not reach provider: {0}")]
    Network(#[from] reqwest::Error),

    /// The body did not have the provider's expected shape
    #[error("Malformed completion: {0}")]
    Malformed(String),

    /// A well-formed response with no usable scene text
    #[error("Completion contained no text")]
    EmptyCompletion,

    /// The generation deadline passed. Raised by the pipeline, never by a provider.
    #[error("No completion within {0:?}")]
    Timeout(Duration),

    #[error("Completion JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Whether re-issuing the same request could succeed
    ///
    /// A timeout is final: the deadline already spans every attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } | LlmError::Network(_) => true,
            LlmError::Status { status, .. } => matches!(status, 408 | 500..=599),
            LlmError::Timeout(_) | LlmError::Malformed(_) | LlmError::EmptyCompletion | LlmError::Json(_) => false,
        }
    }

    /// Provider-requested delay, which takes precedence over computed backoff
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> LlmError {
        LlmError::Status {
            status: code,
            message: "body".to_string(),
        }
    }

    #[test]
    fn test_transient_statuses() {
        assert!(status(408).is_transient());
        assert!(status(503).is_transient());
        assert!(!status(400).is_transient());
        assert!(!status(401).is_transient());
    }

    #[test]
    fn test_rate_limit_transient_with_or_without_header() {
        assert!(LlmError::RateLimited { retry_after: None }.is_transient());
        assert!(
            LlmError::RateLimited {
                retry_after: Some(Duration::from_secs(5))
            }
            .is_transient()
        );
    }

    #[test]
    fn test_final_failures() {
        assert!(!LlmError::Timeout(Duration::from_secs(120)).is_transient());
        assert!(!LlmError::EmptyCompletion.is_transient());
        assert!(!LlmError::Malformed("no candidates".to_string()).is_transient());
    }

    #[test]
    fn test_retry_after_only_from_header() {
        let err = LlmError::RateLimited {
            retry_after: Some(Duration::from_secs(42)),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));
        assert_eq!(LlmError::RateLimited { retry_after: None }.retry_after(), None);
        assert_eq!(status(503).retry_after(), None);
    }
}
