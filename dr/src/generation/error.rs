//! Generation error types

use thiserror::Error;

use crate::llm::LlmError;

/// Errors from a generation or critique request
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential was resolved; nothing was sent
    #[error("API key is missing: set the {env_var} environment variable")]
    MissingCredential { env_var: String },

    #[error("Generation service error: {0}")]
    Service(#[from] LlmError),

    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The task running the generation died before reporting back
    #[error("Generation interrupted: {0}")]
    Interrupted(String),
}

impl GenerationError {
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, GenerationError::MissingCredential { .. })
    }

    /// Whether re-issuing the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Service(e) => e.is_transient(),
            GenerationError::MissingCredential { .. } | GenerationError::Prompt(_) | GenerationError::Interrupted(_) => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_not_retryable() {
        let err = GenerationError::MissingCredential {
            env_var: "GEMINI_API_KEY".to_string(),
        };
        assert!(err.is_missing_credential());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_service_retryable_follows_llm_error() {
        let err = GenerationError::from(LlmError::Status {
            status: 503,
            message: "Unavailable".to_string(),
        });
        assert!(err.is_retryable());
        assert!(!GenerationError::from(LlmError::EmptyCompletion).is_retryable());
    }
}
