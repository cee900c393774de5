//! GenerationPipeline - one in-flight generation at a time
//!
//! The pipeline owns the generation state machine:
//!
//! ```text
//! Idle | Succeeded | Failed  --dispatch-->  Pending  --resolve-->  Succeeded | Failed
//! ```
//!
//! `dispatch` hands back a [`PendingGeneration`] future instead of awaiting it,
//! so the owner decides where the call runs. A dispatch while Pending is a no-op.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{GenerationClient, GenerationError};
use crate::config::GenerationConfig;
use crate::domain::GenerationParameters;
use crate::llm::LlmError;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Ceiling for the computed backoff between retries
const MAX_BACKOFF_MS: u64 = 60_000;

/// Shown when the completion came back empty
pub const EMPTY_COMPLETION_FALLBACK: &str = "Failed to generate script content.";

/// Shown for any other service failure
pub const SERVICE_ERROR_FALLBACK: &str = "An error occurred while generating the script. Please try again.";

/// Lifecycle of the most recent generation request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum GenerationState {
    #[default]
    Idle,
    Pending,
    Succeeded {
        text: String,
    },
    Failed {
        fallback: String,
        error: String,
    },
}

impl GenerationState {
    pub fn is_pending(&self) -> bool {
        matches!(self, GenerationState::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::Pending => "pending",
            GenerationState::Succeeded { .. } => "succeeded",
            GenerationState::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether the text in a [`GeneratedText`] came from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationStatus {
    Succeeded,
    Failed,
}

/// Resolved output of a generation: always non-empty text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText {
    pub content: String,
    pub status: GenerationStatus,
}

/// In-band replacement text for a failed generation
pub fn fallback_text(error: &GenerationError) -> String {
    match error {
        GenerationError::MissingCredential { env_var } => {
            format!("Error: API key is missing. Please set the {} environment variable.", env_var)
        }
        GenerationError::Service(LlmError::EmptyCompletion) => EMPTY_COMPLETION_FALLBACK.to_string(),
        GenerationError::Service(_) | GenerationError::Prompt(_) | GenerationError::Interrupted(_) => {
            SERVICE_ERROR_FALLBACK.to_string()
        }
    }
}

/// Exponential backoff before retry number `attempt + 1`, capped at a minute
fn backoff_delay(attempt: u32) -> Duration {
    let ms = 2u64
        .saturating_pow(attempt)
        .saturating_mul(INITIAL_BACKOFF_MS)
        .min(MAX_BACKOFF_MS);
    Duration::from_millis(ms)
}

/// A dispatched generation waiting to be run
///
/// Carries an immutable snapshot of the parameters taken at dispatch time.
pub struct PendingGeneration {
    client: Arc<GenerationClient>,
    params: GenerationParameters,
    timeout: Duration,
    max_retries: u32,
}

impl PendingGeneration {
    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    /// Perform the call under the timeout and retry policy
    ///
    /// The timeout bounds the whole run, backoff sleeps included.
    pub async fn run(self) -> Result<String, GenerationError> {
        debug!(timeout_ms = %self.timeout.as_millis(), max_retries = %self.max_retries, "PendingGeneration::run: called");
        match tokio::time::timeout(self.timeout, self.attempts()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Generation timed out after {:?}", self.timeout);
                Err(LlmError::Timeout(self.timeout).into())
            }
        }
    }

    async fn attempts(&self) -> Result<String, GenerationError> {
        let mut attempt = 0;
        loop {
            match self.client.generate(&self.params).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = match &e {
                        GenerationError::Service(llm) => llm.retry_after(),
                        _ => None,
                    }
                    .unwrap_or_else(|| backoff_delay(attempt));
                    attempt += 1;
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "PendingGeneration: retrying after transient error"
                    );
                    tokio::time::sleep(backoff).await;
                }
                result => {
                    debug!(attempt, ok = result.is_ok(), "PendingGeneration::attempts: finished");
                    return result;
                }
            }
        }
    }
}

/// Orchestrates one in-flight generation request at a time
pub struct GenerationPipeline {
    client: Arc<GenerationClient>,
    state: GenerationState,
    timeout: Duration,
    max_retries: u32,
}

impl GenerationPipeline {
    pub fn new(client: GenerationClient, config: &GenerationConfig) -> Self {
        debug!(timeout_ms = %config.timeout_ms, max_retries = %config.max_retries, "GenerationPipeline::new: called");
        Self {
            client: Arc::new(client),
            state: GenerationState::Idle,
            timeout: config.timeout(),
            max_retries: config.max_retries,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn client(&self) -> &GenerationClient {
        &self.client
    }

    /// Start a generation for a snapshot of `params`
    ///
    /// Returns `None` and leaves the state untouched when a generation is
    /// already pending.
    pub fn dispatch(&mut self, params: &GenerationParameters) -> Option<PendingGeneration> {
        debug!(state = %self.state, "GenerationPipeline::dispatch: called");
        if self.state.is_pending() {
            debug!("GenerationPipeline::dispatch: already pending, ignoring");
            return None;
        }

        info!(genre = %params.genre, "Generation dispatched");
        self.state = GenerationState::Pending;
        Some(PendingGeneration {
            client: self.client.clone(),
            params: params.clone(),
            timeout: self.timeout,
            max_retries: self.max_retries,
        })
    }

    /// Record the outcome of the pending generation
    ///
    /// Failures resolve to explanatory fallback text, so the result is never
    /// empty.
    pub fn resolve(&mut self, outcome: Result<String, GenerationError>) -> GeneratedText {
        debug!(state = %self.state, ok = outcome.is_ok(), "GenerationPipeline::resolve: called");
        if !self.state.is_pending() {
            warn!(state = %self.state, "Resolving a generation that was not pending");
        }

        match outcome {
            Ok(text) => {
                info!(len = text.len(), "Generation succeeded");
                self.state = GenerationState::Succeeded { text: text.clone() };
                GeneratedText {
                    content: text,
                    status: GenerationStatus::Succeeded,
                }
            }
            Err(e) => {
                let fallback = fallback_text(&e);
                warn!(error = %e, "Generation failed");
                self.state = GenerationState::Failed {
                    fallback: fallback.clone(),
                    error: e.to_string(),
                };
                GeneratedText {
                    content: fallback,
                    status: GenerationStatus::Failed,
                }
            }
        }
    }
}
