//! LLM Client module for DraftRoom
//!
//! Provider clients behind a single [`LlmClient`] trait.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod gemini;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::{Provider, ResolvedLlmConfig};

/// Create an LLM client for the configured provider
///
/// Returns `Ok(None)` when the API key environment variable is unset, so the
/// caller can degrade instead of failing.
pub fn create_client(config: &ResolvedLlmConfig) -> Result<Option<Arc<dyn LlmClient>>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    let Some(api_key) = config.api_key() else {
        debug!(api_key_env = %config.api_key_env, "create_client: no API key");
        return Ok(None);
    };

    let client: Arc<dyn LlmClient> = match config.provider {
        Provider::Anthropic => {
            debug!("create_client: creating Anthropic client");
            Arc::new(AnthropicClient::from_config(config, api_key)?)
        }
        Provider::OpenAi => {
            debug!("create_client: creating OpenAI client");
            Arc::new(OpenAIClient::from_config(config, api_key)?)
        }
        Provider::Gemini => {
            debug!("create_client: creating Gemini client");
            Arc::new(GeminiClient::from_config(config, api_key)?)
        }
    };
    Ok(Some(client))
}

/// Map a non-success HTTP response to an [`LlmError`]
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status().as_u16();

    if status == 429 {
        debug!("check_status: rate limited (429)");
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        return Err(LlmError::RateLimited { retry_after });
    }

    if !response.status().is_success() {
        debug!(%status, "check_status: provider returned error status");
        let text = response.text().await.unwrap_or_default();
        return Err(LlmError::Status { status, message: text });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    #[test]
    #[serial_test::serial]
    fn test_create_client_without_key_is_none() {
        let resolved = LlmConfig {
            api_key_env: Some("DRAFTROOM_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        }
        .resolve();
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::remove_var("DRAFTROOM_TEST_UNSET_KEY") };

        assert!(create_client(&resolved).unwrap().is_none());
    }

    #[test]
    #[serial_test::serial]
    fn test_create_client_per_provider() {
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::set_var("DRAFTROOM_TEST_PROVIDER_KEY", "k") };
        for (provider, model) in [
            (Provider::Anthropic, "claude-sonnet-4-20250514"),
            (Provider::OpenAi, "gpt-4o"),
            (Provider::Gemini, "gemini-2.5-flash"),
        ] {
            let resolved = LlmConfig {
                provider,
                api_key_env: Some("DRAFTROOM_TEST_PROVIDER_KEY".to_string()),
                ..Default::default()
            }
            .resolve();
            let client = create_client(&resolved).unwrap().expect("client");
            assert_eq!(client.model(), model);
        }
        unsafe { std::env::remove_var("DRAFTROOM_TEST_PROVIDER_KEY") };
    }
}
