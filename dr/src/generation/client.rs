//! GenerationClient - one call to the text-generation service per request

use std::sync::Arc;

use eyre::Context;
use tracing::{debug, info};

use super::GenerationError;
use crate::config::Config;
use crate::domain::GenerationParameters;
use crate::llm::{self, CompletionRequest, LlmClient, LlmError};
use crate::prompts::PromptLoader;

/// Stateless adapter over an [`LlmClient`]
///
/// Holds no per-request state and never retries. When no credential was
/// resolved the client still exists, but every call short-circuits with
/// [`GenerationError::MissingCredential`] before touching the network.
#[derive(Clone)]
pub struct GenerationClient {
    llm: Option<Arc<dyn LlmClient>>,
    api_key_env: String,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
    critique_excerpt_chars: usize,
}

impl GenerationClient {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        api_key_env: impl Into<String>,
        prompts: PromptLoader,
        max_tokens: u32,
    ) -> Self {
        let api_key_env = api_key_env.into();
        debug!(has_llm = llm.is_some(), %api_key_env, %max_tokens, "GenerationClient::new: called");
        Self {
            llm,
            api_key_env,
            prompts: Arc::new(prompts),
            max_tokens,
            critique_excerpt_chars: 2000,
        }
    }

    /// Build from configuration, resolving the provider and credential
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        debug!("GenerationClient::from_config: called");
        let resolved = config.llm.resolve();
        let llm = llm::create_client(&resolved).context("Failed to create LLM client")?;
        if llm.is_none() {
            info!(api_key_env = %resolved.api_key_env, "No API key, generation will degrade");
        }
        let prompts = PromptLoader::new(config.prompts.dir.as_deref());
        Ok(Self::new(llm, resolved.api_key_env, prompts, resolved.max_tokens)
            .with_critique_excerpt_chars(config.generation.critique_excerpt_chars))
    }

    pub fn with_critique_excerpt_chars(mut self, chars: usize) -> Self {
        self.critique_excerpt_chars = chars;
        self
    }

    /// Name of the environment variable the credential is read from
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn has_credential(&self) -> bool {
        self.llm.is_some()
    }

    /// Generate an opening scene for the given parameters
    ///
    /// Hero and plot hook are not validated here.
    pub async fn generate(&self, params: &GenerationParameters) -> Result<String, GenerationError> {
        debug!(genre = %params.genre, "GenerationClient::generate: called");
        let llm = self.credentialed()?;
        let prompt = self
            .prompts
            .scene_prompt(params)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        self.complete(llm, prompt).await
    }

    /// Ask for a short critique of the start of `content`
    pub async fn critique(&self, content: &str) -> Result<String, GenerationError> {
        debug!(content_len = content.len(), "GenerationClient::critique: called");
        let llm = self.credentialed()?;
        let prompt = self
            .prompts
            .critique_prompt(content, self.critique_excerpt_chars)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        self.complete(llm, prompt).await
    }

    fn credentialed(&self) -> Result<&Arc<dyn LlmClient>, GenerationError> {
        self.llm.as_ref().ok_or_else(|| {
            debug!(api_key_env = %self.api_key_env, "GenerationClient: missing credential");
            GenerationError::MissingCredential {
                env_var: self.api_key_env.clone(),
            }
        })
    }

    async fn complete(&self, llm: &Arc<dyn LlmClient>, prompt: String) -> Result<String, GenerationError> {
        debug!(model = %llm.model(), prompt_len = prompt.len(), "GenerationClient::complete: called");
        let response = llm.complete(CompletionRequest::single(prompt, self.max_tokens)).await?;
        debug!(stop_reason = ?response.stop_reason, "GenerationClient::complete: response received");

        match response.content {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                debug!("GenerationClient::complete: empty completion");
                Err(LlmError::EmptyCompletion.into())
            }
        }
    }
}
