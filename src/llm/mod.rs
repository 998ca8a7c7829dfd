//! LLM — client for the Llama vision/chat API.
//!
//! DESIGN
//! ======
//! Configured from environment variables at startup. The client is optional:
//! when no credential is present the service stays up and every LLM-backed
//! endpoint serves its demo fallback instead. Callers depend on the
//! [`LlmChat`] trait, never on the concrete client.

pub mod config;
pub mod llama;
pub mod types;

use config::LlmConfig;
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by the Llama chat-completions API.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: llama::LlamaClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing/invalid or the HTTP
    /// client fails to build.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(LlmConfig::from_env()?)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = llama::LlamaClient::new(config.api_key, config.base_url, config.timeouts)?;
        Ok(Self { inner, model })
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        temperature: f32,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        self.inner
            .chat(model, max_tokens, temperature, messages)
            .await
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
