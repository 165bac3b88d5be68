//! Completion Provider Abstraction
//!
//! Defines the [`CompletionClient`] trait: one prompt in, generated text out,
//! with transport and provider failures normalized into [`ErrorKind`].
//! Each provider implements the trait once and is picked from configuration by
//! [`create_client`], never branched on at call time.
//!
//! ## Modules
//!
//! - `chat`: shared chat-completions wire format and HTTP exchange
//! - `openai`: OpenAI Chat Completions
//! - `deepseek`: DeepSeek (OpenAI-compatible)
//!
//! [`ErrorKind`]: crate::types::ErrorKind

mod chat;
mod deepseek;
mod openai;

#[cfg(test)]
pub(crate) mod test_support;

pub use chat::ChatEndpoint;
pub use deepseek::DeepSeekClient;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::constants::network;
use crate::types::{ApiCredential, DxError, Result};

/// Shared completion client handle
pub type SharedClient = Arc<dyn CompletionClient>;

/// Provider names accepted by [`create_client`]
pub const SUPPORTED_PROVIDERS: &[&str] = &["openai", "deepseek"];

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for completion providers
///
/// Carries no credential: the secret is passed to every call instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai", "deepseek"
    pub provider: String,
    /// Model name (provider-specific); provider default when unset
    pub model: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ProviderConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

// =============================================================================
// Completion Client Trait
// =============================================================================

/// One-shot text completion against a remote endpoint
///
/// Implementations send exactly one request per call and never retry.
/// Neither the credential nor the prompt text may be logged.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as a single user message and return the generated text
    async fn complete(
        &self,
        credential: &ApiCredential,
        prompt: &str,
        response_token_budget: u32,
        temperature: f32,
    ) -> Result<String>;

    /// Model identifiers visible to `credential`
    async fn list_models(&self, credential: &ApiCredential) -> Result<Vec<String>>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Models to pick from, most preferred first
    fn model_preferences(&self) -> &[&'static str];

    /// Environment variable conventionally holding this provider's key
    fn credential_env_var(&self) -> &str;
}

/// Create a shared client from configuration
pub fn create_client(config: &ProviderConfig) -> Result<SharedClient> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::new(config)?)),
        "deepseek" => Ok(Arc::new(DeepSeekClient::new(config)?)),
        _ => Err(DxError::Config(format!(
            "Unknown provider: {}. Supported: {}",
            config.provider,
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}

/// First preferred model that is available
pub fn select_model(available: &[String], preferences: &[&str]) -> Option<String> {
    preferences
        .iter()
        .find(|preferred| available.iter().any(|m| m == *preferred))
        .map(|m| m.to_string())
}

/// Create a client, discovering the model when none is configured
///
/// Discovery lists the models visible to `credential` and picks the first
/// preferred one. No preferred model available is a configuration error.
pub async fn discover_client(
    config: &ProviderConfig,
    credential: &ApiCredential,
) -> Result<SharedClient> {
    let client = create_client(config)?;
    if config.model.is_some() {
        return Ok(client);
    }

    let available = client.list_models(credential).await?;
    let model = select_model(&available, client.model_preferences()).ok_or_else(|| {
        DxError::Config(format!(
            "No supported {} model is available to this API key (tried: {})",
            client.name(),
            client.model_preferences().join(", ")
        ))
    })?;
    info!("Selected model {} from {} available", model, available.len());

    create_client(&config.clone().with_model(model))
}
