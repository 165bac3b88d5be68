//! OpenAI API Provider
//!
//! Completion client for OpenAI's Chat Completions API.

use async_trait::async_trait;

use super::{ChatEndpoint, CompletionClient, ProviderConfig};
use crate::ai::timeout::TimeoutConfig;
use crate::types::{ApiCredential, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const CREDENTIAL_ENV: &str = "OPENAI_API_KEY";

/// Most capable first; the first one the key can see is used
const MODEL_PREFERENCES: &[&str] = &["gpt-4", "gpt-3.5-turbo"];

/// OpenAI completion client
#[derive(Debug)]
pub struct OpenAiClient {
    endpoint: ChatEndpoint,
}

impl OpenAiClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            endpoint: ChatEndpoint::new(
                "openai",
                api_base,
                model,
                TimeoutConfig::from_secs(config.timeout_secs),
            )?,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        credential: &ApiCredential,
        prompt: &str,
        response_token_budget: u32,
        temperature: f32,
    ) -> Result<String> {
        self.endpoint
            .complete(credential, prompt, response_token_budget, temperature)
            .await
    }

    async fn list_models(&self, credential: &ApiCredential) -> Result<Vec<String>> {
        self.endpoint.list_models(credential).await
    }

    fn name(&self) -> &str {
        self.endpoint.provider()
    }

    fn model(&self) -> &str {
        self.endpoint.model()
    }

    fn model_preferences(&self) -> &[&'static str] {
        MODEL_PREFERENCES
    }

    fn credential_env_var(&self) -> &str {
        CREDENTIAL_ENV
    }
}
