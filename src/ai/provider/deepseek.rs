//! DeepSeek API Provider
//!
//! DeepSeek speaks the OpenAI chat-completions dialect, so only endpoint,
//! model names and key variable differ.

use async_trait::async_trait;

use super::{ChatEndpoint, CompletionClient, ProviderConfig};
use crate::ai::timeout::TimeoutConfig;
use crate::types::{ApiCredential, Result};

const DEFAULT_API_BASE: &str = "https://api.deepseek.com";
const DEFAULT_MODEL: &str = "deepseek-chat";
const CREDENTIAL_ENV: &str = "DEEPSEEK_API_KEY";

const MODEL_PREFERENCES: &[&str] = &["deepseek-chat", "deepseek-reasoner"];

/// DeepSeek completion client
#[derive(Debug)]
pub struct DeepSeekClient {
    endpoint: ChatEndpoint,
}

impl DeepSeekClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            endpoint: ChatEndpoint::new(
                "deepseek",
                api_base,
                model,
                TimeoutConfig::from_secs(config.timeout_secs),
            )?,
        })
    }
}

#[async_trait]
impl CompletionClient for DeepSeekClient {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::test_support::{StubResponse, spawn_stub};
    use crate::types::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = ProviderConfig {
            provider: "deepseek".to_string(),
            ..Default::default()
        };
        let client = DeepSeekClient::new(&config).unwrap();
        assert_eq!(client.endpoint.api_base(), DEFAULT_API_BASE);
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.name(), "deepseek");
    }

    #[tokio::test]
    async fn test_errors_carry_provider_name() {
        let stub = spawn_stub(StubResponse::status(
            401,
            r#"{"error":{"message":"Authentication Fails"}}"#,
        ))
        .await;
        let config = ProviderConfig {
            provider: "deepseek".to_string(),
            api_base: Some(stub.base_url.clone()),
            ..Default::default()
        };

        let client = DeepSeekClient::new(&config).unwrap();
        let credential = ApiCredential::new("sk-test").unwrap();
        let err = client.complete(&credential, "prompt", 300, 0.2).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Auth));
        assert!(err.to_string().contains("[deepseek:AUTH]"));
    }
}
