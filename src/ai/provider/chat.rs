//! Chat Completions Exchange
//!
//! Wire format and HTTP round trip shared by every OpenAI-compatible provider.
//! All failures leave this module as a `CompletionError` with a stable kind.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::ai::timeout::{TimeoutConfig, with_timeout};
use crate::types::{
    ApiCredential, CompletionError, DxError, ErrorClassifier, ErrorKind, Result,
};

/// HTTP endpoint of one chat-completions provider
pub struct ChatEndpoint {
    provider: &'static str,
    api_base: String,
    model: String,
    timeouts: TimeoutConfig,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEndpoint")
            .field("provider", &self.provider)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl ChatEndpoint {
    pub fn new(
        provider: &'static str,
        api_base: &str,
        model: String,
        timeouts: TimeoutConfig,
    ) -> Result<Self> {
        let api_base = Self::validate_endpoint(provider, api_base)?;

        let client = reqwest::Client::builder()
            .timeout(timeouts.completion)
            .connect_timeout(timeouts.connection)
            .build()
            .map_err(|e| DxError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            provider,
            api_base,
            model,
            timeouts,
            client,
        })
    }

    /// Only allow http/https and normalize away the trailing slash
    fn validate_endpoint(provider: &str, endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            DxError::Config(format!(
                "Invalid {} endpoint URL '{}': {}",
                provider, endpoint, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DxError::Config(format!(
                "{} endpoint must use http or https scheme, got: {}",
                provider,
                url.scheme()
            )));
        }

        if url.scheme() == "http"
            && let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
        {
            warn!(
                "{} endpoint {} is plain http; the API key would travel unencrypted",
                provider, host
            );
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn build_request(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens,
            temperature,
        }
    }

    /// POST `/chat/completions` and return the first choice's content
    pub async fn complete(
        &self,
        credential: &ApiCredential,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        info!(
            "Requesting completion from {} (model: {}, max_tokens: {}, prompt_chars: {})",
            self.provider,
            self.model,
            max_tokens,
            prompt.chars().count()
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt, max_tokens, temperature);
        let url = format!("{}/chat/completions", self.api_base);

        let text = with_timeout(
            self.timeouts.completion,
            async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(credential.expose())
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| ErrorClassifier::classify_transport(&e, self.provider))?;

                let body = self.read_success_body(response).await?;
                self.parse_completion(&body)
            },
            "completion request",
        )
        .await?;

        debug!(
            "Received completion from {} in {}ms ({} chars)",
            self.provider,
            start_time.elapsed().as_millis(),
            text.chars().count()
        );
        Ok(text)
    }

    /// GET `/models` and return the model identifiers
    pub async fn list_models(&self, credential: &ApiCredential) -> Result<Vec<String>> {
        let url = format!("{}/models", self.api_base);
        debug!("Listing models from {}", self.provider);

        with_timeout(
            self.timeouts.completion,
            async {
                let response = self
                    .client
                    .get(&url)
                    .bearer_auth(credential.expose())
                    .send()
                    .await
                    .map_err(|e| ErrorClassifier::classify_transport(&e, self.provider))?;

                let body = self.read_success_body(response).await?;
                let models: ModelsResponse = serde_json::from_str(&body).map_err(|e| {
                    self.unexpected(format!("Failed to parse model list: {}", e))
                })?;
                Ok(models.data.into_iter().map(|m| m.id).collect())
            },
            "model listing",
        )
        .await
    }

    /// Body of a 2xx response, or the classified provider error
    async fn read_success_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ErrorClassifier::classify_http_status(status.as_u16(), &body, self.provider);
            warn!("{} answered HTTP {} ({})", self.provider, status, err.kind);
            return Err(err.into());
        }

        response
            .text()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, self.provider).into())
    }

    fn parse_completion(&self, body: &str) -> Result<String> {
        let parsed: ChatCompletionResponse = serde_json::from_str(body)
            .map_err(|e| self.unexpected(format!("Failed to parse completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.unexpected("No content in completion response"))
    }

    fn unexpected(&self, message: impl Into<String>) -> DxError {
        CompletionError::new(ErrorKind::UnexpectedResponse, message)
            .provider(self.provider)
            .into()
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}
