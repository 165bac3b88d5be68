//! Completion Result and Credential

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::error::{DxError, Result};

/// Generated text plus rough token accounting, kept only for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub text: String,
    pub estimated_prompt_tokens: u32,
    pub estimated_completion_tokens: u32,
}

impl CompletionResult {
    /// Prompt + completion estimates
    pub fn total_tokens(&self) -> u32 {
        self.estimated_prompt_tokens
            .saturating_add(self.estimated_completion_tokens)
    }
}

/// Bearer secret for the completion endpoint
///
/// Held in memory for one session. Debug output is redacted by `SecretString`
/// and the type is deliberately not serializable.
#[derive(Debug, Clone)]
pub struct ApiCredential(SecretString);

impl ApiCredential {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        let trimmed = secret.trim();
        if trimmed.is_empty() {
            return Err(DxError::Config("API key is empty".to_string()));
        }
        Ok(Self(SecretString::from(trimmed.to_string())))
    }

    /// Read the credential from an environment variable, if set
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(|v| Self::new(v).ok())
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}
