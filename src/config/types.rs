//! Configuration Types
//!
//! All configuration structures with sensible defaults. The API key is never
//! part of configuration.

use serde::{Deserialize, Serialize};

use crate::ai::provider::{ProviderConfig, SUPPORTED_PROVIDERS};
use crate::constants::{limits, network};
use crate::types::{AnalysisTier, DxError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Completion provider settings
    pub llm: LlmConfig,

    /// Token thresholds
    pub limits: LimitsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DxError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(DxError::Config(format!(
                "Unknown provider '{}'. Supported: {}",
                self.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DxError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DxError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.limits.prompt_token_ceiling == 0 {
            return Err(DxError::Config(
                "limits.prompt_token_ceiling must be greater than 0".to_string(),
            ));
        }

        if self.limits.usage_advisory_threshold == 0 {
            return Err(DxError::Config(
                "limits.usage_advisory_threshold must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "deepseek"
    pub provider: String,

    /// Model name; discovered from the provider when unset
    pub model: Option<String>,

    /// Custom endpoint base URL
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: network::DEFAULT_TEMPERATURE,
        }
    }
}

impl LlmConfig {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

// =============================================================================
// Limits Configuration
// =============================================================================

/// Token thresholds applied by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Prompt estimate above which a submission needs confirmation
    pub prompt_token_ceiling: u32,

    /// Prompt + completion total above which usage is flagged
    pub usage_advisory_threshold: u32,

    /// Tiers whose prompts are checked against the ceiling
    pub gated_tiers: Vec<AnalysisTier>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            prompt_token_ceiling: limits::DEFAULT_PROMPT_TOKEN_CEILING,
            usage_advisory_threshold: limits::DEFAULT_USAGE_ADVISORY_THRESHOLD,
            gated_tiers: AnalysisTier::ALL.to_vec(),
        }
    }
}

impl LimitsConfig {
    pub fn is_gated(&self, tier: AnalysisTier) -> bool {
        self.gated_tiers.contains(&tier)
    }
}

// =============================================================================
// Tests
// =============================================================================
