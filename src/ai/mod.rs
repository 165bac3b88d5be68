//! AI Integration Layer
//!
//! Token estimation, prompt construction and completion providers.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod tokenizer;

pub use prompt::{BuiltPrompt, Instruction, PromptBuilder, PromptSection, SectionKind, build_prompt};
pub use provider::{
    CompletionClient, DeepSeekClient, OpenAiClient, ProviderConfig, SharedClient, create_client,
    discover_client, select_model,
};
pub use timeout::{TimeoutConfig, with_timeout};
pub use tokenizer::{TokenCounter, TokenEstimator, estimate_tokens};
