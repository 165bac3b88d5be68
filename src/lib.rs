//! dxassist - Differential-Diagnosis Prompt Assistant
//!
//! Turns a structured patient case into a bounded, tiered clinical prompt,
//! estimates its token cost, and sends it to a chat-completion provider.
//!
//! ## Core Features
//!
//! - **Tiered Prompts**: Simplified, Intermediate and Full detail levels
//! - **Token Budgeting**: BPE estimates with a word-count fallback
//! - **Budget Gate**: over-ceiling prompts wait for explicit confirmation
//! - **Provider Abstraction**: OpenAI and DeepSeek behind one trait
//!
//! ## Quick Start
//!
//! ```ignore
//! use dxassist::{AnalysisTier, Gender, Orchestrator, PatientCase, Submission};
//! use dxassist::ai::provider::{ProviderConfig, create_client};
//!
//! let client = create_client(&ProviderConfig::default().with_model("gpt-4"))?;
//! let mut pipeline = Orchestrator::new(client, LimitsConfig::default());
//! let case = PatientCase::new(45, Gender::Other, "dor torácica", "dispneia, sudorese");
//! let outcome = pipeline
//!     .run(&Submission::new(case, AnalysisTier::Simplified), &credential, |_| false)
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: token estimation, prompt builder, completion providers
//! - [`imaging`]: canned attachment descriptions
//! - [`pipeline`]: per-submission state machine
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod imaging;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader, LimitsConfig, LlmConfig};

pub use types::{
    AnalysisTier, ApiCredential, CompletionError, CompletionResult, DxError, ErrorKind, Gender,
    PatientCase, Result, ValidationError,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{CompletionReport, Orchestrator, Phase, Submission, SubmissionOutcome};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    BuiltPrompt, CompletionClient, ProviderConfig, SharedClient, TokenCounter, build_prompt,
    create_client, estimate_tokens,
};
pub use imaging::{Attachment, describe};
