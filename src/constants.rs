//! Global Constants
//!
//! Centralized constants for tier tuning, budgets and networking.
//! All magic numbers should be defined here with documentation.

/// Per-tier prompt ceilings and response budgets
pub mod tier {
    /// Character ceiling for chief complaint and symptoms (Simplified)
    pub const SIMPLIFIED_NARRATIVE_CHARS: usize = 300;

    /// Character ceiling for chief complaint and symptoms (Intermediate)
    pub const INTERMEDIATE_NARRATIVE_CHARS: usize = 500;

    /// Character ceiling for chief complaint and symptoms (Full)
    pub const FULL_NARRATIVE_CHARS: usize = 1000;

    /// Character ceiling for optional detail fields, independent of tier
    pub const DETAIL_FIELD_CHARS: usize = 200;

    /// Response token budget (Simplified)
    pub const SIMPLIFIED_RESPONSE_TOKENS: u32 = 300;

    /// Response token budget (Intermediate)
    pub const INTERMEDIATE_RESPONSE_TOKENS: u32 = 500;

    /// Response token budget (Full)
    pub const FULL_RESPONSE_TOKENS: u32 = 800;

    /// Extra response tokens when image notes are attached
    pub const IMAGE_RESPONSE_BONUS: u32 = 100;
}

/// Token estimation constants
pub mod tokens {
    /// Tokens per whitespace-separated word for the heuristic fallback
    pub const WORD_TOKEN_RATIO: f64 = 1.3;
}

/// Usage limits
///
/// Defaults only: every value here is overridable through `[limits]` in config.
pub mod limits {
    /// Prompt estimate above which a submission is blocked pending confirmation
    pub const DEFAULT_PROMPT_TOKEN_CEILING: u32 = 1500;

    /// Prompt + completion total above which a high-usage advisory is shown
    pub const DEFAULT_USAGE_ADVISORY_THRESHOLD: u32 = 3500;
}

/// Attachment constants
pub mod attachments {
    /// MIME types accepted by the upload collaborator
    pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];
}

/// HTTP/Network constants
pub mod network {
    /// Default completion request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Default sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
}
