//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Kinds
//!
//! - **Validation**: Required field empty or out of range (no network call made)
//! - **Auth**: Credential rejected by the provider (no retry)
//! - **RateLimit**: Provider throttling or exhausted quota (wait and retry)
//! - **BadRequest**: Payload rejected, provider message kept verbatim
//! - **Timeout**: No response within the timeout window
//! - **Connection**: Provider unreachable
//! - **UnexpectedResponse**: Body not in the expected shape
//!
//! Nothing is retried automatically. Every kind carries a remediation hint for the
//! person who has to re-submit.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Kinds
// =============================================================================

/// Closed error taxonomy surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    RateLimit,
    BadRequest,
    Timeout,
    Connection,
    UnexpectedResponse,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Auth => write!(f, "AUTH"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Connection => write!(f, "CONNECTION"),
            Self::UnexpectedResponse => write!(f, "UNEXPECTED_RESPONSE"),
        }
    }
}

impl ErrorKind {
    /// Hint shown next to the error
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            Self::Validation => "Fill in the chief complaint and symptoms, then submit again.",
            Self::Auth => "Check that the API key is valid and has access to the configured model.",
            Self::RateLimit => {
                "The provider is throttling requests. Wait a moment and submit again."
            }
            Self::BadRequest => {
                "The provider rejected the request. Shorten the case or pick a simpler tier."
            }
            Self::Timeout => "The provider did not answer in time. Submit again to retry.",
            Self::Connection => "The provider could not be reached. Check the network connection.",
            Self::UnexpectedResponse => {
                "The provider answered in an unexpected format. Submit again later."
            }
        }
    }
}

/// Hint used when a 429 reports exhausted quota rather than throttling
const QUOTA_HINT: &str = "The account quota is exhausted. Add a payment method with the provider \
                          or use the simplified analysis to spend fewer tokens.";

/// Provider error code reported with exhausted quota
const INSUFFICIENT_QUOTA: &str = "insufficient_quota";

// =============================================================================
// Completion Error
// =============================================================================

/// Remote-call failure with a stable kind and provider context
#[derive(Debug, Clone)]
pub struct CompletionError {
    /// Error kind (never `Validation`)
    pub kind: ErrorKind,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// HTTP status, when the provider answered
    pub status: Option<u16>,
    /// Provider error code (`error.code` in the body), when present
    pub code: Option<String>,
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.kind, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for CompletionError {}

impl CompletionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            status: None,
            code: None,
        }
    }

    /// Add provider context
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Add HTTP status
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Add provider error code
    pub fn code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub fn timeout(operation: &str, duration: Duration) -> Self {
        Self::new(
            ErrorKind::Timeout,
            format!("{} timed out after {:?}", operation, duration),
        )
    }

    pub fn remediation_hint(&self) -> &'static str {
        if self.kind == ErrorKind::RateLimit && self.code.as_deref() == Some(INSUFFICIENT_QUOTA) {
            return QUOTA_HINT;
        }
        self.kind.remediation_hint()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps transport outcomes onto the closed error taxonomy
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a non-success HTTP status
    ///
    /// The provider's own `error.message` is used verbatim when the body carries one.
    pub fn classify_http_status(status: u16, body: &str, provider: &str) -> CompletionError {
        let (detail, code) = Self::provider_error_detail(body);
        let message = detail.unwrap_or_else(|| format!("HTTP {}", status));

        let kind = match status {
            401 | 403 => ErrorKind::Auth,
            429 => ErrorKind::RateLimit,
            400 | 404 | 413 | 422 => ErrorKind::BadRequest,
            408 | 504 => ErrorKind::Timeout,
            502 | 503 => ErrorKind::Connection,
            _ => ErrorKind::UnexpectedResponse,
        };

        CompletionError::new(kind, message)
            .provider(provider)
            .status(status)
            .code(code)
    }

    /// Classify a transport-level failure (no usable HTTP status)
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> CompletionError {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection
        } else if err.is_decode() || err.is_body() {
            ErrorKind::UnexpectedResponse
        } else if err.is_request() {
            ErrorKind::Connection
        } else {
            ErrorKind::UnexpectedResponse
        };

        // reqwest error text carries the URL, never request headers
        CompletionError::new(kind, format!("request failed: {}", err)).provider(provider)
    }

    /// Extract `error.message` and `error.code` from an OpenAI-style error body
    fn provider_error_detail(body: &str) -> (Option<String>, Option<String>) {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return (None, None);
        };
        let error = value.get("error");
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(String::from);
        let code = error
            .and_then(|e| e.get("code").or_else(|| e.get("type")))
            .and_then(|c| c.as_str())
            .map(String::from);
        (message, code)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// What validation failed
    pub kind: ValidationErrorKind,
    /// Field that failed validation
    pub field: String,
    /// Detailed message
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::MissingField, field, "is required")
    }
}

/// Validation error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required field missing or blank
    MissingField,
    /// Value out of range
    Range,
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    #[error("Completion error: {0}")]
    Completion(CompletionError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid pipeline transition: {0}")]
    InvalidState(String),
}

impl From<CompletionError> for DxError {
    fn from(err: CompletionError) -> Self {
        DxError::Completion(err)
    }
}

impl From<ValidationError> for DxError {
    fn from(err: ValidationError) -> Self {
        DxError::Validation(vec![err])
    }
}

pub type Result<T> = std::result::Result<T, DxError>;

impl DxError {
    /// Project onto the user-facing taxonomy (`None` for local setup failures)
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Validation(_) => Some(ErrorKind::Validation),
            Self::Completion(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            Self::Completion(e) => Some(e.remediation_hint()),
            other => other.kind().map(|k| k.remediation_hint()),
        }
    }

    /// Field-level errors, if this is a validation failure
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
