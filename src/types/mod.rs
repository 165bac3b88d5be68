pub mod case;
pub mod completion;
pub mod error;
pub mod tier;

pub use case::{Gender, MAX_AGE, PatientCase};
pub use completion::{ApiCredential, CompletionResult};
pub use error::{
    CompletionError, DxError, ErrorClassifier, ErrorKind, Result, ValidationError,
    ValidationErrorKind,
};
pub use tier::AnalysisTier;

// =============================================================================
// Domain Newtypes
// =============================================================================

use std::fmt;
use uuid::Uuid;

/// Type-safe wrapper for submission IDs
///
/// Correlates the log lines of one submission. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_ids_are_unique() {
        assert_ne!(SubmissionId::new(), SubmissionId::new());
    }
}
