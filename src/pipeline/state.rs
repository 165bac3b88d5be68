//! Submission Phases
//!
//! ```text
//! Idle → Validating → (Rejected | Building) → Estimating → (Blocked | Ready)
//!      → Calling → (Succeeded | Failed)
//! ```
//!
//! Rejected, Succeeded and Failed fall straight back to Idle. Blocked waits for
//! the user: confirmation moves it to Ready, abandoning returns to Idle.

use std::fmt;

/// Phase of a single submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Building,
    Estimating,
    /// Prompt estimate exceeds the ceiling; waiting for confirmation
    Blocked,
    Ready,
    Calling,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Validating => "Validating",
            Self::Rejected => "Rejected",
            Self::Building => "Building",
            Self::Estimating => "Estimating",
            Self::Blocked => "Blocked",
            Self::Ready => "Ready",
            Self::Calling => "Calling",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }

    pub fn can_transition_to(&self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Building)
                | (Building, Estimating)
                // Builder failure after validation passed
                | (Building, Failed)
                | (Estimating, Blocked)
                | (Estimating, Ready)
                | (Blocked, Ready)
                | (Blocked, Idle)
                | (Ready, Calling)
                | (Ready, Idle)
                | (Calling, Succeeded)
                | (Calling, Failed)
                | (Rejected, Idle)
                | (Succeeded, Idle)
                | (Failed, Idle)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_allowed() {
        let path = [
            Phase::Idle,
            Phase::Validating,
            Phase::Building,
            Phase::Estimating,
            Phase::Ready,
            Phase::Calling,
            Phase::Succeeded,
            Phase::Idle,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_blocked_cannot_skip_confirmation() {
        assert!(!Phase::Blocked.can_transition_to(Phase::Calling));
        assert!(Phase::Blocked.can_transition_to(Phase::Ready));
        assert!(Phase::Blocked.can_transition_to(Phase::Idle));
    }

    #[test]
    fn test_no_retry_edges() {
        assert!(!Phase::Failed.can_transition_to(Phase::Calling));
        assert!(!Phase::Rejected.can_transition_to(Phase::Validating));
        assert!(!Phase::Idle.can_transition_to(Phase::Calling));
    }

    #[test]
    fn test_outcomes_return_to_idle() {
        for phase in [Phase::Rejected, Phase::Succeeded, Phase::Failed] {
            assert!(phase.can_transition_to(Phase::Idle));
            assert!(!phase.can_transition_to(Phase::Validating));
        }
    }
}
