//! Submission Pipeline
//!
//! [`Orchestrator`] runs one [`Submission`] at a time through the phases in
//! [`state`], with a single completion request at the end.

mod orchestrator;
pub mod state;

pub use orchestrator::{
    BudgetWarning, CompletionReport, Orchestrator, PreparedPrompt, Submission, SubmissionOutcome,
    UsageAdvisory,
};
pub use state::Phase;
