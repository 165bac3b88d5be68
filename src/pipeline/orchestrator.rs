//! Submission Orchestrator
//!
//! Drives one patient case through validation, prompt building, estimation
//! and a single completion call. Every terminal outcome lands back in
//! [`Phase::Idle`]; nothing is retried.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::state::Phase;
use crate::ai::prompt::{BuiltPrompt, build_prompt};
use crate::ai::provider::SharedClient;
use crate::ai::tokenizer::TokenCounter;
use crate::config::LimitsConfig;
use crate::constants::network;
use crate::imaging::{self, Attachment};
use crate::types::{
    AnalysisTier, ApiCredential, CompletionResult, DxError, PatientCase, Result, SubmissionId,
};

/// One user submission: the case, the chosen tier and attached files
#[derive(Debug, Clone)]
pub struct Submission {
    pub case: PatientCase,
    pub tier: AnalysisTier,
    pub attachments: Vec<Attachment>,
}

impl Submission {
    pub fn new(case: PatientCase, tier: AnalysisTier) -> Self {
        Self {
            case,
            tier,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Case with attachment descriptions appended to its image notes
    pub fn described_case(&self) -> PatientCase {
        let mut case = self.case.clone();
        case.image_notes
            .extend(imaging::describe_all(&self.attachments));
        case
    }
}

/// Prompt estimate above the configured ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetWarning {
    pub estimated_prompt_tokens: u32,
    pub ceiling: u32,
    pub tier: AnalysisTier,
}

/// Built prompt waiting to be sent
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub prompt: BuiltPrompt,
    pub estimated_prompt_tokens: u32,
    /// Set when the estimate exceeded the ceiling
    pub warning: Option<BudgetWarning>,
}

/// Total usage above the advisory threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageAdvisory {
    pub total_tokens: u32,
    pub threshold: u32,
}

/// Outcome of a successful completion
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub tier: AnalysisTier,
    pub result: CompletionResult,
    pub advisory: Option<UsageAdvisory>,
}

/// What [`Orchestrator::run`] ended with
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Completed(CompletionReport),
    /// The user declined to send an over-ceiling prompt
    Declined(BudgetWarning),
}

/// Per-session pipeline
///
/// Holds the client and thresholds; the credential is passed to each call and
/// never stored.
pub struct Orchestrator {
    client: SharedClient,
    counter: TokenCounter,
    limits: LimitsConfig,
    temperature: f32,
    phase: Phase,
    trace: Vec<Phase>,
    pending: Option<PreparedPrompt>,
}

impl Orchestrator {
    pub fn new(client: SharedClient, limits: LimitsConfig) -> Self {
        Self {
            client,
            counter: TokenCounter::default(),
            limits,
            temperature: network::DEFAULT_TEMPERATURE,
            phase: Phase::Idle,
            trace: Vec::new(),
            pending: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_counter(mut self, counter: TokenCounter) -> Self {
        self.counter = counter;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Phases entered by the current or last submission, in order
    pub fn trace(&self) -> &[Phase] {
        &self.trace
    }

    /// Prompt held in `Blocked` or `Ready`
    pub fn pending(&self) -> Option<&PreparedPrompt> {
        self.pending.as_ref()
    }

    fn enter(&mut self, next: Phase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(DxError::InvalidState(format!("{} -> {}", self.phase, next)));
        }
        debug!("Pipeline phase {} -> {}", self.phase, next);
        self.phase = next;
        self.trace.push(next);
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.pending = None;
        self.enter(Phase::Idle)
    }

    /// Validate, build and estimate a submission
    ///
    /// Ends in [`Phase::Ready`], or [`Phase::Blocked`] when the prompt
    /// estimate exceeds the ceiling for its tier. Validation failures return
    /// the field errors and leave the pipeline `Idle`.
    pub fn submit(&mut self, submission: &Submission) -> Result<Phase> {
        if self.phase != Phase::Idle {
            return Err(DxError::InvalidState(format!(
                "cannot submit while {}",
                self.phase
            )));
        }
        self.trace.clear();
        self.trace.push(Phase::Idle);

        let id = SubmissionId::new();
        let submitted_at = Utc::now();

        self.enter(Phase::Validating)?;
        let case = submission.described_case();
        if let Err(e) = case.validate() {
            info!("Submission {} rejected: {}", id, e);
            self.enter(Phase::Rejected)?;
            self.reset()?;
            return Err(e);
        }

        self.enter(Phase::Building)?;
        let prompt = match build_prompt(&case, submission.tier) {
            Ok(prompt) => prompt,
            Err(e) => {
                self.enter(Phase::Failed)?;
                self.reset()?;
                return Err(e);
            }
        };

        self.enter(Phase::Estimating)?;
        let estimated_prompt_tokens = self.counter.count_u32(&prompt.text);
        debug!(
            "Submission {}: prompt {} chars, ~{} tokens, response budget {}",
            id,
            prompt.text.len(),
            estimated_prompt_tokens,
            prompt.response_token_budget
        );

        let warning = (self.limits.is_gated(submission.tier)
            && estimated_prompt_tokens > self.limits.prompt_token_ceiling)
            .then_some(BudgetWarning {
                estimated_prompt_tokens,
                ceiling: self.limits.prompt_token_ceiling,
                tier: submission.tier,
            });

        self.pending = Some(PreparedPrompt {
            id,
            submitted_at,
            prompt,
            estimated_prompt_tokens,
            warning,
        });

        match warning {
            Some(w) => {
                warn!(
                    "Submission {} blocked: ~{} prompt tokens exceeds ceiling {}",
                    id, w.estimated_prompt_tokens, w.ceiling
                );
                self.enter(Phase::Blocked)?;
            }
            None => self.enter(Phase::Ready)?,
        }

        Ok(self.phase)
    }

    /// Accept an over-ceiling prompt
    pub fn confirm(&mut self) -> Result<()> {
        if self.phase != Phase::Blocked {
            return Err(DxError::InvalidState(format!(
                "nothing to confirm while {}",
                self.phase
            )));
        }
        if let Some(pending) = &self.pending {
            info!("Submission {} confirmed over budget", pending.id);
        }
        self.enter(Phase::Ready)
    }

    /// Drop the pending prompt and return to `Idle`
    pub fn abandon(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Blocked | Phase::Ready) {
            return Err(DxError::InvalidState(format!(
                "nothing to abandon while {}",
                self.phase
            )));
        }
        if let Some(pending) = &self.pending {
            info!("Submission {} abandoned", pending.id);
        }
        self.reset()
    }

    /// Send the ready prompt and account for its tokens
    ///
    /// Exactly one request is made. Success and failure both leave the
    /// pipeline `Idle`; a failure carries the mapped error kind.
    pub async fn proceed(&mut self, credential: &ApiCredential) -> Result<CompletionReport> {
        if self.phase != Phase::Ready {
            return Err(DxError::InvalidState(format!(
                "cannot call the provider while {}",
                self.phase
            )));
        }
        let pending = self
            .pending
            .take()
            .ok_or_else(|| DxError::InvalidState("no prompt prepared".to_string()))?;

        self.enter(Phase::Calling)?;
        info!(
            "Submission {}: calling {} ({}) with {} tier",
            pending.id,
            self.client.name(),
            self.client.model(),
            pending.prompt.tier
        );

        let response = self
            .client
            .complete(
                credential,
                &pending.prompt.text,
                pending.prompt.response_token_budget,
                self.temperature,
            )
            .await;

        let text = match response {
            Ok(text) => text,
            Err(e) => {
                warn!("Submission {} failed: {}", pending.id, e);
                self.enter(Phase::Failed)?;
                self.reset()?;
                return Err(e);
            }
        };

        self.enter(Phase::Succeeded)?;
        let result = CompletionResult {
            estimated_completion_tokens: self.counter.count_u32(&text),
            estimated_prompt_tokens: pending.estimated_prompt_tokens,
            text,
        };

        let total_tokens = result.total_tokens();
        let advisory = (total_tokens > self.limits.usage_advisory_threshold).then_some(
            UsageAdvisory {
                total_tokens,
                threshold: self.limits.usage_advisory_threshold,
            },
        );
        if advisory.is_some() {
            warn!(
                "Submission {} used ~{} tokens (advisory threshold {})",
                pending.id, total_tokens, self.limits.usage_advisory_threshold
            );
        }
        info!(
            "Submission {} succeeded: ~{} prompt + ~{} completion tokens",
            pending.id, result.estimated_prompt_tokens, result.estimated_completion_tokens
        );

        let report = CompletionReport {
            id: pending.id,
            submitted_at: pending.submitted_at,
            completed_at: Utc::now(),
            provider: self.client.name().to_string(),
            model: self.client.model().to_string(),
            tier: pending.prompt.tier,
            result,
            advisory,
        };
        self.reset()?;
        Ok(report)
    }

    /// Full cycle for one submission
    ///
    /// `confirm` is asked only when the prompt is blocked; declining returns
    /// [`SubmissionOutcome::Declined`] without any network call.
    pub async fn run<F>(
        &mut self,
        submission: &Submission,
        credential: &ApiCredential,
        confirm: F,
    ) -> Result<SubmissionOutcome>
    where
        F: FnOnce(&BudgetWarning) -> bool,
    {
        if self.submit(submission)? == Phase::Blocked {
            let warning = self
                .pending
                .as_ref()
                .and_then(|p| p.warning)
                .ok_or_else(|| DxError::InvalidState("blocked without a warning".to_string()))?;

            if !confirm(&warning) {
                self.abandon()?;
                return Ok(SubmissionOutcome::Declined(warning));
            }
            self.confirm()?;
        }

        self.proceed(credential).await.map(SubmissionOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::CompletionClient;
    use crate::ai::tokenizer::TokenEstimator;
    use crate::types::{CompletionError, ErrorKind, Gender};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records calls and answers with a fixed outcome
    struct MockClient {
        calls: AtomicUsize,
        last_budget: Mutex<Option<u32>>,
        reply: std::result::Result<String, ErrorKind>,
    }

    impl MockClient {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_budget: Mutex::new(None),
                reply: Ok(text.to_string()),
            })
        }

        fn failing(kind: ErrorKind) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_budget: Mutex::new(None),
                reply: Err(kind),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        async fn complete(
            &self,
            _credential: &ApiCredential,
            _prompt: &str,
            response_token_budget: u32,
            _temperature: f32,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_budget.lock().unwrap() = Some(response_token_budget);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(kind) => Err(CompletionError::new(*kind, "mock failure")
                    .provider("mock")
                    .into()),
            }
        }

        async fn list_models(&self, _credential: &ApiCredential) -> Result<Vec<String>> {
            Ok(vec!["mock-model".to_string()])
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn model_preferences(&self) -> &[&'static str] {
            &["mock-model"]
        }

        fn credential_env_var(&self) -> &str {
            "MOCK_API_KEY"
        }
    }

    fn credential() -> ApiCredential {
        ApiCredential::new("sk-test").unwrap()
    }

    fn chest_pain() -> Submission {
        Submission::new(
            PatientCase::new(45, Gender::Other, "dor torácica", "dispneia, sudorese"),
            AnalysisTier::Simplified,
        )
    }

    fn limits(ceiling: u32, advisory: u32) -> LimitsConfig {
        LimitsConfig {
            prompt_token_ceiling: ceiling,
            usage_advisory_threshold: advisory,
            ..Default::default()
        }
    }

    fn orchestrator(client: Arc<MockClient>, limits: LimitsConfig) -> Orchestrator {
        Orchestrator::new(client, limits).with_counter(TokenCounter::new(TokenEstimator::WordBased))
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let client = MockClient::replying("1. Síndrome coronariana aguda");
        let mut pipeline = orchestrator(client.clone(), LimitsConfig::default());

        let outcome = pipeline
            .run(&chest_pain(), &credential(), |_| panic!("not blocked"))
            .await
            .unwrap();

        let SubmissionOutcome::Completed(report) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(client.calls(), 1);
        assert_eq!(*client.last_budget.lock().unwrap(), Some(300));
        assert_eq!(report.provider, "mock");
        assert!(report.result.estimated_prompt_tokens > 0);
        assert_eq!(report.result.estimated_completion_tokens, 5);
        assert!(report.advisory.is_none());
        assert_eq!(pipeline.phase(), Phase::Idle);
        assert_eq!(
            pipeline.trace(),
            &[
                Phase::Idle,
                Phase::Validating,
                Phase::Building,
                Phase::Estimating,
                Phase::Ready,
                Phase::Calling,
                Phase::Succeeded,
                Phase::Idle
            ]
        );
    }

    #[tokio::test]
    async fn test_over_ceiling_blocks_without_call() {
        let client = MockClient::replying("ok");
        let mut pipeline = orchestrator(client.clone(), limits(10, 3500));

        let phase = pipeline.submit(&chest_pain()).unwrap();
        assert_eq!(phase, Phase::Blocked);
        assert_eq!(client.calls(), 0);

        let warning = pipeline.pending().unwrap().warning.unwrap();
        assert_eq!(warning.ceiling, 10);
        assert!(warning.estimated_prompt_tokens > 10);

        // Blocked prompts cannot be sent before confirmation
        let err = pipeline.proceed(&credential()).await.unwrap_err();
        assert!(matches!(err, DxError::InvalidState(_)));
        assert_eq!(client.calls(), 0);

        pipeline.confirm().unwrap();
        pipeline.proceed(&credential()).await.unwrap();
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_declined_returns_to_idle() {
        let client = MockClient::replying("ok");
        let mut pipeline = orchestrator(client.clone(), limits(10, 3500));

        let outcome = pipeline
            .run(&chest_pain(), &credential(), |_| false)
            .await
            .unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Declined(w) if w.ceiling == 10));
        assert_eq!(client.calls(), 0);
        assert_eq!(pipeline.phase(), Phase::Idle);
        assert!(pipeline.pending().is_none());
        assert!(pipeline.trace().contains(&Phase::Blocked));
    }

    #[tokio::test]
    async fn test_ungated_tier_is_not_blocked() {
        let client = MockClient::replying("ok");
        let limits = LimitsConfig {
            gated_tiers: vec![AnalysisTier::Full],
            ..limits(10, 3500)
        };
        let mut pipeline = orchestrator(client, limits);

        assert_eq!(pipeline.submit(&chest_pain()).unwrap(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_validation_rejects_without_call() {
        let client = MockClient::replying("ok");
        let mut pipeline = orchestrator(client.clone(), LimitsConfig::default());
        let submission = Submission::new(
            PatientCase::new(45, Gender::Male, "dor torácica", "   "),
            AnalysisTier::Full,
        );

        let err = pipeline
            .run(&submission, &credential(), |_| true)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::Validation));
        assert_eq!(err.validation_errors()[0].field, "symptoms");
        assert_eq!(client.calls(), 0);
        assert_eq!(pipeline.phase(), Phase::Idle);
        assert_eq!(
            pipeline.trace(),
            &[Phase::Idle, Phase::Validating, Phase::Rejected, Phase::Idle]
        );
    }

    #[tokio::test]
    async fn test_failure_surfaces_kind_and_resets() {
        let client = MockClient::failing(ErrorKind::RateLimit);
        let mut pipeline = orchestrator(client.clone(), LimitsConfig::default());

        let err = pipeline
            .run(&chest_pain(), &credential(), |_| true)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::RateLimit));
        assert!(err.remediation_hint().is_some());
        assert_eq!(client.calls(), 1);
        assert_eq!(pipeline.phase(), Phase::Idle);
        assert!(pipeline.trace().ends_with(&[Phase::Calling, Phase::Failed, Phase::Idle]));

        // A fresh submission is accepted afterwards
        assert_eq!(pipeline.submit(&chest_pain()).unwrap(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_usage_advisory() {
        let client = MockClient::replying("resposta longa o bastante");
        let mut pipeline = orchestrator(client, limits(1500, 5));

        let SubmissionOutcome::Completed(report) = pipeline
            .run(&chest_pain(), &credential(), |_| true)
            .await
            .unwrap()
        else {
            panic!("expected completion");
        };

        let advisory = report.advisory.unwrap();
        assert_eq!(advisory.threshold, 5);
        assert_eq!(advisory.total_tokens, report.result.total_tokens());
    }

    #[tokio::test]
    async fn test_attachments_become_image_notes() {
        let client = MockClient::replying("ok");
        let mut pipeline = orchestrator(client.clone(), LimitsConfig::default());
        let submission = chest_pain().with_attachments(vec![
            Attachment::new("chest-xray-01.jpg", "image/jpeg"),
            Attachment::new("notes.txt", "text/plain"),
        ]);

        pipeline.submit(&submission).unwrap();
        let pending = pipeline.pending().unwrap();
        assert!(pending.prompt.text.contains("Radiografia de tórax"));
        assert!(!pending.prompt.text.contains(imaging::UNSUPPORTED_DESCRIPTION));
        assert_eq!(pending.prompt.response_token_budget, 400);

        pipeline.proceed(&credential()).await.unwrap();
        assert_eq!(*client.last_budget.lock().unwrap(), Some(400));
    }

    #[test]
    fn test_submit_requires_idle() {
        let client = MockClient::replying("ok");
        let mut pipeline = orchestrator(client, LimitsConfig::default());

        pipeline.submit(&chest_pain()).unwrap();
        assert!(matches!(
            pipeline.submit(&chest_pain()),
            Err(DxError::InvalidState(_))
        ));

        pipeline.abandon().unwrap();
        assert_eq!(pipeline.phase(), Phase::Idle);
        assert!(pipeline.confirm().is_err());
    }
}
