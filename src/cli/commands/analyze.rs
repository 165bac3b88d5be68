//! Analyze Command
//!
//! Runs one submission end to end: validation, prompt, estimate, optional
//! over-budget confirmation, one completion request, token report.
//!
//! Usage:
//!   dxassist analyze --case case.toml [--tier full] [--attach chest.jpg:image/jpeg]

use std::path::PathBuf;

use console::{Term, style};
use tokio::runtime::Runtime;
use tracing::info;

use crate::ai::provider::{create_client, discover_client};
use crate::cli::ui::Output;
use crate::cli::{CommandContext, load_submission, read_credential};
use crate::imaging::Attachment;
use crate::pipeline::{BudgetWarning, CompletionReport, Orchestrator, SubmissionOutcome};
use crate::types::{AnalysisTier, Result};

/// Analyze run options
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub case: PathBuf,
    pub tier: AnalysisTier,
    pub attachments: Vec<Attachment>,
    /// Send over-ceiling prompts without asking
    pub yes: bool,
}

pub fn run(ctx: &CommandContext, options: AnalyzeOptions) -> Result<()> {
    let output = Output::new();
    let yes = options.yes;
    let submission = load_submission(&options.case, options.tier, options.attachments)?;

    // Validate before asking for a key
    submission.described_case().validate()?;

    let provider_config = ctx.provider_config();
    let env_var = create_client(&provider_config)?.credential_env_var().to_string();
    let credential = read_credential(&env_var)?;

    let rt = Runtime::new()?;
    let result = rt.block_on(async {
        let client = discover_client(&provider_config, &credential).await?;
        info!("Using provider {} ({})", client.name(), client.model());

        let mut pipeline = Orchestrator::new(client, ctx.config.limits.clone())
            .with_temperature(ctx.config.llm.temperature);
        pipeline
            .run(&submission, &credential, |warning| {
                yes || confirm_over_budget(warning)
            })
            .await
    });

    match result? {
        SubmissionOutcome::Completed(report) => print_report(&output, &report),
        SubmissionOutcome::Declined(warning) => output.info(&format!(
            "Not sent. Prompt estimate ~{} tokens stays above the ceiling of {}.",
            warning.estimated_prompt_tokens, warning.ceiling
        )),
    }
    Ok(())
}

/// Ask on the terminal whether to send an over-ceiling prompt
fn confirm_over_budget(warning: &BudgetWarning) -> bool {
    let output = Output::new();
    output.warning(&format!(
        "Prompt estimate ~{} tokens exceeds the ceiling of {} ({} tier).",
        warning.estimated_prompt_tokens, warning.ceiling, warning.tier
    ));
    if warning.tier != AnalysisTier::Simplified {
        output.info("The simplified tier sends a shorter prompt.");
    }

    let term = Term::stderr();
    if !term.is_term() {
        output.info("Not a terminal; pass --yes to send anyway.");
        return false;
    }
    if term.write_str("Send anyway? [y/N] ").is_err() {
        return false;
    }
    term.read_line()
        .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "sim"))
        .unwrap_or(false)
}

fn print_report(output: &Output, report: &CompletionReport) {
    output.header("Análise");
    println!("{}", report.result.text.trim());

    output.section("Token usage (estimated)");
    output.field("Prompt", report.result.estimated_prompt_tokens);
    output.field("Completion", report.result.estimated_completion_tokens);
    output.field("Total", style(report.result.total_tokens()).bold());
    output.field("Provider", format!("{} ({})", report.provider, report.model));
    output.field("Tier", report.tier);
    output.field(
        "Elapsed",
        format!(
            "{:.1}s",
            (report.completed_at - report.submitted_at).num_milliseconds() as f64 / 1000.0
        ),
    );
    output.field("Submission", report.id);

    if let Some(advisory) = report.advisory {
        output.warning(&format!(
            "High usage: ~{} tokens exceeds the advisory threshold of {}. \
             The simplified tier spends fewer tokens.",
            advisory.total_tokens, advisory.threshold
        ));
    }

    output.info(
        "Estimates are approximate. This output supports, never replaces, clinical judgement.",
    );
}
