//! Prompt Command
//!
//! Dry run: builds the prompt for a case and reports its estimate against the
//! configured ceiling. Never contacts a provider.

use crate::ai::prompt::build_prompt;
use crate::ai::tokenizer::TokenCounter;
use crate::cli::ui::Output;
use crate::cli::{CommandContext, load_submission};
use crate::imaging::Attachment;
use crate::types::{AnalysisTier, Result};
use std::path::Path;

pub fn run(
    ctx: &CommandContext,
    case_path: &Path,
    tier: AnalysisTier,
    attachments: Vec<Attachment>,
) -> Result<()> {
    let output = Output::new();
    let submission = load_submission(case_path, tier, attachments)?;
    let built = build_prompt(&submission.described_case(), tier)?;
    let estimate = TokenCounter::default().count_u32(&built.text);
    let limits = &ctx.config.limits;

    println!("{}", built.text);

    output.section("Estimate");
    output.field("Tier", tier);
    output.field("Prompt tokens", format!("~{}", estimate));
    output.field("Response budget", built.response_token_budget);
    output.field("Ceiling", limits.prompt_token_ceiling);

    if limits.is_gated(tier) && estimate > limits.prompt_token_ceiling {
        output.warning("This prompt exceeds the ceiling and would need confirmation");
    }
    Ok(())
}
