//! Config Command
//!
//! Usage:
//!   dxassist config show [-f json]
//!   dxassist config path

use crate::cli::CommandContext;
use crate::cli::ui::Output;
use crate::config::{ConfigFormat, ConfigLoader};
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(ctx: &CommandContext, format: ConfigFormat) -> Result<()> {
    println!("{}", ConfigLoader::render(&ctx.config, format)?);
    Ok(())
}

/// Show configuration file locations
pub fn path(ctx: &CommandContext) -> Result<()> {
    let output = Output::new();
    output.header("Configuration paths");

    match ConfigLoader::global_config_path() {
        Some(global) => {
            let exists = if global.exists() { "✓" } else { "✗" };
            output.field("Global", format!("{} {}", exists, global.display()));
        }
        None => output.field("Global", "(not available)"),
    }

    if let Some(explicit) = &ctx.config_path {
        output.field("--config", explicit.display());
    }
    output.field("Environment", "DXASSIST_<SECTION>__<KEY>");
    Ok(())
}
