//! Models Command
//!
//! Lists the models the API key can see and the one discovery would pick.

use tokio::runtime::Runtime;

use crate::ai::provider::{create_client, select_model};
use crate::cli::ui::Output;
use crate::cli::{CommandContext, read_credential};
use crate::types::{DxError, Result};

pub fn run(ctx: &CommandContext) -> Result<()> {
    let output = Output::new();
    let client = create_client(&ctx.provider_config())?;
    let credential = read_credential(client.credential_env_var())?;

    let rt = Runtime::new()?;
    let mut models = rt.block_on(client.list_models(&credential))?;
    models.sort();

    output.header(&format!("Models available on {}", client.name()));
    for model in &models {
        println!("  {}", model);
    }

    match &ctx.config.llm.model {
        Some(model) => output.info(&format!("Configured model: {}", model)),
        None => {
            let selected = select_model(&models, client.model_preferences()).ok_or_else(|| {
                DxError::Config(format!(
                    "None of the preferred models ({}) is available",
                    client.model_preferences().join(", ")
                ))
            })?;
            output.success(&format!("Would use: {}", selected));
        }
    }
    Ok(())
}
