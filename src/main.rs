use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dxassist::cli::CommandContext;
use dxassist::cli::commands::analyze::AnalyzeOptions;
use dxassist::cli::ui::Output;
use dxassist::config::ConfigFormat;
use dxassist::imaging::Attachment;
use dxassist::types::{AnalysisTier, DxError};

#[derive(Parser)]
#[command(name = "dxassist")]
#[command(
    version,
    about = "Differential-diagnosis prompt assistant for chat-completion providers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Extra config file (TOML)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a patient case with the configured provider
    Analyze {
        #[arg(long, help = "Patient case file (.toml or .json)")]
        case: PathBuf,
        #[arg(
            long,
            short,
            default_value = "simplified",
            help = "Analysis tier: simplified, intermediate, full"
        )]
        tier: AnalysisTier,
        #[arg(long = "attach", help = "Attachment as <file_name>:<mime_type>[:<bytes>]")]
        attachments: Vec<Attachment>,
        #[arg(long, help = "Completion provider (openai, deepseek)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use (discovered when unset)")]
        model: Option<String>,
        #[arg(long, short, help = "Send prompts above the token ceiling without asking")]
        yes: bool,
    },

    /// Build and print the prompt without sending it
    Prompt {
        #[arg(long, help = "Patient case file (.toml or .json)")]
        case: PathBuf,
        #[arg(
            long,
            short,
            default_value = "simplified",
            help = "Analysis tier: simplified, intermediate, full"
        )]
        tier: AnalysisTier,
        #[arg(long = "attach", help = "Attachment as <file_name>:<mime_type>[:<bytes>]")]
        attachments: Vec<Attachment>,
    },

    /// Show the description an attachment contributes to the prompt
    Describe {
        file_name: String,
        mime_type: String,
    },

    /// List models visible to the API key
    Models {
        #[arg(long, help = "Completion provider (openai, deepseek)")]
        provider: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, default_value = "toml", help = "Output format: toml, json")]
        format: ConfigFormat,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdxassist encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let output = Output::new();
            output.error(&format!("Error: {}", e));
            if let Some(hint) = e.downcast_ref::<DxError>().and_then(DxError::remediation_hint) {
                output.hint(hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            case,
            tier,
            attachments,
            provider,
            model,
            yes,
        } => {
            let ctx = CommandContext::load(config_path)?.with_overrides(provider, model)?;
            dxassist::cli::commands::analyze::run(
                &ctx,
                AnalyzeOptions {
                    case,
                    tier,
                    attachments,
                    yes,
                },
            )?;
        }
        Commands::Prompt {
            case,
            tier,
            attachments,
        } => {
            let ctx = CommandContext::load(config_path)?;
            dxassist::cli::commands::prompt::run(&ctx, &case, tier, attachments)?;
        }
        Commands::Describe {
            file_name,
            mime_type,
        } => {
            dxassist::cli::commands::describe::run(&file_name, &mime_type)?;
        }
        Commands::Models { provider } => {
            let ctx = CommandContext::load(config_path)?.with_overrides(provider, None)?;
            dxassist::cli::commands::models::run(&ctx)?;
        }
        Commands::Config { action } => {
            let ctx = CommandContext::load(config_path)?;
            match action {
                ConfigAction::Show { format } => {
                    dxassist::cli::commands::config::show(&ctx, format)?;
                }
                ConfigAction::Path => {
                    dxassist::cli::commands::config::path(&ctx)?;
                }
            }
        }
    }

    Ok(())
}
