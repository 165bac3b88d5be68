//! CLI Common Utilities
//!
//! Shared initialization for command handlers: configuration with CLI
//! overrides, case files, and the session credential.

use std::path::{Path, PathBuf};

use console::Term;

use crate::ai::provider::ProviderConfig;
use crate::config::{Config, ConfigLoader};
use crate::imaging::Attachment;
use crate::pipeline::Submission;
use crate::types::{AnalysisTier, ApiCredential, DxError, PatientCase, Result};

/// Command execution context
///
/// Configuration resolved from all sources, with CLI flags applied last.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    /// File passed with `--config`, if any
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            config: ConfigLoader::load(config_path)?,
            config_path: config_path.map(Path::to_path_buf),
        })
    }

    /// Apply `--provider` / `--model` overrides
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<Self> {
        if let Some(provider) = provider {
            // A model configured for another provider would not exist there
            if provider != self.config.llm.provider && model.is_none() {
                self.config.llm.model = None;
            }
            self.config.llm.provider = provider;
        }
        if let Some(model) = model {
            self.config.llm.model = Some(model);
        }
        self.config.validate()?;
        Ok(self)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        self.config.llm.provider_config()
    }
}

/// Read a patient case from a `.toml` or `.json` file
pub fn load_case(path: &Path) -> Result<PatientCase> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DxError::Config(format!("Cannot read case file {}: {}", path.display(), e))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(DxError::Config(format!(
            "Unsupported case file {}: expected .toml or .json",
            path.display()
        ))),
    }
}

/// Case file plus tier and attachments, ready for the pipeline
pub fn load_submission(
    case_path: &Path,
    tier: AnalysisTier,
    attachments: Vec<Attachment>,
) -> Result<Submission> {
    Ok(Submission::new(load_case(case_path)?, tier).with_attachments(attachments))
}

/// Credential for this session
///
/// Taken from `env_var` when set, otherwise asked for on the terminal with
/// hidden input. The value is never echoed or stored.
pub fn read_credential(env_var: &str) -> Result<ApiCredential> {
    if let Some(credential) = ApiCredential::from_env(env_var) {
        return Ok(credential);
    }

    let term = Term::stderr();
    if !term.is_term() {
        return Err(DxError::Config(format!(
            "No API key: set {} or run interactively",
            env_var
        )));
    }

    term.write_str("API key (input hidden): ")?;
    let secret = term.read_secure_line()?;
    ApiCredential::new(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;
    use std::fs;
    use tempfile::TempDir;

    fn context() -> CommandContext {
        CommandContext {
            config: Config::default(),
            config_path: None,
        }
    }

    #[test]
    fn test_load_toml_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("case.toml");
        fs::write(
            &path,
            r#"
            age = 45
            gender = "Outro"
            chief_complaint = "dor torácica"
            symptoms = "dispneia, sudorese"
            "#,
        )
        .unwrap();

        let case = load_case(&path).unwrap();
        assert_eq!(case.age, 45);
        assert_eq!(case.gender, Gender::Other);
        assert!(case.image_notes.is_empty());
    }

    #[test]
    fn test_load_json_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("case.json");
        fs::write(
            &path,
            r#"{"age": 60, "gender": "female", "chief_complaint": "cefaleia", "symptoms": "náusea", "vitals": "PA 180x110"}"#,
        )
        .unwrap();

        let case = load_case(&path).unwrap();
        assert_eq!(case.gender, Gender::Female);
        assert_eq!(case.vitals.as_deref(), Some("PA 180x110"));
    }

    #[test]
    fn test_unsupported_case_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("case.yaml");
        fs::write(&path, "age: 1").unwrap();

        assert!(matches!(load_case(&path), Err(DxError::Config(_))));
    }

    #[test]
    fn test_provider_override_drops_foreign_model() {
        let mut ctx = context();
        ctx.config.llm.model = Some("gpt-4".to_string());

        let ctx = ctx.with_overrides(Some("deepseek".to_string()), None).unwrap();
        assert_eq!(ctx.config.llm.provider, "deepseek");
        assert_eq!(ctx.config.llm.model, None);

        let ctx = ctx
            .with_overrides(None, Some("deepseek-reasoner".to_string()))
            .unwrap();
        assert_eq!(ctx.provider_config().model.as_deref(), Some("deepseek-reasoner"));
        assert!(ctx.config.limits.is_gated(AnalysisTier::Full));
    }

    #[test]
    fn test_unknown_provider_override() {
        assert!(context().with_overrides(Some("ollama".to_string()), None).is_err());
    }
}
