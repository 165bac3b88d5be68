//! Prompt Builder System
//!
//! Standardized prompt construction for completion requests.
//!
//! - [`PromptBuilder`] renders an ordered list of [`PromptSection`]s.
//! - [`clinical`] holds the tiered patient-case template on top of it.

pub mod clinical;

pub use clinical::{BuiltPrompt, Instruction, SectionKind, build_prompt};

use std::borrow::Cow;

/// Prompt section types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSection {
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Numbered list with a header
    Numbered { header: String, items: Vec<String> },
    /// Key/value lines, in insertion order
    Fields {
        header: String,
        fields: Vec<(String, String)>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add text section
    pub fn text(self, content: &str) -> Self {
        self.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        })
    }

    /// Add text section with header
    pub fn section(self, header: &str, content: &str) -> Self {
        self.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        })
    }

    /// Add numbered list section
    pub fn numbered(self, header: &str, items: Vec<String>) -> Self {
        self.push(PromptSection::Numbered {
            header: header.to_string(),
            items,
        })
    }

    pub fn push(mut self, section: PromptSection) -> Self {
        self.sections.push(section);
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Numbered { header, items } => {
                    prompt.push_str(&format!("# {}\n", header));
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Fields { header, fields } => {
                    prompt.push_str(&format!("# {}\n", header));
                    for (key, value) in fields {
                        prompt.push_str(&format!("{}: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Trim and cut `text` to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(trimmed[..byte_idx].trim_end().to_string()),
        None => Cow::Borrowed(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .text("Analise o caso.")
            .section("Sintomas", "febre")
            .numbered("Forneça", vec!["A".to_string(), "B".to_string()])
            .build();

        assert!(prompt.starts_with("Analise o caso."));
        assert!(prompt.contains("# Sintomas\nfebre"));
        assert!(prompt.contains("1. A\n2. B"));
        assert!(!prompt.ends_with('\n'));
    }

    #[test]
    fn test_fields_keep_order() {
        let prompt = PromptBuilder::new()
            .push(PromptSection::Fields {
                header: "Paciente".to_string(),
                fields: vec![
                    ("Idade".to_string(), "45 anos".to_string()),
                    ("Gênero".to_string(), "Outro".to_string()),
                ],
            })
            .build();

        assert_eq!(prompt, "# Paciente\nIdade: 45 anos\nGênero: Outro");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("  abc  ", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        // multi-byte characters are never split
        assert_eq!(truncate_chars("açúcar", 3), "açú");
        assert!(matches!(truncate_chars("short", 10), Cow::Borrowed(_)));
    }
}
