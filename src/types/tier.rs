//! Analysis Tier
//!
//! A tier bundles field ceilings, included sections and the response budget.
//! Detail only grows from Simplified to Full.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::tier as limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTier {
    /// Token-saving analysis
    #[default]
    Simplified,
    Intermediate,
    /// Most detail, most tokens
    Full,
}

impl AnalysisTier {
    pub const ALL: [AnalysisTier; 3] = [
        AnalysisTier::Simplified,
        AnalysisTier::Intermediate,
        AnalysisTier::Full,
    ];

    /// Character ceiling for chief complaint and symptoms
    pub fn narrative_char_limit(self) -> usize {
        match self {
            AnalysisTier::Simplified => limits::SIMPLIFIED_NARRATIVE_CHARS,
            AnalysisTier::Intermediate => limits::INTERMEDIATE_NARRATIVE_CHARS,
            AnalysisTier::Full => limits::FULL_NARRATIVE_CHARS,
        }
    }

    /// Character ceiling for optional detail fields
    pub fn detail_char_limit(self) -> usize {
        limits::DETAIL_FIELD_CHARS
    }

    /// Whether vitals, physical exam and labs are rendered
    pub fn includes_clinical_details(self) -> bool {
        !matches!(self, AnalysisTier::Simplified)
    }

    /// Response budget before the image bonus
    pub fn base_response_tokens(self) -> u32 {
        match self {
            AnalysisTier::Simplified => limits::SIMPLIFIED_RESPONSE_TOKENS,
            AnalysisTier::Intermediate => limits::INTERMEDIATE_RESPONSE_TOKENS,
            AnalysisTier::Full => limits::FULL_RESPONSE_TOKENS,
        }
    }

    /// Response budget, including the image bonus when notes are present
    pub fn response_token_budget(self, has_images: bool) -> u32 {
        let base = self.base_response_tokens();
        if has_images {
            base + limits::IMAGE_RESPONSE_BONUS
        } else {
            base
        }
    }
}

impl fmt::Display for AnalysisTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisTier::Simplified => write!(f, "simplified"),
            AnalysisTier::Intermediate => write!(f, "intermediate"),
            AnalysisTier::Full => write!(f, "full"),
        }
    }
}

impl FromStr for AnalysisTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simplified" | "simple" | "simplificada" => Ok(AnalysisTier::Simplified),
            "intermediate" | "intermediaria" | "intermediária" => Ok(AnalysisTier::Intermediate),
            "full" | "complete" | "completa" => Ok(AnalysisTier::Full),
            _ => Err(format!(
                "Unknown analysis tier: {}. Valid values: simplified, intermediate, full",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parsing() {
        assert_eq!("full".parse::<AnalysisTier>().unwrap(), AnalysisTier::Full);
        assert_eq!(
            "Simplificada".parse::<AnalysisTier>().unwrap(),
            AnalysisTier::Simplified
        );
        assert!("maximal".parse::<AnalysisTier>().is_err());
        assert_eq!(AnalysisTier::Intermediate.to_string(), "intermediate");
    }

    #[test]
    fn test_response_budgets() {
        assert_eq!(AnalysisTier::Simplified.response_token_budget(false), 300);
        assert_eq!(AnalysisTier::Simplified.response_token_budget(true), 400);
        assert_eq!(AnalysisTier::Intermediate.response_token_budget(false), 500);
        assert_eq!(AnalysisTier::Full.response_token_budget(true), 900);
    }

    #[test]
    fn test_ceilings_grow_with_tier() {
        let limits: Vec<usize> = AnalysisTier::ALL
            .iter()
            .map(|t| t.narrative_char_limit())
            .collect();
        assert_eq!(limits, vec![300, 500, 1000]);
        assert!(AnalysisTier::ALL.iter().all(|t| t.detail_char_limit() == 200));
        assert!(!AnalysisTier::Simplified.includes_clinical_details());
        assert!(AnalysisTier::Full.includes_clinical_details());
    }
}
