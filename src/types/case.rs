//! Patient Case
//!
//! The clinical input of one submission. Built fresh per request and never
//! mutated after it is handed to the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{DxError, Result, ValidationError, ValidationErrorKind};

/// Oldest age the intake form accepts
pub const MAX_AGE: u16 = 120;

/// Patient gender as offered by the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Label used inside the clinical prompt
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Masculino",
            Gender::Female => "Feminino",
            Gender::Other => "Outro",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "masculino" => Ok(Gender::Male),
            "female" | "f" | "feminino" => Ok(Gender::Female),
            "other" | "outro" => Ok(Gender::Other),
            _ => Err(format!(
                "Unknown gender: {}. Valid values: male, female, other",
                s
            )),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => "male".to_string(),
            Gender::Female => "female".to_string(),
            Gender::Other => "other".to_string(),
        }
    }
}

/// Clinical data collected for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientCase {
    pub age: u16,
    pub gender: Gender,
    #[serde(default)]
    pub comorbidities: Option<String>,
    pub chief_complaint: String,
    pub symptoms: String,
    #[serde(default)]
    pub vitals: Option<String>,
    #[serde(default)]
    pub physical_exam: Option<String>,
    #[serde(default)]
    pub labs_imaging: Option<String>,
    /// Ordered textual descriptions of attached images
    #[serde(default)]
    pub image_notes: Vec<String>,
}

impl PatientCase {
    pub fn new(
        age: u16,
        gender: Gender,
        chief_complaint: impl Into<String>,
        symptoms: impl Into<String>,
    ) -> Self {
        Self {
            age,
            gender,
            comorbidities: None,
            chief_complaint: chief_complaint.into(),
            symptoms: symptoms.into(),
            vitals: None,
            physical_exam: None,
            labs_imaging: None,
            image_notes: Vec::new(),
        }
    }

    pub fn with_comorbidities(mut self, value: impl Into<String>) -> Self {
        self.comorbidities = Some(value.into());
        self
    }

    pub fn with_vitals(mut self, value: impl Into<String>) -> Self {
        self.vitals = Some(value.into());
        self
    }

    pub fn with_physical_exam(mut self, value: impl Into<String>) -> Self {
        self.physical_exam = Some(value.into());
        self
    }

    pub fn with_labs_imaging(mut self, value: impl Into<String>) -> Self {
        self.labs_imaging = Some(value.into());
        self
    }

    pub fn with_image_notes(mut self, notes: Vec<String>) -> Self {
        self.image_notes = notes;
        self
    }

    /// Check required fields and ranges, collecting every field-level failure
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.chief_complaint.trim().is_empty() {
            errors.push(ValidationError::missing("chief_complaint"));
        }
        if self.symptoms.trim().is_empty() {
            errors.push(ValidationError::missing("symptoms"));
        }
        if self.age > MAX_AGE {
            errors.push(ValidationError::new(
                ValidationErrorKind::Range,
                "age",
                format!("must be between 0 and {}, got {}", MAX_AGE, self.age),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DxError::Validation(errors))
        }
    }

    /// Whether any image note carries text
    pub fn has_image_notes(&self) -> bool {
        self.image_notes.iter().any(|n| !n.trim().is_empty())
    }
}

/// Treat blank optional text as absent
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_gender_parsing() {
        assert_eq!("Outro".parse::<Gender>().unwrap(), Gender::Other);
        assert_eq!("masculino".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("FEMALE".parse::<Gender>().unwrap(), Gender::Female);
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn test_gender_label() {
        assert_eq!(Gender::Male.label(), "Masculino");
        assert_eq!(Gender::Other.to_string(), "Outro");
    }

    #[test]
    fn test_validate_accepts_minimal_case() {
        let case = PatientCase::new(45, Gender::Other, "dor torácica", "dispneia, sudorese");
        assert!(case.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_fields() {
        let case = PatientCase::new(130, Gender::Male, "  ", "");
        let err = case.validate().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));

        let fields: Vec<&str> = err
            .validation_errors()
            .iter()
            .map(|e| e.field.as_str())
            .collect();
        assert_eq!(fields, vec!["chief_complaint", "symptoms", "age"]);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let case: PatientCase = toml::from_str(
            r#"
age = 45
gender = "Outro"
chief_complaint = "dor torácica"
symptoms = "dispneia, sudorese"
vitals = "PA 150x90"
"#,
        )
        .unwrap();
        assert_eq!(case.gender, Gender::Other);
        assert_eq!(case.vitals.as_deref(), Some("PA 150x90"));
        assert!(case.image_notes.is_empty());
        assert!(case.comorbidities.is_none());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(&Some("  ".to_string())), None);
        assert_eq!(non_blank(&Some(" HAS ".to_string())), Some("HAS"));
        assert_eq!(non_blank(&None), None);
    }
}
