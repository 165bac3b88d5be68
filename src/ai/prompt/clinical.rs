//! Clinical Prompt Template
//!
//! Renders a [`PatientCase`] into a bounded prompt for the selected tier.
//!
//! Sections come from an ordered rule table: each rule pairs a predicate with a
//! renderer and is appended only when the predicate holds. The table is the
//! single place where tier gating lives.

use tracing::debug;

use super::{PromptBuilder, PromptSection, truncate_chars};
use crate::types::case::non_blank;
use crate::types::{AnalysisTier, PatientCase, Result};

/// Opening line of every prompt
const PREAMBLE: &str =
    "Analise a seguinte constelação de sintomas para um possível diagnóstico diferencial.";

/// Placeholder when no comorbidities were reported
const NO_COMORBIDITIES: &str = "Nenhuma relatada";

/// Named prompt sections, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Patient,
    ChiefComplaint,
    Symptoms,
    Vitals,
    PhysicalExam,
    LabsImaging,
    Images,
    Instructions,
}

/// Items the model is asked to provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Differentials,
    SeverityRanking,
    NextSteps,
    RedFlags,
    Management,
    ImageFindings,
}

impl Instruction {
    pub fn text(&self) -> &'static str {
        match self {
            Instruction::Differentials => {
                "Probabilidade: liste os diagnósticos diferenciais do mais provável ao menos provável, com justificativa."
            }
            Instruction::SeverityRanking => {
                "Gravidade: reorganize os diagnósticos do mais grave ao menos grave, indicando o tempo para intervenção."
            }
            Instruction::NextSteps => {
                "Próximos passos: sugira exames e procedimentos para confirmar ou descartar as principais hipóteses."
            }
            Instruction::RedFlags => {
                "Sinais de alarme: identifique os \"red flags\" que exigem atenção imediata."
            }
            Instruction::Management => {
                "Conduta: descreva a orientação terapêutica inicial para as hipóteses mais prováveis."
            }
            Instruction::ImageFindings => {
                "Imagens: relacione as descrições das imagens anexadas às hipóteses."
            }
        }
    }

    /// Instructions requested by a tier, in prompt order
    pub fn for_tier(tier: AnalysisTier) -> &'static [Instruction] {
        match tier {
            AnalysisTier::Simplified => &[Instruction::Differentials, Instruction::NextSteps],
            AnalysisTier::Intermediate => &[
                Instruction::Differentials,
                Instruction::NextSteps,
                Instruction::RedFlags,
            ],
            AnalysisTier::Full => &[
                Instruction::Differentials,
                Instruction::SeverityRanking,
                Instruction::NextSteps,
                Instruction::RedFlags,
                Instruction::Management,
            ],
        }
    }
}

/// A validated case seen through the ceilings of one tier
struct CaseView<'a> {
    case: &'a PatientCase,
    tier: AnalysisTier,
}

impl CaseView<'_> {
    fn narrative(&self, text: &str) -> String {
        truncate_chars(text, self.tier.narrative_char_limit()).into_owned()
    }

    fn detail(&self, value: &Option<String>) -> Option<String> {
        non_blank(value).map(|v| truncate_chars(v, self.tier.detail_char_limit()).into_owned())
    }

    fn image_notes(&self) -> Vec<String> {
        self.case
            .image_notes
            .iter()
            .filter(|n| !n.trim().is_empty())
            .map(|n| truncate_chars(n, self.tier.detail_char_limit()).into_owned())
            .collect()
    }

    fn instructions(&self) -> Vec<Instruction> {
        let mut items = Instruction::for_tier(self.tier).to_vec();
        if self.case.has_image_notes() {
            items.push(Instruction::ImageFindings);
        }
        items
    }
}

/// One entry of the section table
struct SectionRule {
    kind: SectionKind,
    applies: fn(&CaseView<'_>) -> bool,
    render: fn(&CaseView<'_>) -> PromptSection,
}

fn always(_: &CaseView<'_>) -> bool {
    true
}

fn detailed_with(view: &CaseView<'_>, value: &Option<String>) -> bool {
    view.tier.includes_clinical_details() && non_blank(value).is_some()
}

fn text_section(header: &str, content: String) -> PromptSection {
    PromptSection::Text {
        header: Some(header.to_string()),
        content,
    }
}

const SECTION_RULES: &[SectionRule] = &[
    SectionRule {
        kind: SectionKind::Patient,
        applies: always,
        render: |v| PromptSection::Fields {
            header: "Paciente".to_string(),
            fields: vec![
                ("Idade".to_string(), format!("{} anos", v.case.age)),
                ("Gênero".to_string(), v.case.gender.label().to_string()),
                (
                    "Comorbidades".to_string(),
                    v.detail(&v.case.comorbidities)
                        .unwrap_or_else(|| NO_COMORBIDITIES.to_string()),
                ),
            ],
        },
    },
    SectionRule {
        kind: SectionKind::ChiefComplaint,
        applies: always,
        render: |v| text_section("Queixa principal", v.narrative(&v.case.chief_complaint)),
    },
    SectionRule {
        kind: SectionKind::Symptoms,
        applies: always,
        render: |v| text_section("Sintomas associados", v.narrative(&v.case.symptoms)),
    },
    SectionRule {
        kind: SectionKind::Vitals,
        applies: |v| detailed_with(v, &v.case.vitals),
        render: |v| text_section("Sinais vitais", v.detail(&v.case.vitals).unwrap_or_default()),
    },
    SectionRule {
        kind: SectionKind::PhysicalExam,
        applies: |v| detailed_with(v, &v.case.physical_exam),
        render: |v| {
            text_section(
                "Achados no exame físico",
                v.detail(&v.case.physical_exam).unwrap_or_default(),
            )
        },
    },
    SectionRule {
        kind: SectionKind::LabsImaging,
        applies: |v| detailed_with(v, &v.case.labs_imaging),
        render: |v| {
            text_section(
                "Exames laboratoriais/imagem",
                v.detail(&v.case.labs_imaging).unwrap_or_default(),
            )
        },
    },
    SectionRule {
        kind: SectionKind::Images,
        applies: |v| v.case.has_image_notes(),
        render: |v| PromptSection::Numbered {
            header: "Descrição das imagens anexadas".to_string(),
            items: v.image_notes(),
        },
    },
    SectionRule {
        kind: SectionKind::Instructions,
        applies: always,
        render: |v| PromptSection::Numbered {
            header: "Com base nos dados clínicos, forneça".to_string(),
            items: v
                .instructions()
                .iter()
                .map(|i| i.text().to_string())
                .collect(),
        },
    },
];

/// Rendered prompt and its response budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub text: String,
    pub response_token_budget: u32,
    pub tier: AnalysisTier,
    /// Sections that made it into the prompt, in order
    pub sections: Vec<SectionKind>,
    /// Instruction items requested, in order
    pub instructions: Vec<Instruction>,
}

impl BuiltPrompt {
    pub fn includes(&self, kind: SectionKind) -> bool {
        self.sections.contains(&kind)
    }

    pub fn into_parts(self) -> (String, u32) {
        (self.text, self.response_token_budget)
    }
}

/// Build the clinical prompt for `case` at `tier`
///
/// Fails with a validation error, before any rendering, when the chief
/// complaint or symptoms are blank. Over-long fields are cut to the tier
/// ceilings rather than rejected.
pub fn build_prompt(case: &PatientCase, tier: AnalysisTier) -> Result<BuiltPrompt> {
    case.validate()?;

    let view = CaseView { case, tier };
    let mut builder = PromptBuilder::new().text(PREAMBLE);
    let mut sections = Vec::new();

    for rule in SECTION_RULES {
        if (rule.applies)(&view) {
            builder = builder.push((rule.render)(&view));
            sections.push(rule.kind);
        } else {
            debug!("Skipping prompt section {:?} for tier {}", rule.kind, tier);
        }
    }

    let response_token_budget = tier.response_token_budget(case.has_image_notes());

    Ok(BuiltPrompt {
        text: builder.build(),
        response_token_budget,
        tier,
        sections,
        instructions: view.instructions(),
    })
}
