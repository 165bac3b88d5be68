//! Attachment Descriptions
//!
//! Maps an uploaded file's name and declared type to a canned clinical
//! description. No file content is inspected: this is a fixed keyword table,
//! not image understanding, and its output must never be read as a finding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::attachments::ACCEPTED_MIME_TYPES;

/// Fallback for accepted images whose name matches no keyword
pub const GENERIC_IMAGE_DESCRIPTION: &str = "Imagem clínica anexada sem identificação do exame; \
     requer interpretação por especialista.";

/// Description for PDF attachments
pub const PDF_DESCRIPTION: &str = "Documento PDF anexado (laudo ou resultado de exame); \
     conteúdo não interpretado automaticamente, considerar o texto do laudo original.";

/// Message for anything that is neither an accepted image nor a PDF
pub const UNSUPPORTED_DESCRIPTION: &str =
    "Formato de arquivo não suportado. Envie imagens JPEG/PNG ou documentos PDF.";

/// Ordered keyword table; the first entry with a matching keyword wins
const DESCRIPTION_TABLE: &[(&[&str], &str)] = &[
    (
        &["chest", "torax", "tórax", "thorax", "pulm", "lung"],
        "Radiografia de tórax: avaliar campos pulmonares, área cardíaca, seios costofrênicos \
         e presença de consolidações, derrame pleural ou pneumotórax.",
    ),
    (
        &["ecg", "ekg", "eletro", "electro"],
        "Eletrocardiograma: avaliar ritmo, frequência, eixo, intervalos e alterações do \
         segmento ST e da onda T.",
    ),
    (
        &["tomo", "ct-", "ct_", "-ct", "_ct"],
        "Tomografia computadorizada: avaliar densidades, massas, coleções e sinais de \
         sangramento ou isquemia na região estudada.",
    ),
    (
        &["mri", "rm-", "rm_", "resson"],
        "Ressonância magnética: avaliar sinal dos tecidos moles, lesões focais e \
         alterações estruturais na região estudada.",
    ),
    (
        &["usg", "ultra", "ecograf", "echo"],
        "Ultrassonografia: avaliar ecotextura, dimensões dos órgãos, coleções e \
         fluxo vascular quando disponível.",
    ),
    (
        &["derm", "skin", "pele", "lesao", "lesão", "rash"],
        "Lesão cutânea: avaliar morfologia, cor, bordas, distribuição e sinais de \
         infecção ou malignidade.",
    ),
    (
        &["fundo", "retina", "fundus"],
        "Fundoscopia: avaliar disco óptico, vasos retinianos, hemorragias e exsudatos.",
    ),
];

/// File metadata supplied by the upload collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn is_accepted(&self) -> bool {
        let mime = self.mime_type.trim().to_lowercase();
        ACCEPTED_MIME_TYPES.contains(&mime.as_str())
    }

    pub fn describe(&self) -> String {
        describe(&self.file_name, &self.mime_type)
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.mime_type)
    }
}

/// Parses `name:mime[:bytes]`
impl FromStr for Attachment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let name = parts.next().map(str::trim).unwrap_or_default();
        let mime = parts.next().map(str::trim).unwrap_or_default();
        if name.is_empty() || mime.is_empty() {
            return Err(format!(
                "Invalid attachment '{}'. Expected <file_name>:<mime_type>[:<bytes>]",
                s
            ));
        }

        let attachment = Attachment::new(name, mime);
        match parts.next() {
            Some(size) => size
                .trim()
                .parse::<u64>()
                .map(|bytes| attachment.with_size(bytes))
                .map_err(|_| format!("Invalid attachment size '{}' in '{}'", size, s)),
            None => Ok(attachment),
        }
    }
}

/// Describe an attachment from its name and declared MIME type
///
/// Deterministic and local. Images are matched against lower-cased file name
/// substrings; PDFs and unsupported types get fixed descriptions.
pub fn describe(file_name: &str, declared_mime_type: &str) -> String {
    let mime = declared_mime_type.trim().to_lowercase();

    match mime.as_str() {
        "image/jpeg" | "image/png" => {
            let name = file_name.to_lowercase();
            DESCRIPTION_TABLE
                .iter()
                .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
                .map(|(_, description)| *description)
                .unwrap_or(GENERIC_IMAGE_DESCRIPTION)
                .to_string()
        }
        "application/pdf" => PDF_DESCRIPTION.to_string(),
        _ => UNSUPPORTED_DESCRIPTION.to_string(),
    }
}

/// Image notes for a submission, in attachment order
///
/// Unsupported files are left out so they never reach the prompt.
pub fn describe_all(attachments: &[Attachment]) -> Vec<String> {
    attachments
        .iter()
        .filter(|a| a.is_accepted())
        .map(Attachment::describe)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chest_radiograph() {
        let description = describe("chest-xray-01.jpg", "image/jpeg");
        assert!(description.starts_with("Radiografia de tórax"));
    }

    #[test]
    fn test_pdf_and_unsupported() {
        assert_eq!(describe("report.pdf", "application/pdf"), PDF_DESCRIPTION);
        assert_eq!(describe("notes.txt", "text/plain"), UNSUPPORTED_DESCRIPTION);
        // keywords only count for accepted image types
        assert_eq!(describe("chest.gif", "image/gif"), UNSUPPORTED_DESCRIPTION);
    }

    #[test]
    fn test_unmatched_image_is_generic() {
        assert_eq!(describe("IMG_0042.png", "image/png"), GENERIC_IMAGE_DESCRIPTION);
    }

    #[test]
    fn test_first_match_wins_and_case_insensitive() {
        // contains both "chest" and "ecg"; chest comes first in the table
        let description = describe("ECG-and-CHEST.PNG", "IMAGE/PNG");
        assert!(description.starts_with("Radiografia de tórax"));

        let ecg = describe("paciente_ecg.jpg", "image/jpeg");
        assert!(ecg.starts_with("Eletrocardiograma"));
    }

    #[test]
    fn test_describe_all_skips_unsupported() {
        let attachments = vec![
            Attachment::new("lesao-braco.jpg", "image/jpeg"),
            Attachment::new("notes.txt", "text/plain"),
            Attachment::new("laudo.pdf", "application/pdf"),
        ];
        let notes = describe_all(&attachments);
        assert_eq!(notes.len(), 2);
        assert!(notes[0].starts_with("Lesão cutânea"));
        assert_eq!(notes[1], PDF_DESCRIPTION);
    }

    #[test]
    fn test_attachment_parsing() {
        let parsed: Attachment = "rx-torax.png:image/png:2048".parse().unwrap();
        assert_eq!(parsed.file_name, "rx-torax.png");
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.size_bytes, Some(2048));

        let no_size: Attachment = "laudo.pdf:application/pdf".parse().unwrap();
        assert_eq!(no_size.size_bytes, None);

        assert!("laudo.pdf".parse::<Attachment>().is_err());
        assert!("a.png:image/png:big".parse::<Attachment>().is_err());
    }
}
