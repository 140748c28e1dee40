//! PDF/A conversion and conformance reporting

use crate::artifact::OutputArtifact;
use crate::document::SourceDocument;
use crate::engine::{Metadata, PdfALevel, PdfEngine};
use crate::error::Result;
use crate::naming::{pdfa_name, sanitize_file_name, OutputNamer};
use crate::workspace::Workspace;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Options for PDF/A conversion
#[derive(Debug, Clone, Default)]
pub struct PdfAOptions {
    pub level: PdfALevel,
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding of a conformance check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
}

impl ValidationIssue {
    fn new(code: &str, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity,
            page_number: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfAValidationReport {
    pub is_compliant: bool,
    /// Declared level, e.g. `PDF/A-2b`
    pub conformance_level: Option<String>,
    pub pdfa_part: Option<u8>,
    /// Declared conformance letter
    pub pdfa_level: Option<String>,
    pub error_count: usize,
    pub warning_count: usize,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub summary: String,
}

/// Convert `source` to PDF/A and write the result.
///
/// Nothing is written when the engine fails.
pub fn convert_to_pdfa<E: PdfEngine>(
    source: &SourceDocument<'_, E>,
    workspace: &Workspace,
    original_name: &str,
    original_size: u64,
    options: &PdfAOptions,
) -> Result<OutputArtifact> {
    let bytes = source
        .engine()
        .convert_to_pdfa(source.handle(), options.level)?;

    let name = match options.output_name.as_deref() {
        Some(name) if sanitize_file_name(name).is_some() => {
            OutputNamer::new(Some(name), "pdfa").pdf()
        }
        _ => pdfa_name(Some(original_name)),
    };

    let artifact = workspace
        .write_output(&name, &bytes)?
        .with_original_size(original_size);
    info!(
        "Converted {} to {} as {}",
        source.label(),
        options.level,
        artifact.file_name
    );
    Ok(artifact)
}

/// Report the conformance a document declares.
///
/// When `requested` is given, a declaration of any other level makes the
/// document non-compliant.
pub fn validate_pdfa<E: PdfEngine>(
    source: &SourceDocument<'_, E>,
    requested: Option<PdfALevel>,
) -> Result<PdfAValidationReport> {
    let metadata = source.engine().read_metadata(source.handle())?;
    let report = build_report(&metadata, requested);
    info!(
        "PDF/A check of {}: compliant={}, {} errors, {} warnings",
        source.label(),
        report.is_compliant,
        report.error_count,
        report.warning_count
    );
    Ok(report)
}

fn build_report(metadata: &Metadata, requested: Option<PdfALevel>) -> PdfAValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match (metadata.pdfa, requested) {
        (None, _) => errors.push(ValidationIssue::new(
            "NO_PDFA_IDENTIFICATION",
            "Document metadata does not declare PDF/A conformance",
            Severity::Error,
        )),
        (Some(declared), Some(level))
            if declared.part != level.part() || declared.conformance != Some(level.conformance()) =>
        {
            errors.push(ValidationIssue::new(
                "CONFORMANCE_MISMATCH",
                format!("Document declares {declared} but {level} was requested"),
                Severity::Error,
            ))
        }
        _ => {}
    }

    if metadata.encrypted {
        warnings.push(ValidationIssue::new(
            "ENCRYPTED",
            "PDF/A does not allow encryption",
            Severity::Warning,
        ));
    }
    if metadata.pdfa.is_some_and(|d| d.conformance == Some('a')) && !metadata.tagged {
        warnings.push(ValidationIssue::new(
            "NOT_TAGGED",
            "Level A conformance requires a tagged document",
            Severity::Warning,
        ));
    }

    let is_compliant = errors.is_empty();
    let summary = match (&metadata.pdfa, is_compliant) {
        (Some(declared), true) => format!("Document declares {declared} conformance"),
        (Some(declared), false) => {
            format!("Document declares {declared} but is not compliant with the requested level")
        }
        (None, _) => "Document is not PDF/A compliant".to_string(),
    };
    if !is_compliant {
        warn!("{}", summary);
    }

    PdfAValidationReport {
        is_compliant,
        conformance_level: metadata.pdfa.map(|d| d.to_string()),
        pdfa_part: metadata.pdfa.map(|d| d.part),
        pdfa_level: metadata
            .pdfa
            .and_then(|d| d.conformance)
            .map(|c| c.to_string()),
        error_count: errors.len(),
        warning_count: warnings.len(),
        errors,
        warnings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PdfAConformance;

    fn declaring(part: u8, conformance: char) -> Metadata {
        Metadata {
            pdfa: Some(PdfAConformance {
                part,
                conformance: Some(conformance),
            }),
            ..Metadata::default()
        }
    }

    #[test]
    fn test_declared_conformance_is_compliant() {
        let report = build_report(&declaring(2, 'b'), None);
        assert!(report.is_compliant);
        assert_eq!(report.conformance_level.as_deref(), Some("PDF/A-2b"));
        assert_eq!(report.pdfa_part, Some(2));
        assert_eq!(report.pdfa_level.as_deref(), Some("b"));
        assert_eq!(report.error_count, 0);
    }

    #[test]
    fn test_requested_level_mismatch() {
        let report = build_report(&declaring(1, 'b'), Some(PdfALevel::A2b));
        assert!(!report.is_compliant);
        assert_eq!(report.errors[0].code, "CONFORMANCE_MISMATCH");
        assert_eq!(report.error_count, 1);
    }

    #[test]
    fn test_missing_identification() {
        let report = build_report(&Metadata::default(), None);
        assert!(!report.is_compliant);
        assert_eq!(report.conformance_level, None);
        assert_eq!(report.errors[0].code, "NO_PDFA_IDENTIFICATION");
        assert_eq!(report.summary, "Document is not PDF/A compliant");
    }

    #[test]
    fn test_warnings_do_not_break_compliance() {
        let mut metadata = declaring(2, 'a');
        metadata.encrypted = true;
        let report = build_report(&metadata, Some(PdfALevel::A2a));
        assert!(report.is_compliant);
        assert_eq!(report.warning_count, 2);
    }
}
