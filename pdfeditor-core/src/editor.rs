//! Request-level entry points
//!
//! [`PdfEditor`] takes uploads as they arrive from a caller, stages them in
//! the workspace, runs one operation and removes the staged copies again on
//! every exit path.

use crate::artifact::OutputArtifact;
use crate::document::SourceDocument;
use crate::engine::{CompressionProfile, ImageFormat, PdfALevel, PdfEngine};
use crate::error::{EditorError, Result};
use crate::operations::compress::validate_image_quality;
use crate::operations::convert::DEFAULT_DPI;
use crate::operations::merge::ensure_enough_inputs;
use crate::operations::{
    self, CompressOptions, ConvertOptions, DocumentInfo, ExtractionReport, MergeInput,
    MergeOptions, PdfAOptions, PdfAValidationReport, SplitMode, SplitOptions,
};
use crate::workspace::Workspace;
use std::sync::Arc;
use tracing::info;

/// An uploaded document
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn require_content(&self, operation: &'static str) -> Result<()> {
        if self.bytes.is_empty() {
            Err(EditorError::EmptyUpload(operation))
        } else {
            Ok(())
        }
    }
}

/// Split parameters as received from a caller
#[derive(Debug, Clone, Default)]
pub struct SplitRequest {
    pub mode: String,
    pub points: Vec<String>,
    pub output_base: Option<String>,
}

/// Conversion parameters as received from a caller
#[derive(Debug, Clone, Default)]
pub struct ConvertRequest {
    pub image_format: Option<String>,
    pub dpi: Option<u32>,
    pub pages: Option<String>,
    pub output_base: Option<String>,
}

/// Compression parameters as received from a caller
#[derive(Debug, Clone, Default)]
pub struct CompressRequest {
    pub profile: Option<String>,
    pub image_quality: Option<u8>,
    pub output_file_name: Option<String>,
}

/// PDF/A conversion parameters as received from a caller
#[derive(Debug, Clone, Default)]
pub struct PdfARequest {
    pub conformance_level: Option<String>,
    pub output_file_name: Option<String>,
}

fn parse_level(level: Option<&str>) -> Result<Option<PdfALevel>> {
    match level.map(str::trim) {
        Some(level) if !level.is_empty() => level.parse().map(Some),
        _ => Ok(None),
    }
}

/// Document editing service over one engine and one workspace
pub struct PdfEditor<E: PdfEngine> {
    engine: Arc<E>,
    workspace: Workspace,
}

impl<E: PdfEngine> PdfEditor<E> {
    pub fn new(engine: Arc<E>, workspace: Workspace) -> Self {
        Self { engine, workspace }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Stage one upload, open it and run `work` on it.
    fn with_source<T>(
        &self,
        upload: &Upload,
        operation: &'static str,
        work: impl FnOnce(&SourceDocument<'_, E>) -> Result<T>,
    ) -> Result<T> {
        upload.require_content(operation)?;
        self.workspace.scoped(|scope| {
            let path = scope.stage(&upload.bytes, &upload.file_name)?;
            let source = SourceDocument::open(self.engine.as_ref(), &path)?;
            work(&source)
        })
    }

    /// Concatenate all uploads, in order, into one document.
    pub fn merge(&self, uploads: &[Upload], output_file_name: Option<&str>) -> Result<OutputArtifact> {
        ensure_enough_inputs(uploads.len())?;
        for upload in uploads {
            upload.require_content("merging")?;
        }
        info!("Merge requested for {} files", uploads.len());

        self.workspace.scoped(|scope| {
            let mut inputs = Vec::with_capacity(uploads.len());
            for upload in uploads {
                let path = scope.stage(&upload.bytes, &upload.file_name)?;
                inputs.push(MergeInput::new(path, upload.file_name.clone()));
            }
            operations::merge_pdfs(
                self.engine.as_ref(),
                &self.workspace,
                inputs,
                MergeOptions {
                    output_name: output_file_name.map(str::to_string),
                },
            )
        })
    }

    /// Split an upload by ranges or boundary pages.
    pub fn split(&self, upload: &Upload, request: &SplitRequest) -> Result<Vec<OutputArtifact>> {
        let mode: SplitMode = request.mode.parse()?;
        info!(
            "Split requested for {} by {} {:?}",
            upload.file_name, mode, request.points
        );

        let options = SplitOptions {
            mode,
            points: request.points.clone(),
            base_name: request.output_base.clone(),
        };
        self.with_source(upload, "splitting", |source| {
            operations::split_pdf(source, &self.workspace, options)
        })
    }

    /// Render selected pages of an upload to images.
    pub fn convert_to_images(
        &self,
        upload: &Upload,
        request: &ConvertRequest,
    ) -> Result<Vec<OutputArtifact>> {
        let format = match request.image_format.as_deref().map(str::trim) {
            Some(format) if !format.is_empty() => format.parse()?,
            _ => ImageFormat::default(),
        };
        let options = ConvertOptions {
            format,
            dpi: request.dpi.unwrap_or(DEFAULT_DPI),
            pages: request.pages.clone(),
            base_name: request.output_base.clone(),
        };
        info!(
            "Conversion requested for {} to {} at {} dpi",
            upload.file_name, options.format, options.dpi
        );

        self.with_source(upload, "conversion", |source| {
            operations::convert_to_images(source, &self.workspace, &options)
        })
    }

    /// Reduce the size of an upload.
    pub fn compress(&self, upload: &Upload, request: &CompressRequest) -> Result<OutputArtifact> {
        let image_quality = request.image_quality.map(validate_image_quality).transpose()?;
        let options = CompressOptions {
            profile: CompressionProfile::from_request(request.profile.as_deref(), image_quality),
            output_name: request.output_file_name.clone(),
        };
        info!(
            "Compression requested for {} with {} profile",
            upload.file_name,
            options.profile.name()
        );

        self.with_source(upload, "compression", |source| {
            operations::compress_pdf(source, &self.workspace, upload.size(), &options)
        })
    }

    /// Convert an upload to PDF/A.
    pub fn convert_to_pdfa(&self, upload: &Upload, request: &PdfARequest) -> Result<OutputArtifact> {
        let options = PdfAOptions {
            level: parse_level(request.conformance_level.as_deref())?.unwrap_or_default(),
            output_name: request.output_file_name.clone(),
        };
        info!(
            "PDF/A conversion requested for {} to {}",
            upload.file_name, options.level
        );

        self.with_source(upload, "PDF/A conversion", |source| {
            operations::convert_to_pdfa(
                source,
                &self.workspace,
                &upload.file_name,
                upload.size(),
                &options,
            )
        })
    }

    /// Report the PDF/A conformance an upload declares.
    pub fn validate_pdfa(
        &self,
        upload: &Upload,
        conformance_level: Option<&str>,
    ) -> Result<PdfAValidationReport> {
        let requested = parse_level(conformance_level)?;
        self.with_source(upload, "PDF/A validation", |source| {
            operations::validate_pdfa(source, requested)
        })
    }

    /// Extract the text of selected pages.
    pub fn extract_data(&self, upload: &Upload, pages: Option<&str>) -> Result<ExtractionReport> {
        self.with_source(upload, "extraction", |source| {
            operations::extract_text(source, pages)
        })
    }

    /// Read document information.
    pub fn read_metadata(&self, upload: &Upload) -> Result<DocumentInfo> {
        self.with_source(upload, "metadata", |source| {
            operations::read_info(source, upload.size())
        })
    }
}
