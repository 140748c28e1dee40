//! Size reduction

use crate::artifact::OutputArtifact;
use crate::document::SourceDocument;
use crate::engine::{CompressionProfile, PdfEngine};
use crate::error::{EditorError, Result};
use crate::naming::OutputNamer;
use crate::workspace::Workspace;
use tracing::info;

/// Options for compression
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    pub profile: CompressionProfile,
    pub output_name: Option<String>,
}

/// Check an image quality percentage.
pub fn validate_image_quality(quality: u8) -> Result<u8> {
    if (1..=100).contains(&quality) {
        Ok(quality)
    } else {
        Err(EditorError::InvalidParameter {
            name: "image quality",
            reason: format!("{quality} is outside 1-100"),
        })
    }
}

/// Optimize `source` and write the result.
///
/// `original_size` is the size of the uploaded file; the artifact reports
/// it together with the achieved ratio.
pub fn compress_pdf<E: PdfEngine>(
    source: &SourceDocument<'_, E>,
    workspace: &Workspace,
    original_size: u64,
    options: &CompressOptions,
) -> Result<OutputArtifact> {
    let bytes = source
        .engine()
        .optimize(source.handle(), &options.profile)?;

    let name = OutputNamer::new(options.output_name.as_deref(), "compressed").pdf();
    let artifact = workspace
        .write_output(&name, &bytes)?
        .with_original_size(original_size);

    info!(
        "Compressed {} with {} profile: {} -> {} bytes ({:.1}%)",
        source.label(),
        options.profile.name(),
        original_size,
        artifact.file_size,
        artifact.compression_ratio.unwrap_or_default()
    );
    Ok(artifact)
}
