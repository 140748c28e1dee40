//! Page rasterisation into image files

use crate::artifact::OutputArtifact;
use crate::document::SourceDocument;
use crate::engine::{ImageFormat, PdfEngine, RenderProfile};
use crate::error::{EditorError, Result};
use crate::naming::OutputNamer;
use crate::page_spec::select_pages;
use crate::workspace::Workspace;
use std::ops::RangeInclusive;
use tracing::{debug, info};

pub const DEFAULT_DPI: u32 = 150;
pub const DPI_RANGE: RangeInclusive<u32> = 36..=1200;

/// Options for page conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub format: ImageFormat,
    pub dpi: u32,
    /// Lenient page selection; every page when absent
    pub pages: Option<String>,
    pub base_name: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            dpi: DEFAULT_DPI,
            pages: None,
            base_name: None,
        }
    }
}

/// Reject resolutions outside [`DPI_RANGE`].
pub fn validate_dpi(dpi: u32) -> Result<u32> {
    if DPI_RANGE.contains(&dpi) {
        Ok(dpi)
    } else {
        Err(EditorError::InvalidParameter {
            name: "dpi",
            reason: format!(
                "{dpi} is outside {}-{}",
                DPI_RANGE.start(),
                DPI_RANGE.end()
            ),
        })
    }
}

/// Render the selected pages of `source`, one image file per page.
///
/// A failing page stops the conversion; images written before it are kept
/// and reported in the error.
pub fn convert_to_images<E: PdfEngine>(
    source: &SourceDocument<'_, E>,
    workspace: &Workspace,
    options: &ConvertOptions,
) -> Result<Vec<OutputArtifact>> {
    let dpi = validate_dpi(options.dpi)?;
    let total_pages = source.page_count();
    let selection = select_pages(options.pages.as_deref(), total_pages)?;
    let profile = RenderProfile::for_format(options.format, dpi);
    let namer = OutputNamer::new(options.base_name.as_deref(), "converted");

    info!(
        "Converting {} of {} pages to {} at {} dpi",
        selection.len(),
        total_pages,
        options.format,
        dpi
    );

    let mut produced = Vec::with_capacity(selection.len());
    for page in selection {
        let file_name = namer.page_image(page, total_pages, options.format);
        let written = source
            .engine()
            .render(source.handle(), page, &profile)
            .map_err(EditorError::from)
            .and_then(|bytes| workspace.write_output(&file_name, &bytes));

        match written {
            Ok(artifact) => {
                debug!("Rendered page {} to {}", page, file_name);
                produced.push(artifact);
            }
            Err(e) => {
                return Err(EditorError::RenderFailure {
                    page,
                    detail: e.to_string(),
                    produced,
                })
            }
        }
    }

    Ok(produced)
}
