//! Page rasterisation through pdfium

use super::profile::{ImageFormat, RenderIntent, RenderProfile};
use super::{EngineError, EngineResult};
use image::{DynamicImage, ImageFormat as Encoding};
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;
use tracing::{debug, info};

pub(crate) struct Rasterizer {
    pdfium: Pdfium,
}

impl Rasterizer {
    /// Bind the native library, from `library_dir` when given, otherwise
    /// from the system search path.
    pub(crate) fn bind(library_dir: Option<PathBuf>) -> EngineResult<Self> {
        let bindings = match &library_dir {
            Some(dir) => {
                info!("Binding pdfium from {}", dir.display());
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| EngineError::Initialization(format!("cannot load pdfium: {e:?}")))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    pub(crate) fn render(
        &self,
        bytes: &[u8],
        page: usize,
        profile: &RenderProfile,
    ) -> EngineResult<Vec<u8>> {
        let index = page
            .checked_sub(1)
            .and_then(|index| u16::try_from(index).ok())
            .ok_or_else(|| EngineError::Render(format!("page {page} cannot be addressed")))?;

        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| EngineError::Render(format!("{e:?}")))?;
        let pages = document.pages();
        let pdf_page = pages
            .get(index)
            .map_err(|e| EngineError::Render(format!("{e:?}")))?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(profile.scale())
            .use_print_quality(profile.intent == RenderIntent::Archive)
            .render_form_data(true)
            .render_annotations(true);

        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| EngineError::Render(format!("{e:?}")))?;
        let image = bitmap.as_image();
        debug!(
            "Rendered page {} at {} dpi: {}x{} px",
            page,
            profile.dpi,
            image.width(),
            image.height()
        );

        encode(&image, profile.format)
    }
}

fn encode(image: &DynamicImage, format: ImageFormat) -> EngineResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let result = match format {
        ImageFormat::Png => image.write_to(&mut buffer, Encoding::Png),
        // JPEG has no alpha channel
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, Encoding::Jpeg),
        ImageFormat::Tiff => image.write_to(&mut buffer, Encoding::Tiff),
    };
    result.map_err(|e| EngineError::Render(format!("image encoding failed: {e}")))?;
    Ok(buffer.into_inner())
}
