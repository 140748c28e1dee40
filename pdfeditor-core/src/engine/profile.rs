//! Rendering, compression and conformance options passed to engines

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Raster output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
}

impl ImageFormat {
    /// File extension used for rendered pages
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Tiff => "tiff",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "tiff" | "tif" => Ok(ImageFormat::Tiff),
            _ => Err(EditorError::UnsupportedFormat(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Tiff => "tiff",
        })
    }
}

/// What the rendered image is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderIntent {
    /// Screen viewing
    Viewing,
    /// Long-term storage, no lossy shortcuts
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProfile {
    pub format: ImageFormat,
    pub dpi: u32,
    pub intent: RenderIntent,
}

impl RenderProfile {
    /// TIFF output is rendered for archiving, everything else for viewing.
    pub fn for_format(format: ImageFormat, dpi: u32) -> Self {
        let intent = match format {
            ImageFormat::Tiff => RenderIntent::Archive,
            ImageFormat::Png | ImageFormat::Jpeg => RenderIntent::Viewing,
        };
        Self {
            format,
            dpi,
            intent,
        }
    }

    /// Scale factor from PDF points (72 per inch) to pixels
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Optimization profile for compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionProfile {
    /// Smallest output for on-screen use
    #[default]
    Web,
    /// Keep print fidelity, only recompress streams
    Print,
    /// Web optimization with a caller-chosen image quality
    Custom { image_quality: Option<u8> },
}

impl CompressionProfile {
    /// Resolve a profile name; unknown names fall back to `web`.
    pub fn from_request(name: Option<&str>, image_quality: Option<u8>) -> Self {
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("web") => CompressionProfile::Web,
            Some("print") => CompressionProfile::Print,
            Some("custom") => CompressionProfile::Custom { image_quality },
            Some(other) => {
                warn!("Unknown compression profile '{}', using web", other);
                CompressionProfile::Web
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionProfile::Web => "web",
            CompressionProfile::Print => "print",
            CompressionProfile::Custom { .. } => "custom",
        }
    }
}

/// Target PDF/A conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfALevel {
    A1a,
    A1b,
    A2a,
    #[default]
    A2b,
    A2u,
    A3a,
    A3b,
    A3u,
}

impl PdfALevel {
    pub fn part(self) -> u8 {
        match self {
            PdfALevel::A1a | PdfALevel::A1b => 1,
            PdfALevel::A2a | PdfALevel::A2b | PdfALevel::A2u => 2,
            PdfALevel::A3a | PdfALevel::A3b | PdfALevel::A3u => 3,
        }
    }

    /// Conformance letter, lowercase
    pub fn conformance(self) -> char {
        match self {
            PdfALevel::A1a | PdfALevel::A2a | PdfALevel::A3a => 'a',
            PdfALevel::A1b | PdfALevel::A2b | PdfALevel::A3b => 'b',
            PdfALevel::A2u | PdfALevel::A3u => 'u',
        }
    }
}

impl FromStr for PdfALevel {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let code = normalized
            .strip_prefix("pdf/a-")
            .or_else(|| normalized.strip_prefix("pdfa-"))
            .unwrap_or(&normalized);

        match code {
            "1a" => Ok(PdfALevel::A1a),
            "1b" => Ok(PdfALevel::A1b),
            "2a" => Ok(PdfALevel::A2a),
            "2b" => Ok(PdfALevel::A2b),
            "2u" => Ok(PdfALevel::A2u),
            "3a" => Ok(PdfALevel::A3a),
            "3b" => Ok(PdfALevel::A3b),
            "3u" => Ok(PdfALevel::A3u),
            _ => Err(EditorError::InvalidParameter {
                name: "conformance level",
                reason: format!("'{}' is not a PDF/A level (1a, 1b, 2a, 2b, 2u, 3a, 3b, 3u)", s.trim()),
            }),
        }
    }
}

impl fmt::Display for PdfALevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF/A-{}{}", self.part(), self.conformance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_format_parsing() {
        assert_eq!("png".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("JPG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!(" tif ".parse::<ImageFormat>().unwrap(), ImageFormat::Tiff);
        assert!(matches!(
            "bmp".parse::<ImageFormat>(),
            Err(EditorError::UnsupportedFormat(f)) if f == "bmp"
        ));
    }

    #[test]
    fn test_render_profile_intent() {
        assert_eq!(
            RenderProfile::for_format(ImageFormat::Tiff, 300).intent,
            RenderIntent::Archive
        );
        assert_eq!(
            RenderProfile::for_format(ImageFormat::Png, 150).intent,
            RenderIntent::Viewing
        );
        assert_eq!(RenderProfile::for_format(ImageFormat::Png, 144).scale(), 2.0);
    }

    #[test]
    fn test_compression_profile_fallback() {
        assert_eq!(
            CompressionProfile::from_request(None, None),
            CompressionProfile::Web
        );
        assert_eq!(
            CompressionProfile::from_request(Some("PRINT"), None),
            CompressionProfile::Print
        );
        assert_eq!(
            CompressionProfile::from_request(Some("custom"), Some(60)),
            CompressionProfile::Custom {
                image_quality: Some(60)
            }
        );
        assert_eq!(
            CompressionProfile::from_request(Some("ultra"), None),
            CompressionProfile::Web
        );
    }

    #[test]
    fn test_pdfa_level_parsing() {
        assert_eq!("2b".parse::<PdfALevel>().unwrap(), PdfALevel::A2b);
        assert_eq!("PDF/A-3u".parse::<PdfALevel>().unwrap(), PdfALevel::A3u);
        assert_eq!("1A".parse::<PdfALevel>().unwrap(), PdfALevel::A1a);
        assert!("4f".parse::<PdfALevel>().is_err());
        assert_eq!(PdfALevel::default().to_string(), "PDF/A-2b");
    }
}
