//! Output file naming

use crate::engine::ImageFormat;
use crate::page_spec::PageSpan;
use uuid::Uuid;

/// Resolves the base name of an operation's outputs once per call.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    base: String,
}

impl OutputNamer {
    /// Use `base` when the caller gave a usable one, otherwise
    /// `{default_prefix}_{uuid}`.
    pub fn new(base: Option<&str>, default_prefix: &str) -> Self {
        let base = base
            .and_then(sanitize_file_name)
            .unwrap_or_else(|| format!("{default_prefix}_{}", unique_token()));
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Single PDF output, `.pdf` appended when missing
    pub fn pdf(&self) -> String {
        with_extension(&self.base, "pdf")
    }

    /// `{base}_part{n}_pages{start}-{end}.pdf`
    pub fn split_part(&self, part: usize, span: PageSpan) -> String {
        format!(
            "{}_part{}_pages{}-{}.pdf",
            self.base, part, span.start, span.end
        )
    }

    /// `{base}_page_{page}.{ext}`, the page zero-padded to the width of the
    /// document's page count
    pub fn page_image(&self, page: usize, total_pages: usize, format: ImageFormat) -> String {
        format!(
            "{}_page_{:0width$}.{}",
            self.base,
            page,
            format.extension(),
            width = page_index_width(total_pages)
        )
    }
}

/// Digits needed to print every page number of the document
pub fn page_index_width(total_pages: usize) -> usize {
    total_pages.max(1).to_string().len()
}

/// Append `.{ext}` unless `name` already ends with it (ignoring case).
pub fn with_extension(name: &str, ext: &str) -> String {
    let suffix = format!(".{ext}");
    if name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

/// Reduce a caller-supplied name to its final path component.
///
/// Returns `None` for names that leave nothing usable.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last.to_string()),
    }
}

/// PDF/A output name: `{stem}_pdfa_{token}.pdf`
pub fn pdfa_name(original_name: Option<&str>) -> String {
    let stem = original_name
        .and_then(sanitize_file_name)
        .map(|name| match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name,
        })
        .unwrap_or_else(|| "document".to_string());

    format!("{stem}_pdfa_{}.pdf", short_token())
}

/// Random token for default names
pub fn unique_token() -> String {
    Uuid::new_v4().to_string()
}

fn short_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
