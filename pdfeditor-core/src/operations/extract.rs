//! Text extraction

use crate::document::SourceDocument;
use crate::engine::PdfEngine;
use crate::error::Result;
use crate::page_spec::select_pages;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    /// Text of all selected pages, one page per line block
    pub text_content: String,
    pub pages: Vec<PageText>,
    pub word_count: usize,
    pub character_count: usize,
}

/// Whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Extract the text of the selected pages.
pub fn extract_text<E: PdfEngine>(
    source: &SourceDocument<'_, E>,
    pages: Option<&str>,
) -> Result<ExtractionReport> {
    let selection = select_pages(pages, source.page_count())?;

    let mut page_texts = Vec::with_capacity(selection.len());
    for page in selection {
        let text = source.engine().extract_text(source.handle(), page)?;
        let text = text.trim_end().to_string();
        page_texts.push(PageText {
            page_number: page,
            word_count: count_words(&text),
            text,
        });
    }

    let text_content = page_texts
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let report = ExtractionReport {
        word_count: page_texts.iter().map(|page| page.word_count).sum(),
        character_count: text_content.chars().count(),
        text_content,
        pages: page_texts,
    };

    info!(
        "Extracted {} words from {} pages of {}",
        report.word_count,
        report.pages.len(),
        source.label()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("  one\ttwo\n three  "), 3);
        assert_eq!(count_words("héllo wörld"), 2);
    }
}
