//! Page specification parsing
//!
//! Two grammars share one tokenizer:
//!
//! - the lenient *selection* form used by convert and extract
//!   (`"1,3,5-7"`), which drops pages outside the document, and
//! - the strict *range* form used by split, which rejects them.
//!
//! Pages are always 1-based.

use crate::error::{EditorError, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// An inclusive, 1-based run of pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    pub start: usize,
    pub end: usize,
}

impl PageSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of pages covered
    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pages(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Single(usize),
    Range(usize, usize),
}

fn parse_number(token: &str, part: &str) -> Result<usize> {
    let part = part.trim();
    if part.is_empty() {
        return Err(EditorError::malformed(token, "missing page number"));
    }
    part.parse::<usize>()
        .map_err(|_| EditorError::malformed(token, format!("'{part}' is not a page number")))
}

fn parse_token(raw: &str) -> Result<Token> {
    let token = raw.trim();
    if token.is_empty() {
        return Err(EditorError::malformed(raw, "empty token"));
    }

    match token.split_once('-') {
        Some((start, end)) => Ok(Token::Range(
            parse_number(token, start)?,
            parse_number(token, end)?,
        )),
        None => Ok(Token::Single(parse_number(token, token)?)),
    }
}

/// Select pages from a comma-separated specification.
///
/// A missing or blank specification selects every page. Single pages
/// outside `1..=total_pages` are dropped, ranges are intersected with the
/// document. Order and duplicates are kept as written.
///
/// # Examples
///
/// ```
/// use pdfeditor::page_spec::select_pages;
///
/// assert_eq!(select_pages(Some("1,3,5"), 10).unwrap(), vec![1, 3, 5]);
/// assert_eq!(select_pages(Some("1-3,2"), 10).unwrap(), vec![1, 2, 3, 2]);
/// assert_eq!(select_pages(Some("8-12"), 10).unwrap(), vec![8, 9, 10]);
/// assert_eq!(select_pages(None, 3).unwrap(), vec![1, 2, 3]);
/// ```
pub fn select_pages(spec: Option<&str>, total_pages: usize) -> Result<Vec<usize>> {
    let spec = match spec.map(str::trim) {
        Some(spec) if !spec.is_empty() => spec,
        _ => return Ok((1..=total_pages).collect()),
    };

    let mut pages = Vec::new();
    for raw in spec.split(',') {
        match parse_token(raw)? {
            Token::Single(page) => {
                if (1..=total_pages).contains(&page) {
                    pages.push(page);
                }
            }
            Token::Range(start, end) => {
                if end < start {
                    return Err(EditorError::malformed(
                        raw.trim(),
                        "range end precedes its start",
                    ));
                }
                pages.extend(start.max(1)..=end.min(total_pages));
            }
        }
    }

    Ok(pages)
}

/// Parse one strict `start-end` range against a document of
/// `total_pages` pages. A bare page number `n` means `n-n`.
pub fn parse_range(token: &str, total_pages: usize) -> Result<PageSpan> {
    let (start, end) = match parse_token(token)? {
        Token::Single(page) => (page, page),
        Token::Range(start, end) => (start, end),
    };

    let out_of_bounds = |page: usize, lower: usize| EditorError::PageRangeOutOfBounds {
        range: token.trim().to_string(),
        page,
        lower,
        bound: total_pages,
    };

    if start < 1 || start > total_pages {
        return Err(out_of_bounds(start, 1));
    }
    if end < start || end > total_pages {
        return Err(out_of_bounds(end, start));
    }

    Ok(PageSpan::new(start, end))
}

/// Parse a single page number, as used for split points.
///
/// Bounds are left to the caller.
pub fn parse_page_number(token: &str) -> Result<usize> {
    match parse_token(token)? {
        Token::Single(page) => Ok(page),
        Token::Range(..) => Err(EditorError::malformed(
            token.trim(),
            "expected a single page number",
        )),
    }
}
