//! Document-level metadata reported by engines

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// Raw document information as read by an engine.
///
/// Dates are kept as the PDF date strings found in the file; see
/// [`parse_pdf_date`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub pdf_version: String,
    pub page_count: usize,
    pub encrypted: bool,
    pub linearized: bool,
    pub has_forms: bool,
    pub tagged: bool,
    /// Conformance declared in the XMP packet
    pub pdfa: Option<PdfAConformance>,
}

/// Declared PDF/A identification (`pdfaid:part` / `pdfaid:conformance`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfAConformance {
    pub part: u8,
    /// Lowercase conformance letter, absent for PDF/A-4 base conformance
    pub conformance: Option<char>,
}

lazy_static! {
    static ref PDFAID_PART: Regex =
        Regex::new(r#"pdfaid:part\s*(?:=\s*["']|>)\s*(\d)"#).expect("valid regex");
    static ref PDFAID_CONFORMANCE: Regex =
        Regex::new(r#"pdfaid:conformance\s*(?:=\s*["']|>)\s*([A-Za-z])"#).expect("valid regex");
}

impl PdfAConformance {
    /// Read the identification schema from an XMP packet.
    ///
    /// Both the attribute (`pdfaid:part="2"`) and the element
    /// (`<pdfaid:part>2</pdfaid:part>`) serializations are accepted.
    pub fn from_xmp(xmp: &str) -> Option<Self> {
        let part = PDFAID_PART
            .captures(xmp)?
            .get(1)?
            .as_str()
            .parse::<u8>()
            .ok()?;
        let conformance = PDFAID_CONFORMANCE
            .captures(xmp)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_lowercase());

        Some(Self { part, conformance })
    }
}

impl fmt::Display for PdfAConformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.conformance {
            Some(letter) => write!(f, "PDF/A-{}{}", self.part, letter),
            None => write!(f, "PDF/A-{}", self.part),
        }
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Every field after the year is optional. Returns `None` for strings that
/// do not describe a valid instant.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let value = raw.trim();
    let value = value.strip_prefix("D:").unwrap_or(value);

    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let field = |from: usize, default: u32| {
        digits
            .get(from..from + 2)
            .and_then(|d| d.parse::<u32>().ok())
            .unwrap_or(default)
    };

    let date = NaiveDate::from_ymd_opt(year, field(4, 1), field(6, 1))?;
    let naive = date.and_hms_opt(field(8, 0), field(10, 0), field(12, 0))?;
    let offset = parse_offset(&value[digits.len()..])?;

    offset.from_local_datetime(&naive).single()
}

fn parse_offset(rest: &str) -> Option<FixedOffset> {
    let mut chars = rest.chars();
    match chars.next() {
        Some(sign @ ('+' | '-')) => {
            let digits: String = chars.filter(char::is_ascii_digit).collect();
            let hours: i32 = digits.get(0..2)?.parse().ok()?;
            let minutes: i32 = digits
                .get(2..4)
                .and_then(|m| m.parse().ok())
                .unwrap_or(0);
            let seconds = hours * 3600 + minutes * 60;
            if sign == '+' {
                FixedOffset::east_opt(seconds)
            } else {
                FixedOffset::west_opt(seconds)
            }
        }
        _ => FixedOffset::east_opt(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_full_date_with_offset() {
        let date = parse_pdf_date("D:20230115103045+01'00'").unwrap();
        assert_eq!(date.year(), 2023);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 10);
        assert_eq!(date.second(), 45);
        assert_eq!(date.offset().local_minus_utc(), 3600);
        assert_eq!(date.to_rfc3339(), "2023-01-15T10:30:45+01:00");
    }

    #[test]
    fn test_parse_partial_and_utc_dates() {
        assert_eq!(
            parse_pdf_date("D:2021").unwrap().to_rfc3339(),
            "2021-01-01T00:00:00+00:00"
        );
        assert_eq!(
            parse_pdf_date("20200229120000Z").unwrap().to_rfc3339(),
            "2020-02-29T12:00:00+00:00"
        );
        assert_eq!(
            parse_pdf_date("D:20200101000000-05'30").unwrap().offset().local_minus_utc(),
            -(5 * 3600 + 30 * 60)
        );
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert!(parse_pdf_date("").is_none());
        assert!(parse_pdf_date("D:20").is_none());
        assert!(parse_pdf_date("D:20231345").is_none());
        assert!(parse_pdf_date("yesterday").is_none());
    }

    #[test]
    fn test_pdfa_from_xmp_attributes() {
        let xmp = r#"<rdf:Description rdf:about="" xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/"
            pdfaid:part="2" pdfaid:conformance="B"/>"#;
        let conformance = PdfAConformance::from_xmp(xmp).unwrap();
        assert_eq!(conformance.part, 2);
        assert_eq!(conformance.conformance, Some('b'));
        assert_eq!(conformance.to_string(), "PDF/A-2b");
    }

    #[test]
    fn test_pdfa_from_xmp_elements() {
        let xmp = "<pdfaid:part>1</pdfaid:part><pdfaid:conformance>A</pdfaid:conformance>";
        assert_eq!(
            PdfAConformance::from_xmp(xmp),
            Some(PdfAConformance {
                part: 1,
                conformance: Some('a')
            })
        );
    }

    #[test]
    fn test_pdfa_missing_identification() {
        assert!(PdfAConformance::from_xmp("<x:xmpmeta></x:xmpmeta>").is_none());
        let part_only = PdfAConformance::from_xmp("pdfaid:part='4'").unwrap();
        assert_eq!(part_only.to_string(), "PDF/A-4");
    }
}
