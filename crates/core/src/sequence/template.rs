//! Document number format templates.
//!
//! A template mixes literal text with tokens, e.g. `{PREFIX}/{MM}{YYYY}/{SEQ}`:
//!
//! | Token      | Replaced with                              |
//! |------------|--------------------------------------------|
//! | `{PREFIX}` | transcode prefix                           |
//! | `{YYYY}`   | four-digit year of the allocation date     |
//! | `{YY}`     | two-digit year                             |
//! | `{MM}`     | two-digit month                            |
//! | `{DD}`     | two-digit day                              |
//! | `{SEQ}`    | counter value, zero-padded to `SEQ_WIDTH`  |

use chrono::{Datelike, NaiveDate};

use super::error::SequenceError;

/// Minimum width of the `{SEQ}` token. Wider values are printed in full.
pub const SEQ_WIDTH: usize = 4;

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text copied as-is.
    Literal(String),
    /// `{PREFIX}`
    Prefix,
    /// `{YYYY}`
    Year4,
    /// `{YY}`
    Year2,
    /// `{MM}`
    Month,
    /// `{DD}`
    Day,
    /// `{SEQ}`
    Seq,
}

impl Segment {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "PREFIX" => Some(Self::Prefix),
            "YYYY" => Some(Self::Year4),
            "YY" => Some(Self::Year2),
            "MM" => Some(Self::Month),
            "DD" => Some(Self::Day),
            "SEQ" => Some(Self::Seq),
            _ => None,
        }
    }
}

/// A validated format template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    segments: Vec<Segment>,
}

impl FormatTemplate {
    /// Parses and validates a template.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::InvalidTemplate` when the template contains an
    /// unknown or unterminated token, a stray `}`, or does not contain exactly
    /// one `{SEQ}`.
    pub fn parse(raw: &str) -> Result<Self, SequenceError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(ch) = rest.chars().next() {
            match ch {
                '{' => {
                    let close = rest.find('}').ok_or_else(|| {
                        SequenceError::InvalidTemplate(format!("unterminated token in '{raw}'"))
                    })?;
                    let token = &rest[1..close];
                    let segment = Segment::from_token(token).ok_or_else(|| {
                        SequenceError::InvalidTemplate(format!("unknown token '{{{token}}}'"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &rest[close + 1..];
                }
                '}' => {
                    return Err(SequenceError::InvalidTemplate(format!(
                        "unmatched '}}' in '{raw}'"
                    )));
                }
                _ => {
                    literal.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let seq_count = segments.iter().filter(|s| **s == Segment::Seq).count();
        if seq_count != 1 {
            return Err(SequenceError::InvalidTemplate(format!(
                "template must contain exactly one {{SEQ}} token, found {seq_count}"
            )));
        }

        Ok(Self { segments })
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Renders a document number.
    #[must_use]
    pub fn render(&self, prefix: &str, date: NaiveDate, seq: i64) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Prefix => out.push_str(prefix),
                Segment::Year4 => out.push_str(&format!("{:04}", date.year())),
                Segment::Year2 => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
                Segment::Month => out.push_str(&format!("{:02}", date.month())),
                Segment::Day => out.push_str(&format!("{:02}", date.day())),
                Segment::Seq => out.push_str(&format!("{seq:0SEQ_WIDTH$}")),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn june_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_journal_voucher_format() {
        let template = FormatTemplate::parse("{PREFIX}/{MM}{YYYY}/{SEQ}").unwrap();
        assert_eq!(template.render("JV", june_15(), 42), "JV/062025/0042");
    }

    #[rstest]
    #[case("{PREFIX}-{YY}{MM}{DD}-{SEQ}", "PO-250615-0007")]
    #[case("{SEQ}", "0007")]
    #[case("INV{YYYY}{SEQ}", "INV20250007")]
    #[case("{PREFIX}.{DD}.{SEQ}", "PO.15.0007")]
    fn test_render_tokens(#[case] raw: &str, #[case] expected: &str) {
        let template = FormatTemplate::parse(raw).unwrap();
        assert_eq!(template.render("PO", june_15(), 7), expected);
    }

    #[test]
    fn test_wide_sequence_not_truncated() {
        let template = FormatTemplate::parse("{PREFIX}{SEQ}").unwrap();
        assert_eq!(template.render("X", june_15(), 123_456), "X123456");
    }

    #[rstest]
    #[case("{PREFIX}/{YEAR}/{SEQ}")]
    #[case("{PREFIX}/{MM")]
    #[case("{PREFIX}/MM}/{SEQ}")]
    #[case("{PREFIX}/{MM}")]
    #[case("{SEQ}-{SEQ}")]
    #[case("")]
    fn test_invalid_templates(#[case] raw: &str) {
        assert!(matches!(
            FormatTemplate::parse(raw),
            Err(SequenceError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_segments_preserve_literals() {
        let template = FormatTemplate::parse("A/{SEQ}/B").unwrap();
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("A/".to_string()),
                Segment::Seq,
                Segment::Literal("/B".to_string()),
            ]
        );
    }
}
