//! Date extraction. Dates inside fiscal documents are read as `dd/MM/yyyy` only.

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use super::patterns::DATE_TOKEN;
use super::text::{capture, extract_by_pattern};
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for every valid `dd/MM/yyyy` date in a text.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_TOKEN
            .captures_iter(text)
            .filter_map(|caps| {
                let token = caps.get(1)?;
                let date = parse_br_date(token.as_str())?;
                Some(
                    ExtractionMatch::new(date, 0.6, token.as_str())
                        .with_position(token.start(), token.end()),
                )
            })
            .collect()
    }
}

/// Parse `dd/MM/yyyy`.
pub fn parse_br_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y").ok()
}

/// Extract a date with a rule pattern.
///
/// A capture that is not a valid `dd/MM/yyyy` date is treated as absent.
pub fn extract_date(text: &str, pattern: &str) -> Option<NaiveDate> {
    let raw = extract_by_pattern(text, pattern)?;
    let date = parse_br_date(&raw);
    if date.is_none() {
        debug!("Unparseable date {:?} for pattern {:?}", raw, pattern);
    }
    date
}

/// Date captured by a labeled regex.
pub fn capture_date(text: &str, regex: &Regex) -> Option<NaiveDate> {
    capture(text, regex).and_then(|raw| parse_br_date(&raw))
}

/// Earliest valid date anywhere in the text.
pub fn default_due_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .min()
}
