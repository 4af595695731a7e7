//! Monetary value extraction in Brazilian notation (`1.234,56`).

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::patterns::AMOUNT_TOKEN;
use super::text::{capture, extract_by_pattern};
use super::{ExtractionMatch, FieldExtractor};

/// Extractor for every `1.234,56`-shaped amount in a text.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AMOUNT_TOKEN
            .captures_iter(text)
            .filter_map(|caps| {
                let token = caps.get(1)?;
                let amount = normalize_brl_value(token.as_str())?;
                Some(
                    ExtractionMatch::new(amount, 0.6, token.as_str())
                        .with_position(token.start(), token.end()),
                )
            })
            .collect()
    }
}

/// Extract a value with a rule pattern and normalize it.
pub fn extract_value_by_pattern(text: &str, pattern: &str) -> Option<Decimal> {
    extract_by_pattern(text, pattern).and_then(|raw| normalize_brl_value(&raw))
}

/// Amount captured by a labeled regex, e.g. `Multa: R$ 12,50`.
pub fn capture_amount(text: &str, regex: &Regex) -> Option<Decimal> {
    capture(text, regex).and_then(|raw| normalize_brl_value(&raw))
}

/// Largest amount anywhere in the text.
pub fn default_total_value(text: &str) -> Option<Decimal> {
    AmountExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .max()
}

/// Normalize a Brazilian-formatted value.
///
/// Everything but digits, commas and dots is dropped, dots are treated as
/// thousands separators and the comma as the decimal point.
pub fn normalize_brl_value(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let normalized = cleaned.replace('.', "").replace(',', ".");

    match Decimal::from_str(&normalized) {
        Ok(value) => Some(value),
        Err(_) => {
            if !normalized.is_empty() {
                debug!("Malformed numeric literal {:?}", raw);
            }
            None
        }
    }
}

/// Parse an amount written either way (`1.234,56`, `1234,56` or `1234.56`).
///
/// When both separators appear, whichever comes last is the decimal point.
pub fn parse_brl_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .collect();

    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        let comma_pos = cleaned.rfind(',');
        let dot_pos = cleaned.rfind('.');
        match (comma_pos, dot_pos) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            _ => cleaned,
        }
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_extract_value_by_pattern() {
        let text = "Valor Total: R$ 1.234,56";
        assert_eq!(
            extract_value_by_pattern(text, r"Valor Total[:\s]*(R\$\s*[0-9.,]+)"),
            Some(dec("1234.56"))
        );
        assert_eq!(
            extract_value_by_pattern("R$ 1.234,56", r"(R\$\s*[0-9.,]+)"),
            Some(dec("1234.56"))
        );
    }

    #[test]
    fn test_extract_value_by_pattern_absent() {
        assert_eq!(extract_value_by_pattern("", r"Valor Total[:\s]*([0-9.,]+)"), None);
        assert_eq!(extract_value_by_pattern("Valor Total: 10,00", ""), None);
    }

    #[test]
    fn test_normalize_brl_value_malformed() {
        assert_eq!(normalize_brl_value("1,2,3"), None);
        assert_eq!(normalize_brl_value("R$"), None);
        assert_eq!(normalize_brl_value("12.345.678,90"), Some(dec("12345678.90")));
    }

    #[test]
    fn test_default_total_value_takes_maximum() {
        let text = "Total 1.000,00 Subtotal 500,00";
        assert_eq!(default_total_value(text), Some(dec("1000.00")));
        assert_eq!(default_total_value("sem valores"), None);
    }

    #[test]
    fn test_default_total_value_ignores_glued_digits() {
        assert_eq!(default_total_value("Código 1234,56"), None);
    }

    #[test]
    fn test_capture_amount() {
        let regex = Regex::new(r"Multa[:\s]*R?\$?\s*([0-9.,]+)").unwrap();
        assert_eq!(capture_amount("Multa: R$ 12,50", &regex), Some(dec("12.50")));
    }

    #[test]
    fn test_parse_brl_amount() {
        assert_eq!(parse_brl_amount("1.234,56"), Some(dec("1234.56")));
        assert_eq!(parse_brl_amount("1234,56"), Some(dec("1234.56")));
        assert_eq!(parse_brl_amount("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_brl_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_brl_amount("R$ 10,00"), Some(dec("10.00")));
        assert_eq!(parse_brl_amount(""), None);
    }

    #[test]
    fn test_amount_extractor_positions() {
        let results = AmountExtractor::new().extract_all("A 10,00 B 2.000,50");
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].value, dec("2000.50"));
        assert_eq!(results[0].position, Some((2, 7)));
    }
}
