//! Text capture primitives driven by configurable patterns.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::debug;

lazy_static! {
    static ref REPEATED_WHITESPACE: Regex = Regex::new(r"\s{2,}").unwrap();
}

/// Compile a rule pattern case-insensitively. Blank or invalid patterns yield `None`.
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    if pattern.trim().is_empty() {
        return None;
    }
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            debug!("Ignoring invalid rule pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// First capture group of `regex` in `text`, trimmed.
///
/// Patterns without groups yield the whole match. A group that does not
/// take part in the match, or captures only whitespace, is `None`.
pub fn capture(text: &str, regex: &Regex) -> Option<String> {
    let caps = regex.captures(text)?;
    let group = if regex.captures_len() > 1 { 1 } else { 0 };
    let matched = caps.get(group)?;
    let value = matched.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Extract the first capture group of a case-insensitive rule pattern.
pub fn extract_by_pattern(text: &str, pattern: &str) -> Option<String> {
    let regex = compile_pattern(pattern)?;
    capture(text, &regex)
}

/// Like [`extract_by_pattern`], collapsing runs of whitespace into one space.
pub fn extract_issuer_name(text: &str, pattern: &str) -> Option<String> {
    extract_by_pattern(text, pattern).map(|name| collapse_whitespace(&name))
}

/// Collapse runs of two or more whitespace characters into one space.
pub fn collapse_whitespace(text: &str) -> String {
    REPEATED_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Keep only ASCII digits.
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_by_pattern_case_insensitive() {
        let text = "NÚMERO DA NOTA: 000.123\nSérie: 1";
        assert_eq!(
            extract_by_pattern(text, r"número da nota[:\s]*([0-9.]+)"),
            Some("000.123".to_string())
        );
        assert_eq!(extract_by_pattern(text, r"série[:\s]*(\d+)"), Some("1".to_string()));
    }

    #[test]
    fn test_extract_by_pattern_blank_or_invalid() {
        assert_eq!(extract_by_pattern("Série: 1", ""), None);
        assert_eq!(extract_by_pattern("Série: 1", "   "), None);
        assert_eq!(extract_by_pattern("Série: 1", r"(unclosed"), None);
        assert_eq!(extract_by_pattern("Série: 1", r"Modelo[:\s]*(\d+)"), None);
    }

    #[test]
    fn test_extract_by_pattern_unmatched_optional_group() {
        assert_eq!(extract_by_pattern("Série: X", r"S[ée]rie[:\s]*(\d+)?"), None);
        assert_eq!(
            extract_by_pattern("Série: 7", r"S[ée]rie[:\s]*(\d+)?"),
            Some("7".to_string())
        );
    }

    #[test]
    fn test_capture_without_groups_yields_whole_match() {
        let regex = Regex::new(r"\d{3}\.\d{3}").unwrap();
        assert_eq!(capture("Nota 123.456", &regex), Some("123.456".to_string()));
    }

    #[test]
    fn test_extract_issuer_name_collapses_spaces() {
        let text = "Razão Social:   ACME    COMERCIO   LTDA\n";
        assert_eq!(
            extract_issuer_name(text, r"Raz[aã]o Social:([^\n]+)"),
            Some("ACME COMERCIO LTDA".to_string())
        );
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("11.222.333/0001-81"), "11222333000181");
        assert_eq!(digits_only("abc"), "");
    }
}
