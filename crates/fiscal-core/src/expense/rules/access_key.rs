//! 44-digit access key of electronic fiscal documents.
//!
//! Unlabeled keys are accepted only when their first two digits form an
//! IBGE state code (11 to 53). This is a plausibility filter, not the key's
//! own modulo-11 check digit.

use tracing::debug;

use super::patterns::{ACCESS_KEY_LABELED, ACCESS_KEY_RUN};

/// Length of an access key in digits.
pub const ACCESS_KEY_LEN: usize = 44;

const MIN_STATE_CODE: u32 = 11;
const MAX_STATE_CODE: u32 = 53;

/// Find the access key in a document text.
///
/// A labeled key ("Chave de Acesso", "CHAVE") wins. Otherwise the first
/// digit/space run that collapses to a plausible 44-digit key is used.
pub fn extract_access_key(text: &str) -> Option<String> {
    if let Some(key) = labeled_key(text) {
        debug!("Found labeled access key");
        return Some(key);
    }

    ACCESS_KEY_RUN
        .find_iter(text)
        .map(|m| strip_whitespace(m.as_str()))
        .find(|digits| is_plausible_access_key(digits))
}

/// 44 digits starting with a known state code.
pub fn is_plausible_access_key(digits: &str) -> bool {
    if digits.len() != ACCESS_KEY_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    digits[..2]
        .parse::<u32>()
        .map(|state| (MIN_STATE_CODE..=MAX_STATE_CODE).contains(&state))
        .unwrap_or(false)
}

fn labeled_key(text: &str) -> Option<String> {
    ACCESS_KEY_LABELED
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| strip_whitespace(m.as_str()))
        .find(|digits| digits.len() == ACCESS_KEY_LEN)
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "35250311222333000181550010000001231000001234";

    fn spaced(key: &str) -> String {
        key.as_bytes()
            .chunks(4)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_unlabeled_key_with_state_code() {
        let text = format!("DANFE\nDocumento auxiliar {} protocolo", spaced(KEY));
        assert_eq!(extract_access_key(&text), Some(KEY.to_string()));
    }

    #[test]
    fn test_unlabeled_key_rejects_invalid_state() {
        let zeros = format!("00{}", &KEY[2..]);
        let nines = format!("99{}", &KEY[2..]);
        assert_eq!(extract_access_key(&format!("x {} y", spaced(&zeros))), None);
        assert_eq!(extract_access_key(&format!("x {} y", spaced(&nines))), None);
    }

    #[test]
    fn test_labeled_key() {
        let text = format!("CHAVE DE ACESSO\n{}\nConsulta", spaced(KEY));
        assert_eq!(extract_access_key(&text), Some(KEY.to_string()));
    }

    #[test]
    fn test_labeled_key_needs_exactly_44_digits() {
        let text = format!("Chave de Acesso: {}", &KEY[..43]);
        assert_eq!(extract_access_key(&text), None);
    }

    #[test]
    fn test_is_plausible_access_key() {
        assert!(is_plausible_access_key(KEY));
        assert!(!is_plausible_access_key(&KEY[..43]));
        assert!(!is_plausible_access_key("10250311222333000181550010000001231000001234"));
        assert!(!is_plausible_access_key("54250311222333000181550010000001231000001234"));
    }
}
