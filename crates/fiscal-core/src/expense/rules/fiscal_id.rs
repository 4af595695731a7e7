//! CPF/CNPJ extraction and validation.
//!
//! Both identifiers carry two modulo-11 check digits. A remainder above 9
//! yields a check digit of 0. Sequences of one repeated digit are rejected
//! even though they satisfy the checksum.

use super::patterns::{CNPJ_STANDALONE, CNPJ_TOKEN, CPF_STANDALONE, FISCAL_ID_LABELED};
use super::text::digits_only;
use super::{ExtractionMatch, FieldExtractor};

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [6, 7, 8, 9, 2, 3, 4, 5, 6, 7, 8, 9];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [5, 6, 7, 8, 9, 2, 3, 4, 5, 6, 7, 8, 9];
const CPF_FIRST_WEIGHTS: [u32; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
const CPF_SECOND_WEIGHTS: [u32; 10] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Kind of Brazilian taxpayer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiscalIdKind {
    /// Individual, 11 digits.
    Cpf,
    /// Legal entity, 14 digits.
    Cnpj,
}

/// CPF/CNPJ field extractor.
pub struct FiscalIdExtractor {
    validate: bool,
}

impl FiscalIdExtractor {
    /// Create a new CPF/CNPJ extractor.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate check digits.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn accepts(&self, digits: &str) -> bool {
        match digits.len() {
            11 | 14 => !self.validate || validate_fiscal_id(digits),
            _ => false,
        }
    }
}

impl Default for FiscalIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for FiscalIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        // Labeled ids first (higher confidence)
        for caps in FISCAL_ID_LABELED.captures_iter(text) {
            let Some(id) = caps.get(1) else { continue };
            let digits = digits_only(id.as_str());
            if self.accepts(&digits) && !results.iter().any(|r| r.value == digits) {
                results.push(
                    ExtractionMatch::new(digits, 0.95, id.as_str())
                        .with_position(id.start(), id.end()),
                );
            }
        }

        for pattern in [&*CNPJ_STANDALONE, &*CPF_STANDALONE] {
            for caps in pattern.captures_iter(text) {
                let Some(id) = caps.get(1) else { continue };
                let digits = digits_only(id.as_str());
                if self.accepts(&digits) && !results.iter().any(|r| r.value == digits) {
                    results.push(
                        ExtractionMatch::new(digits, 0.7, id.as_str())
                            .with_position(id.start(), id.end()),
                    );
                }
            }
        }

        results
    }
}

/// First CNPJ-shaped token in the text, digits only. No checksum is applied.
pub fn default_issuer_cnpj(text: &str) -> Option<String> {
    CNPJ_TOKEN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| digits_only(m.as_str()))
}

/// Validate a CPF (11 digits). Separators are ignored.
pub fn is_cpf_valid(cpf: &str) -> bool {
    let digits = to_digits(cpf);
    digits.len() == 11
        && !all_equal(&digits)
        && check_digit(&digits[..9], &CPF_FIRST_WEIGHTS) == digits[9]
        && check_digit(&digits[..10], &CPF_SECOND_WEIGHTS) == digits[10]
}

/// Validate a CNPJ (14 digits). Separators are ignored.
pub fn is_cnpj_valid(cnpj: &str) -> bool {
    let digits = to_digits(cnpj);
    digits.len() == 14
        && !all_equal(&digits)
        && check_digit(&digits[..12], &CNPJ_FIRST_WEIGHTS) == digits[12]
        && check_digit(&digits[..13], &CNPJ_SECOND_WEIGHTS) == digits[13]
}

/// Valid as either a CPF or a CNPJ.
pub fn validate_fiscal_id(id: &str) -> bool {
    is_cpf_valid(id) || is_cnpj_valid(id)
}

/// Kind of a valid identifier, `None` when the checksum fails.
pub fn fiscal_id_kind(id: &str) -> Option<FiscalIdKind> {
    if is_cpf_valid(id) {
        Some(FiscalIdKind::Cpf)
    } else if is_cnpj_valid(id) {
        Some(FiscalIdKind::Cnpj)
    } else {
        None
    }
}

/// Format as `XXX.XXX.XXX-XX` (CPF) or `XX.XXX.XXX/XXXX-XX` (CNPJ).
///
/// Anything that is neither 11 nor 14 digits is returned unchanged.
pub fn format_fiscal_id(id: &str) -> String {
    let d = digits_only(id);
    match d.len() {
        11 => format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11]),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &d[0..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..14]
        ),
        _ => id.to_string(),
    }
}

fn to_digits(s: &str) -> Vec<u32> {
    s.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_equal(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder > 9 { 0 } else { remainder }
}
