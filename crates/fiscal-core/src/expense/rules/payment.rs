//! Payment codes printed on slips and tax guides.

use super::patterns::{
    BANK_CODE, DIGIT_GROUP_RUN, PIX_EMV, PIX_LABELED, TYPEABLE_LINE_BANK,
    TYPEABLE_LINE_COLLECTION,
};
use super::text::{capture, digits_only};

/// Digits in a bank slip typeable line.
pub const BANK_LINE_LEN: usize = 47;
/// Digits in a collection (utility, tax guide) typeable line.
pub const COLLECTION_LINE_LEN: usize = 48;

/// Typeable line (linha digitável), digits only.
///
/// Bank slip lines (47 digits) are tried before collection lines (48 digits).
pub fn extract_typeable_line(text: &str) -> Option<String> {
    [&*TYPEABLE_LINE_BANK, &*TYPEABLE_LINE_COLLECTION]
        .into_iter()
        .find_map(|regex| capture(text, regex))
        .map(|line| digits_only(&line))
}

/// First digit run on a single line whose digit count is within `min..=max`.
///
/// Runs may be split by spaces, dots or hyphens.
pub fn extract_barcode(text: &str, min: usize, max: usize) -> Option<String> {
    DIGIT_GROUP_RUN
        .find_iter(text)
        .map(|m| digits_only(m.as_str()))
        .find(|digits| (min..=max).contains(&digits.len()))
}

/// Issuing bank code: the first three digits of a bank slip line.
pub fn bank_code_from_line(line: &str) -> Option<String> {
    let digits = digits_only(line);
    (digits.len() == BANK_LINE_LEN || digits.len() == 44).then(|| digits[..3].to_string())
}

/// Issuing bank code printed next to the bank name, e.g. `Banco do Brasil 001-9`.
pub fn extract_bank_code(text: &str) -> Option<String> {
    capture(text, &BANK_CODE)
}

/// PIX copy-and-paste payload.
pub fn extract_pix_payload(text: &str) -> Option<String> {
    capture(text, &PIX_LABELED).or_else(|| capture(text, &PIX_EMV))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK_LINE: &str = "34191.79001 01043.510047 91020.150008 1 96610000012345";

    #[test]
    fn test_extract_typeable_line_bank() {
        let text = format!("Recibo do Pagador\n{}\nLocal de pagamento", BANK_LINE);
        let line = extract_typeable_line(&text).unwrap();
        assert_eq!(line.len(), BANK_LINE_LEN);
        assert!(line.starts_with("34191"));
        assert_eq!(bank_code_from_line(&line), Some("341".to_string()));
    }

    #[test]
    fn test_extract_typeable_line_collection() {
        let text = "85890000001-2 23450328211-5 12345678901-2 34567890123-4";
        let line = extract_typeable_line(text).unwrap();
        assert_eq!(line.len(), COLLECTION_LINE_LEN);
    }

    #[test]
    fn test_extract_barcode_window() {
        let text = "Código de barras\n8589 0000 0012 3450 3282 1151 2345 6789 0123 4567 8901\nfim";
        assert_eq!(
            extract_barcode(text, 44, 48),
            Some("85890000001234503282115123456789012345678901".to_string())
        );
        assert_eq!(extract_barcode(text, 48, 48), None);
        assert_eq!(extract_barcode("123 456", 44, 48), None);
    }

    #[test]
    fn test_bank_code_requires_full_line() {
        assert_eq!(bank_code_from_line("341"), None);
        assert_eq!(extract_bank_code("Banco Itaú S.A. | 341-7 |"), Some("341".to_string()));
    }

    #[test]
    fn test_extract_pix_payload() {
        let text = "PIX Copia e Cola: 00020126580014BR.GOV.BCB.PIX0136abc\n";
        assert_eq!(
            extract_pix_payload(text),
            Some("00020126580014BR.GOV.BCB.PIX0136abc".to_string())
        );
        let bare = "pague com 00020126360014BR.GOV.BCB.PIX0114+5561999999999";
        assert!(extract_pix_payload(bare).unwrap().starts_with("000201"));
        assert_eq!(extract_pix_payload("sem pix"), None);
    }
}
