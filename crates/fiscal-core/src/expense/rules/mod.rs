//! Field extraction primitives for Brazilian fiscal documents.
//!
//! Every primitive returns `None` when a field is absent or unparseable;
//! none of them panic on arbitrary text.

pub mod access_key;
pub mod amounts;
pub mod dates;
pub mod fiscal_id;
pub mod patterns;
pub mod payment;
pub mod text;

pub use access_key::{extract_access_key, is_plausible_access_key};
pub use amounts::{
    capture_amount, default_total_value, extract_value_by_pattern,
    normalize_brl_value, parse_brl_amount, AmountExtractor,
};
pub use dates::{capture_date, default_due_date, extract_date, parse_br_date, DateExtractor};
pub use fiscal_id::{
    default_issuer_cnpj, fiscal_id_kind, format_fiscal_id, is_cnpj_valid, is_cpf_valid,
    validate_fiscal_id, FiscalIdExtractor, FiscalIdKind,
};
pub use payment::{
    bank_code_from_line, extract_bank_code, extract_barcode, extract_pix_payload,
    extract_typeable_line,
};
pub use text::{capture, digits_only, extract_by_pattern, extract_issuer_name};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
