//! Input document handed to the engine.

use serde::{Deserialize, Serialize};

use super::expense::ExpenseType;
use crate::expense::classifier::classify;

/// Text extracted from an attachment, together with its owner.
///
/// Documents are read-only for the engine; extractors never mutate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full extracted text.
    pub text: String,

    /// Declared or classified expense type.
    pub expense_type: ExpenseType,

    /// Region (IBGE municipality) code of the owning company.
    pub region_code: String,

    /// Owning company identifier.
    pub company_id: String,
}

impl Document {
    /// Create a document with an already known expense type.
    pub fn new(
        text: impl Into<String>,
        expense_type: ExpenseType,
        region_code: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            expense_type,
            region_code: region_code.into(),
            company_id: company_id.into(),
        }
    }

    /// Create a document and classify its text.
    pub fn classified(
        text: impl Into<String>,
        region_code: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let expense_type = classify(&text);
        Self::new(text, expense_type, region_code, company_id)
    }

    /// Length of the text in characters, ignoring surrounding whitespace.
    pub fn text_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_document() {
        let doc = Document::classified("Boleto bancário - Nosso Número 123", "3550308", "acme");
        assert_eq!(doc.expense_type, ExpenseType::Boleto);
        assert_eq!(doc.region_code, "3550308");
    }

    #[test]
    fn test_text_len_ignores_padding() {
        let doc = Document::new("  abc \n", ExpenseType::Outro, "DEFAULT", "acme");
        assert_eq!(doc.text_len(), 3);
    }
}
