//! Typed extractors, one per expense schema.
//!
//! Each extractor resolves nothing by itself: it receives the already
//! resolved [`PatternRule`] and composes the shared primitives. Fields are
//! filled templated pattern first, then generic heuristic.

mod guide;
mod invoice;
mod slip;

pub use guide::{extract_darf, extract_fgts, extract_gps};
pub use invoice::{
    extract_consumer_invoice, extract_electricity_invoice, extract_invoice,
    extract_service_invoice, extract_transport,
};
pub use slip::{extract_bank_slip, extract_bill};

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use super::rules::{
    capture, capture_amount, capture_date, default_due_date, default_issuer_cnpj,
    default_total_value, digits_only, extract_by_pattern, extract_date, extract_issuer_name,
    extract_value_by_pattern, FieldExtractor, FiscalIdExtractor,
};
use super::ruleset::{PatternRule, RuleResolver, RuleStore};
use super::ExpenseExtractor;
use crate::error::{ExtractionError, Result};
use crate::models::document::Document;
use crate::models::expense::{Expense, ExpenseHeader, ExpenseType};

/// Labeled regexes tried between the templated pattern and the generic
/// heuristic. Tax guides use them; invoices do not.
#[derive(Default, Clone, Copy)]
pub(crate) struct LabelFallbacks<'a> {
    pub due_date: Option<&'a Regex>,
    pub total_value: Option<&'a Regex>,
    pub issuer_id: Option<&'a Regex>,
}

/// Common fields shared by every schema.
pub(crate) fn extract_header(
    text: &str,
    rule: &PatternRule,
    company_id: &str,
    labels: LabelFallbacks<'_>,
) -> ExpenseHeader {
    let issue_date = extract_date(text, &rule.issue_date).or_else(|| default_due_date(text));

    let due_date = extract_date(text, &rule.due_date)
        .or_else(|| labels.due_date.and_then(|regex| capture_date(text, regex)))
        .or_else(|| default_due_date(text));

    let total_value = extract_value_by_pattern(text, &rule.total_value)
        .or_else(|| labels.total_value.and_then(|regex| capture_amount(text, regex)))
        .or_else(|| default_total_value(text));

    let issuer_id = extract_by_pattern(text, &rule.issuer_id)
        .or_else(|| labels.issuer_id.and_then(|regex| capture(text, regex)))
        .or_else(|| default_issuer_cnpj(text))
        .map(|id| digits_only(&id))
        .filter(|id| !id.is_empty());

    let recipient_id = extract_by_pattern(text, &rule.recipient_id)
        .map(|id| digits_only(&id))
        .filter(|id| !id.is_empty())
        .or_else(|| other_party_id(text, issuer_id.as_deref()));

    ExpenseHeader {
        issue_date,
        due_date,
        total_value,
        issuer_name: extract_issuer_name(text, &rule.issuer_name),
        issuer_id,
        recipient_id,
        number: extract_by_pattern(text, &rule.number),
        series: extract_by_pattern(text, &rule.series),
        company_id: Some(company_id.to_string()),
    }
}

/// First checksum-valid CPF/CNPJ that is not the issuer's.
fn other_party_id(text: &str, issuer_id: Option<&str>) -> Option<String> {
    FiscalIdExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .find(|id| Some(id.as_str()) != issuer_id)
}

/// Run the typed extractor of `expense_type` with an already resolved rule.
pub fn extract_with_rule(
    expense_type: ExpenseType,
    text: &str,
    rule: &PatternRule,
    company_id: &str,
) -> std::result::Result<Expense, ExtractionError> {
    let expense = match expense_type {
        ExpenseType::Nfe => Expense::Invoice(extract_invoice(text, rule, company_id)),
        ExpenseType::Nf3e => {
            Expense::ElectricityInvoice(extract_electricity_invoice(text, rule, company_id))
        }
        ExpenseType::Nfce => Expense::ConsumerInvoice(extract_consumer_invoice(text, rule, company_id)),
        ExpenseType::Nfse => Expense::ServiceInvoice(extract_service_invoice(text, rule, company_id)),
        ExpenseType::Cte => Expense::Transport(extract_transport(text, rule, company_id)),
        ExpenseType::Boleto => Expense::BankSlip(extract_bank_slip(text, rule, company_id)),
        ExpenseType::Fatura => Expense::Bill(extract_bill(text, rule, company_id)),
        ExpenseType::Darf => Expense::Darf(extract_darf(text, rule, company_id)),
        ExpenseType::Fgts => Expense::Fgts(extract_fgts(text, rule, company_id)),
        ExpenseType::Gps => Expense::Gps(extract_gps(text, rule, company_id)),
        ExpenseType::Outro => return Err(ExtractionError::Unclassified),
    };
    Ok(expense)
}

/// Regex-driven extractor backed by a rule resolver.
#[derive(Clone)]
pub struct RuleBasedExtractor {
    resolver: Arc<dyn RuleResolver>,
}

impl RuleBasedExtractor {
    /// Create an extractor over the given resolver.
    pub fn new(resolver: Arc<dyn RuleResolver>) -> Self {
        Self { resolver }
    }

    /// Extract synchronously.
    pub fn extract_document(&self, document: &Document) -> std::result::Result<Expense, ExtractionError> {
        info!(
            "Extracting {} from {} characters of text",
            document.expense_type,
            document.text.len()
        );

        if !document.expense_type.has_schema() {
            return Err(ExtractionError::Unclassified);
        }

        let rule = self
            .resolver
            .lookup(document.expense_type, &document.region_code)?;
        let expense = extract_with_rule(
            document.expense_type,
            &document.text,
            &rule,
            &document.company_id,
        )?;

        debug!(
            "Extracted {} number={:?} total={:?}",
            expense.expense_type(),
            expense.header().number,
            expense.header().total_value
        );
        Ok(expense)
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new(Arc::new(RuleStore::with_defaults()))
    }
}

#[async_trait]
impl ExpenseExtractor for RuleBasedExtractor {
    async fn extract(&self, document: &Document) -> Result<Expense> {
        Ok(self.extract_document(document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const SLIP: &str = "\
Banco Itaú S.A. | 341-7 |
34191.79001 01043.510047 91020.150008 1 96610000012345
Beneficiário: ACME SERVICOS LTDA CNPJ 11.222.333/0001-81
Pagador: JOAO DA SILVA CPF 529.982.247-25
Data do Documento: 02/01/2025
Vencimento: 10/01/2025
Nosso Número: 109/00012345-6
Número do Documento: 4521
Valor do Documento: R$ 123,45
Juros/Mora: R$ 0,50
Multa: R$ 2,00
";

    #[test]
    fn test_slip_document_yields_slip_schema() {
        let document = Document::new(SLIP, ExpenseType::Boleto, "3550308", "acme");
        let expense = RuleBasedExtractor::default().extract_document(&document).unwrap();

        assert_eq!(expense.expense_type(), ExpenseType::Boleto);
        let Expense::BankSlip(slip) = &expense else {
            panic!("expected bank slip, got {:?}", expense.expense_type());
        };
        assert_eq!(slip.header.total_value, Some(Decimal::new(12345, 2)));
        assert_eq!(slip.header.due_date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(slip.header.issuer_id.as_deref(), Some("11222333000181"));
        assert_eq!(slip.header.recipient_id.as_deref(), Some("52998224725"));
        assert_eq!(slip.header.number.as_deref(), Some("4521"));
        assert_eq!(slip.header.company_id.as_deref(), Some("acme"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let document = Document::new(SLIP, ExpenseType::Boleto, "3550308", "acme");
        let extractor = RuleBasedExtractor::default();
        let first = extractor.extract_document(&document).unwrap();
        let second = extractor.extract_document(&document).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_heuristic_fallbacks_when_patterns_miss() {
        let text = "Documento 05/02/2025 e 01/02/2025\nTotal geral 2.500,00 frete 100,00\n11.222.333/0001-81";
        let header = extract_header(text, &PatternRule::default(), "acme", LabelFallbacks::default());

        assert_eq!(header.issue_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(header.due_date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(header.total_value, Some(Decimal::new(250000, 2)));
        assert_eq!(header.issuer_id.as_deref(), Some("11222333000181"));
        assert_eq!(header.number, None);
        assert_eq!(header.series, None);
    }

    #[test]
    fn test_empty_text_yields_empty_header() {
        let header = extract_header("", &PatternRule::default(), "acme", LabelFallbacks::default());
        assert_eq!(
            header,
            ExpenseHeader {
                company_id: Some("acme".to_string()),
                ..ExpenseHeader::default()
            }
        );
    }

    #[test]
    fn test_outro_is_unclassified() {
        let document = Document::new("qualquer", ExpenseType::Outro, "DEFAULT", "acme");
        assert_eq!(
            RuleBasedExtractor::default().extract_document(&document),
            Err(ExtractionError::Unclassified)
        );
    }

    #[test]
    fn test_unresolved_rules_surface() {
        let extractor = RuleBasedExtractor::new(Arc::new(RuleStore::new()));
        let document = Document::new(SLIP, ExpenseType::Boleto, "3550308", "acme");
        assert!(matches!(
            extractor.extract_document(&document),
            Err(ExtractionError::UnresolvedRuleSet { .. })
        ));
    }
}
