//! Expense records produced from Brazilian fiscal documents.
//!
//! Every expense shares an [`ExpenseHeader`] and adds the fields of its
//! schema. The schema is fixed by the enum variant, so the type tag can
//! never disagree with the shape.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::GenerativeError;

/// Category of a fiscal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseType {
    /// Electronic invoice for goods (NF-e).
    Nfe,
    /// Electronic service invoice (NFS-e).
    Nfse,
    /// Electronic consumer invoice (NFC-e).
    Nfce,
    /// Electronic electricity invoice (NF3-e).
    Nf3e,
    /// Electronic transport document (CT-e).
    Cte,
    /// Bank slip.
    Boleto,
    /// Utility bill.
    Fatura,
    /// Federal revenue collection guide.
    Darf,
    /// FGTS collection guide.
    Fgts,
    /// Social security guide.
    Gps,
    /// Unclassified document.
    Outro,
}

impl ExpenseType {
    /// Every type that has an expense schema (all but `Outro`).
    pub const SCHEMAS: [ExpenseType; 10] = [
        ExpenseType::Nfe,
        ExpenseType::Nfse,
        ExpenseType::Nfce,
        ExpenseType::Nf3e,
        ExpenseType::Cte,
        ExpenseType::Boleto,
        ExpenseType::Fatura,
        ExpenseType::Darf,
        ExpenseType::Fgts,
        ExpenseType::Gps,
    ];

    /// Canonical upper-case code.
    pub fn code(&self) -> &'static str {
        match self {
            ExpenseType::Nfe => "NFE",
            ExpenseType::Nfse => "NFSE",
            ExpenseType::Nfce => "NFCE",
            ExpenseType::Nf3e => "NF3E",
            ExpenseType::Cte => "CTE",
            ExpenseType::Boleto => "BOLETO",
            ExpenseType::Fatura => "FATURA",
            ExpenseType::Darf => "DARF",
            ExpenseType::Fgts => "FGTS",
            ExpenseType::Gps => "GPS",
            ExpenseType::Outro => "OUTRO",
        }
    }

    /// Whether the type has an expense schema.
    pub fn has_schema(&self) -> bool {
        *self != ExpenseType::Outro
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        ExpenseType::SCHEMAS
            .iter()
            .chain(std::iter::once(&ExpenseType::Outro))
            .find(|t| t.code() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown expense type: {s}"))
    }
}

/// Fields common to every expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseHeader {
    /// Issue date.
    #[serde(default, deserialize_with = "lenient::date")]
    pub issue_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(default, deserialize_with = "lenient::date")]
    pub due_date: Option<NaiveDate>,

    /// Total value of the document.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_value: Option<Decimal>,

    /// Issuer name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub issuer_name: Option<String>,

    /// Issuer CPF/CNPJ, digits only.
    #[serde(default, deserialize_with = "lenient::text")]
    pub issuer_id: Option<String>,

    /// Recipient CPF/CNPJ, digits only.
    #[serde(default, deserialize_with = "lenient::text")]
    pub recipient_id: Option<String>,

    /// Document number.
    #[serde(default, deserialize_with = "lenient::text")]
    pub number: Option<String>,

    /// Document series.
    #[serde(default, deserialize_with = "lenient::text")]
    pub series: Option<String>,

    /// Owning company.
    #[serde(default, deserialize_with = "lenient::text")]
    pub company_id: Option<String>,
}

/// Tax applied to an invoice item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTax {
    /// Tax name (ICMS, IPI, PIS, COFINS...).
    #[serde(default, deserialize_with = "lenient::text")]
    pub tax_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub value: Option<Decimal>,
}

/// Invoice line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub quantity: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub unit_value: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub item_total: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub taxes: Vec<ItemTax>,
}

/// NF-e: invoice for goods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    /// 44-digit fiscal access key.
    #[serde(default, deserialize_with = "lenient::text")]
    pub access_key: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub freight: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub insurance: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub discounts: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub items: Vec<InvoiceItem>,
}

/// NF3-e: electricity invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityInvoiceExpense {
    #[serde(flatten)]
    pub invoice: InvoiceExpense,

    #[serde(default, deserialize_with = "lenient::text")]
    pub meter_number: Option<String>,

    /// First day of the billed consumption period.
    #[serde(default, deserialize_with = "lenient::date")]
    pub period_start: Option<NaiveDate>,

    /// Last day of the billed consumption period.
    #[serde(default, deserialize_with = "lenient::date")]
    pub period_end: Option<NaiveDate>,
}

/// NFC-e: consumer invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerInvoiceExpense {
    #[serde(flatten)]
    pub invoice: InvoiceExpense,
}

/// NFS-e: service invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInvoiceExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    #[serde(default, deserialize_with = "lenient::text")]
    pub verification_code: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub service_description: Option<String>,

    /// ISS rate in percent.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub iss_rate: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub iss_value: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub discounts: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub net_value: Option<Decimal>,
}

/// CT-e: transport document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    #[serde(default, deserialize_with = "lenient::text")]
    pub sender: Option<String>,

    /// Vehicle plate.
    #[serde(default, deserialize_with = "lenient::text")]
    pub vehicle: Option<String>,

    /// Cargo weight in kilograms.
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cargo_weight: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub cargo_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub driver: Option<String>,
}

/// Boleto: bank slip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSlipExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    /// Three-digit code of the issuing bank.
    #[serde(default, deserialize_with = "lenient::text")]
    pub issuing_bank: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub barcode: Option<String>,

    /// Typeable line (linha digitável), digits only.
    #[serde(default, deserialize_with = "lenient::text")]
    pub typeable_line: Option<String>,

    /// Beneficiary (cedente).
    #[serde(default, deserialize_with = "lenient::text")]
    pub beneficiary: Option<String>,

    /// Bank-assigned slip identifier (nosso número).
    #[serde(default, deserialize_with = "lenient::text")]
    pub our_number: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub interest: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fine: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub discounts: Option<Decimal>,
}

/// Utility bill line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub quantity: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub unit_value: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub item_total: Option<Decimal>,
}

/// Fatura: utility bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    #[serde(default, deserialize_with = "lenient::list")]
    pub items: Vec<BillItem>,
}

/// One revenue line of a DARF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DarfTaxLine {
    /// Four-digit revenue code.
    #[serde(default, deserialize_with = "lenient::text")]
    pub revenue_code: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub principal: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fine: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub interest: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total: Option<Decimal>,
}

/// DARF: federal revenue collection guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DarfExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    #[serde(default, deserialize_with = "lenient::text")]
    pub taxpayer_name: Option<String>,

    /// Assessment period, e.g. `12/2024` or `dez/2024`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub assessment_period: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub document_number: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub receipt_number: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub barcode: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub pix_payload: Option<String>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub composition: Vec<DarfTaxLine>,
}

/// One competence line of an FGTS guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FgtsCompetence {
    /// Competence month, `MM/yyyy`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub competence: Option<String>,

    #[serde(default, deserialize_with = "lenient::count")]
    pub worker_count: Option<u32>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub payroll: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fgts_value: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total: Option<Decimal>,
}

/// FGTS: employer severance fund collection guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FgtsExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    #[serde(default, deserialize_with = "lenient::text")]
    pub employer_name: Option<String>,

    /// Guide identifier, `dddddddddddddddd-d`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub identifier: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub barcode: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub pix_payload: Option<String>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub composition: Vec<FgtsCompetence>,
}

/// GPS: social security guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsExpense {
    #[serde(flatten)]
    pub header: ExpenseHeader,

    #[serde(default, deserialize_with = "lenient::text")]
    pub taxpayer_name: Option<String>,

    /// Four-digit payment code.
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_code: Option<String>,

    /// Competence month, `MM/yyyy`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub competence: Option<String>,

    /// CEI or NIT of the contributor.
    #[serde(default, deserialize_with = "lenient::text")]
    pub identifier: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub barcode: Option<String>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub pix_payload: Option<String>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub inss_value: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub other_entities_value: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub monetary_update: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub interest: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fine: Option<Decimal>,
}

/// An extracted expense, one variant per schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expenseType")]
pub enum Expense {
    #[serde(rename = "NFE")]
    Invoice(InvoiceExpense),
    #[serde(rename = "NF3E")]
    ElectricityInvoice(ElectricityInvoiceExpense),
    #[serde(rename = "NFCE")]
    ConsumerInvoice(ConsumerInvoiceExpense),
    #[serde(rename = "NFSE")]
    ServiceInvoice(ServiceInvoiceExpense),
    #[serde(rename = "CTE")]
    Transport(TransportExpense),
    #[serde(rename = "BOLETO")]
    BankSlip(BankSlipExpense),
    #[serde(rename = "FATURA")]
    Bill(BillExpense),
    #[serde(rename = "DARF")]
    Darf(DarfExpense),
    #[serde(rename = "FGTS")]
    Fgts(FgtsExpense),
    #[serde(rename = "GPS")]
    Gps(GpsExpense),
}

impl Expense {
    /// An expense of the given type with every field absent.
    ///
    /// Returns `None` for `Outro`, which has no schema.
    pub fn empty(expense_type: ExpenseType) -> Option<Self> {
        let expense = match expense_type {
            ExpenseType::Nfe => Expense::Invoice(Default::default()),
            ExpenseType::Nf3e => Expense::ElectricityInvoice(Default::default()),
            ExpenseType::Nfce => Expense::ConsumerInvoice(Default::default()),
            ExpenseType::Nfse => Expense::ServiceInvoice(Default::default()),
            ExpenseType::Cte => Expense::Transport(Default::default()),
            ExpenseType::Boleto => Expense::BankSlip(Default::default()),
            ExpenseType::Fatura => Expense::Bill(Default::default()),
            ExpenseType::Darf => Expense::Darf(Default::default()),
            ExpenseType::Fgts => Expense::Fgts(Default::default()),
            ExpenseType::Gps => Expense::Gps(Default::default()),
            ExpenseType::Outro => return None,
        };
        Some(expense)
    }

    /// Decode the JSON object returned by a generative backend into the
    /// schema of `expense_type`.
    pub fn from_generated_json(
        expense_type: ExpenseType,
        value: serde_json::Value,
    ) -> Result<Self, GenerativeError> {
        let schema_error = |e: serde_json::Error| GenerativeError::Schema {
            expense_type,
            reason: e.to_string(),
        };
        let expense = match expense_type {
            ExpenseType::Nfe => Expense::Invoice(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Nf3e => {
                Expense::ElectricityInvoice(serde_json::from_value(value).map_err(schema_error)?)
            }
            ExpenseType::Nfce => {
                Expense::ConsumerInvoice(serde_json::from_value(value).map_err(schema_error)?)
            }
            ExpenseType::Nfse => {
                Expense::ServiceInvoice(serde_json::from_value(value).map_err(schema_error)?)
            }
            ExpenseType::Cte => Expense::Transport(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Boleto => Expense::BankSlip(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Fatura => Expense::Bill(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Darf => Expense::Darf(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Fgts => Expense::Fgts(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Gps => Expense::Gps(serde_json::from_value(value).map_err(schema_error)?),
            ExpenseType::Outro => {
                return Err(GenerativeError::Schema {
                    expense_type,
                    reason: "unclassified documents have no schema".to_string(),
                });
            }
        };
        Ok(expense)
    }

    /// Type tag of this expense.
    pub fn expense_type(&self) -> ExpenseType {
        match self {
            Expense::Invoice(_) => ExpenseType::Nfe,
            Expense::ElectricityInvoice(_) => ExpenseType::Nf3e,
            Expense::ConsumerInvoice(_) => ExpenseType::Nfce,
            Expense::ServiceInvoice(_) => ExpenseType::Nfse,
            Expense::Transport(_) => ExpenseType::Cte,
            Expense::BankSlip(_) => ExpenseType::Boleto,
            Expense::Bill(_) => ExpenseType::Fatura,
            Expense::Darf(_) => ExpenseType::Darf,
            Expense::Fgts(_) => ExpenseType::Fgts,
            Expense::Gps(_) => ExpenseType::Gps,
        }
    }

    /// Common fields.
    pub fn header(&self) -> &ExpenseHeader {
        match self {
            Expense::Invoice(e) => &e.header,
            Expense::ElectricityInvoice(e) => &e.invoice.header,
            Expense::ConsumerInvoice(e) => &e.invoice.header,
            Expense::ServiceInvoice(e) => &e.header,
            Expense::Transport(e) => &e.header,
            Expense::BankSlip(e) => &e.header,
            Expense::Bill(e) => &e.header,
            Expense::Darf(e) => &e.header,
            Expense::Fgts(e) => &e.header,
            Expense::Gps(e) => &e.header,
        }
    }

    /// Common fields, mutably.
    pub fn header_mut(&mut self) -> &mut ExpenseHeader {
        match self {
            Expense::Invoice(e) => &mut e.header,
            Expense::ElectricityInvoice(e) => &mut e.invoice.header,
            Expense::ConsumerInvoice(e) => &mut e.invoice.header,
            Expense::ServiceInvoice(e) => &mut e.header,
            Expense::Transport(e) => &mut e.header,
            Expense::BankSlip(e) => &mut e.header,
            Expense::Bill(e) => &mut e.header,
            Expense::Darf(e) => &mut e.header,
            Expense::Fgts(e) => &mut e.header,
            Expense::Gps(e) => &mut e.header,
        }
    }

    /// Access key, for the invoice schemas that carry one.
    pub fn access_key(&self) -> Option<&str> {
        match self {
            Expense::Invoice(e) => e.access_key.as_deref(),
            Expense::ElectricityInvoice(e) => e.invoice.access_key.as_deref(),
            Expense::ConsumerInvoice(e) => e.invoice.access_key.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_expense_type_codes() {
        assert_eq!(ExpenseType::Nf3e.to_string(), "NF3E");
        assert_eq!("nfs-e".parse::<ExpenseType>(), Ok(ExpenseType::Nfse));
        assert_eq!("Boleto".parse::<ExpenseType>(), Ok(ExpenseType::Boleto));
        assert!("recibo".parse::<ExpenseType>().is_err());
        assert_eq!(
            serde_json::to_value(ExpenseType::Nf3e).unwrap(),
            json!("NF3E")
        );
    }

    #[test]
    fn test_empty_matches_tag() {
        for expense_type in ExpenseType::SCHEMAS {
            let expense = Expense::empty(expense_type).unwrap();
            assert_eq!(expense.expense_type(), expense_type);
        }
        assert!(Expense::empty(ExpenseType::Outro).is_none());
    }

    #[test]
    fn test_serialized_tag_and_flattened_header() {
        let mut expense = Expense::empty(ExpenseType::Boleto).unwrap();
        expense.header_mut().number = Some("123".to_string());

        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(value["expenseType"], json!("BOLETO"));
        assert_eq!(value["number"], json!("123"));
        assert_eq!(value["issuerId"], json!(null));
    }

    #[test]
    fn test_from_generated_json_lenient_values() {
        let value = json!({
            "issueDate": "15/03/2025",
            "dueDate": "0000-00-00",
            "totalValue": "1.234,56",
            "issuerName": "ACME LTDA",
            "accessKey": "35250311222333000181550010000001231000001234",
            "freight": 10.5,
            "items": null
        });

        let expense = Expense::from_generated_json(ExpenseType::Nfe, value).unwrap();
        let Expense::Invoice(invoice) = &expense else {
            panic!("expected invoice, got {:?}", expense.expense_type());
        };

        assert_eq!(invoice.header.issue_date, NaiveDate::from_ymd_opt(2025, 3, 15));
        assert_eq!(invoice.header.due_date, None);
        assert_eq!(invoice.header.total_value, Some(Decimal::new(123456, 2)));
        assert_eq!(invoice.freight, Some(Decimal::new(105, 1)));
        assert!(invoice.items.is_empty());
    }

    #[test]
    fn test_from_generated_json_nested_composition() {
        let value = json!({
            "composition": [
                {"competence": "01/2025", "workerCount": "3", "payroll": "9.000,00", "fgtsValue": "720,00"}
            ]
        });

        let expense = Expense::from_generated_json(ExpenseType::Fgts, value).unwrap();
        let Expense::Fgts(fgts) = expense else {
            panic!("expected FGTS guide");
        };
        assert_eq!(fgts.composition[0].worker_count, Some(3));
        assert_eq!(fgts.composition[0].fgts_value, Some(Decimal::new(72000, 2)));
    }

    #[test]
    fn test_from_generated_json_scalar_text_fields() {
        let value = json!({
            "number": 123,
            "series": 1,
            "totalValue": "10,00",
            "issuerName": "  ",
            "issuerId": null
        });

        let expense = Expense::from_generated_json(ExpenseType::Nfe, value).unwrap();
        let header = expense.header();
        assert_eq!(header.number.as_deref(), Some("123"));
        assert_eq!(header.series.as_deref(), Some("1"));
        assert_eq!(header.total_value, Some(Decimal::new(1000, 2)));
        assert_eq!(header.issuer_name, None);
        assert_eq!(header.issuer_id, None);

        let value = json!({"ourNumber": 42, "issuingBank": "341"});
        let Expense::BankSlip(slip) = Expense::from_generated_json(ExpenseType::Boleto, value).unwrap()
        else {
            panic!("expected bank slip");
        };
        assert_eq!(slip.our_number.as_deref(), Some("42"));
        assert_eq!(slip.issuing_bank.as_deref(), Some("341"));

        let value = json!({"paymentCode": 2100, "competence": "03/2025"});
        let Expense::Gps(gps) = Expense::from_generated_json(ExpenseType::Gps, value).unwrap() else {
            panic!("expected GPS guide");
        };
        assert_eq!(gps.payment_code.as_deref(), Some("2100"));
    }

    #[test]
    fn test_from_generated_json_rejects_outro() {
        let result = Expense::from_generated_json(ExpenseType::Outro, json!({}));
        assert!(matches!(result, Err(GenerativeError::Schema { .. })));
    }

    #[test]
    fn test_json_roundtrip_keeps_variant() {
        let mut expense = Expense::empty(ExpenseType::Nf3e).unwrap();
        expense.header_mut().total_value = Some(Decimal::new(9990, 2));

        let text = serde_json::to_string(&expense).unwrap();
        let back: Expense = serde_json::from_str(&text).unwrap();
        assert_eq!(back, expense);
    }
}
