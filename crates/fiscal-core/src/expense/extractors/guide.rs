//! Federal tax guides: DARF, FGTS and GPS.
//!
//! Guides rarely carry the labels a regional rule set targets, so each one
//! plugs its own labeled fallbacks into the shared header and pins the
//! issuer name to the collecting agency.

use rust_decimal::Decimal;

use crate::expense::rules::patterns::{
    DARF_DOCUMENT_NUMBER, DARF_ISSUER_ID, DARF_PERIOD, DARF_RECEIPT_NUMBER, DARF_TAX_LINE,
    DARF_TOTAL, FGTS_COMPETENCE_LINE, FGTS_IDENTIFIER, FGTS_ISSUER_ID, FGTS_TOTAL, FINE,
    GPS_COMPETENCE, GPS_IDENTIFIER, GPS_INSS, GPS_ISSUER_ID, GPS_MONETARY_UPDATE,
    GPS_OTHER_ENTITIES, GPS_PAYMENT_CODE, GPS_TOTAL, GUIDE_DUE_DATE, GUIDE_PAYER_NAME, INTEREST,
};
use crate::expense::rules::payment::COLLECTION_LINE_LEN;
use crate::expense::rules::text::collapse_whitespace;
use crate::expense::rules::{
    capture, capture_amount, extract_barcode, extract_pix_payload, extract_typeable_line,
    normalize_brl_value,
};
use crate::expense::ruleset::PatternRule;
use crate::models::expense::{DarfExpense, DarfTaxLine, FgtsCompetence, FgtsExpense, GpsExpense};

use super::{extract_header, LabelFallbacks};

const DARF_ISSUER: &str = "Receita Federal do Brasil";
const FGTS_ISSUER: &str = "Caixa Econômica Federal";
const GPS_ISSUER: &str = "Receita Federal do Brasil - INSS";

/// DARF.
pub fn extract_darf(text: &str, rule: &PatternRule, company_id: &str) -> DarfExpense {
    let labels = LabelFallbacks {
        due_date: Some(&GUIDE_DUE_DATE),
        total_value: Some(&DARF_TOTAL),
        issuer_id: Some(&DARF_ISSUER_ID),
    };
    let mut header = extract_header(text, rule, company_id, labels);
    header.issuer_name = Some(DARF_ISSUER.to_string());

    DarfExpense {
        header,
        taxpayer_name: payer_name(text),
        assessment_period: capture(text, &DARF_PERIOD),
        document_number: capture(text, &DARF_DOCUMENT_NUMBER),
        receipt_number: capture(text, &DARF_RECEIPT_NUMBER),
        barcode: guide_barcode(text, COLLECTION_LINE_LEN),
        pix_payload: extract_pix_payload(text),
        composition: darf_composition(text),
    }
}

/// FGTS.
pub fn extract_fgts(text: &str, rule: &PatternRule, company_id: &str) -> FgtsExpense {
    let labels = LabelFallbacks {
        due_date: Some(&GUIDE_DUE_DATE),
        total_value: Some(&FGTS_TOTAL),
        issuer_id: Some(&FGTS_ISSUER_ID),
    };
    let mut header = extract_header(text, rule, company_id, labels);
    header.issuer_name = Some(FGTS_ISSUER.to_string());

    FgtsExpense {
        header,
        employer_name: payer_name(text),
        identifier: capture(text, &FGTS_IDENTIFIER),
        barcode: guide_barcode(text, 44),
        pix_payload: extract_pix_payload(text),
        composition: fgts_composition(text),
    }
}

/// GPS.
pub fn extract_gps(text: &str, rule: &PatternRule, company_id: &str) -> GpsExpense {
    let labels = LabelFallbacks {
        due_date: Some(&GUIDE_DUE_DATE),
        total_value: Some(&GPS_TOTAL),
        issuer_id: Some(&GPS_ISSUER_ID),
    };
    let mut header = extract_header(text, rule, company_id, labels);
    header.issuer_name = Some(GPS_ISSUER.to_string());

    GpsExpense {
        header,
        taxpayer_name: payer_name(text),
        payment_code: capture(text, &GPS_PAYMENT_CODE),
        competence: capture(text, &GPS_COMPETENCE),
        identifier: capture(text, &GPS_IDENTIFIER),
        barcode: guide_barcode(text, COLLECTION_LINE_LEN),
        pix_payload: extract_pix_payload(text),
        inss_value: capture_amount(text, &GPS_INSS),
        other_entities_value: capture_amount(text, &GPS_OTHER_ENTITIES),
        monetary_update: capture_amount(text, &GPS_MONETARY_UPDATE),
        interest: capture_amount(text, &INTEREST),
        fine: capture_amount(text, &FINE),
    }
}

fn payer_name(text: &str) -> Option<String> {
    capture(text, &GUIDE_PAYER_NAME).map(|name| collapse_whitespace(&name))
}

/// Collection line when printed, else the first digit run of `min..=48` digits.
fn guide_barcode(text: &str, min: usize) -> Option<String> {
    extract_typeable_line(text)
        .filter(|line| line.len() == COLLECTION_LINE_LEN)
        .or_else(|| extract_barcode(text, min, COLLECTION_LINE_LEN))
}

fn darf_composition(text: &str) -> Vec<DarfTaxLine> {
    DARF_TAX_LINE
        .captures_iter(text)
        .map(|caps| {
            let amount = |i: usize| caps.get(i).and_then(|m| normalize_brl_value(m.as_str()));
            let principal = amount(3);
            let fine = amount(4);
            let interest = amount(5);
            let total = amount(6).or_else(|| {
                principal.map(|p| p + fine.unwrap_or(Decimal::ZERO) + interest.unwrap_or(Decimal::ZERO))
            });

            DarfTaxLine {
                revenue_code: caps.get(1).map(|m| m.as_str().to_string()),
                description: caps.get(2).map(|m| collapse_whitespace(m.as_str())),
                principal,
                fine,
                interest,
                total,
            }
        })
        .collect()
}

fn fgts_composition(text: &str) -> Vec<FgtsCompetence> {
    FGTS_COMPETENCE_LINE
        .captures_iter(text)
        .map(|caps| {
            let payroll = caps.get(3).and_then(|m| normalize_brl_value(m.as_str()));
            let fgts_value = caps.get(4).and_then(|m| normalize_brl_value(m.as_str()));
            let total = match (payroll, fgts_value) {
                (Some(payroll), Some(fgts)) => Some(payroll + fgts),
                _ => None,
            };

            FgtsCompetence {
                competence: caps.get(1).map(|m| m.as_str().to_string()),
                worker_count: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                payroll,
                fgts_value,
                total,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::ruleset::default_rule;
    use crate::models::expense::ExpenseType;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const DARF: &str = "\
MINISTÉRIO DA FAZENDA
Documento de Arrecadação de Receitas Federais - DARF
Nome: ACME INDUSTRIA LTDA
CNPJ: 11.222.333/0001-81
Período de Apuração: 12/2024
Data de Vencimento: 20/01/2025
Número do Documento: 07202501234567890
0561 - IRRF RENDIMENTOS DO TRABALHO - Principal: 1.000,00 Multa: 20,00 Juros: 10,00 Total: 1.030,00
1708 - IRRF SERVICOS - Principal: 500,00
Valor Total: 1.535,00
";

    #[test]
    fn test_extract_darf() {
        let darf = extract_darf(DARF, &default_rule(ExpenseType::Darf), "acme");

        assert_eq!(darf.header.issuer_name.as_deref(), Some(DARF_ISSUER));
        assert_eq!(darf.header.issuer_id.as_deref(), Some("11222333000181"));
        assert_eq!(darf.header.due_date, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(darf.header.total_value, Some(Decimal::new(153500, 2)));
        assert_eq!(darf.taxpayer_name.as_deref(), Some("ACME INDUSTRIA LTDA"));
        assert_eq!(darf.assessment_period.as_deref(), Some("12/2024"));
        assert_eq!(darf.document_number.as_deref(), Some("07202501234567890"));
        assert_eq!(darf.receipt_number, None);
        assert_eq!(
            darf.composition,
            vec![
                DarfTaxLine {
                    revenue_code: Some("0561".to_string()),
                    description: Some("IRRF RENDIMENTOS DO TRABALHO".to_string()),
                    principal: Some(Decimal::new(100000, 2)),
                    fine: Some(Decimal::new(2000, 2)),
                    interest: Some(Decimal::new(1000, 2)),
                    total: Some(Decimal::new(103000, 2)),
                },
                DarfTaxLine {
                    revenue_code: Some("1708".to_string()),
                    description: Some("IRRF SERVICOS".to_string()),
                    principal: Some(Decimal::new(50000, 2)),
                    fine: None,
                    interest: None,
                    total: Some(Decimal::new(50000, 2)),
                },
            ]
        );
    }

    #[test]
    fn test_extract_fgts() {
        let text = "\
GUIA DO FGTS DIGITAL - GFD
Razão Social: ACME INDUSTRIA LTDA
CNPJ: 11.222.333/0001-81
Identificador: 1234567890123456-7
Vencimento: 20/02/2025
01/2025 - 12 trabalhadores Remuneração: 50.000,00 FGTS: 4.000,00
Total a Recolher: R$ 4.000,00
";
        let fgts = extract_fgts(text, &default_rule(ExpenseType::Fgts), "acme");

        assert_eq!(fgts.header.issuer_name.as_deref(), Some(FGTS_ISSUER));
        assert_eq!(fgts.header.issuer_id.as_deref(), Some("11222333000181"));
        assert_eq!(fgts.header.due_date, NaiveDate::from_ymd_opt(2025, 2, 20));
        assert_eq!(fgts.header.total_value, Some(Decimal::new(400000, 2)));
        assert_eq!(fgts.employer_name.as_deref(), Some("ACME INDUSTRIA LTDA"));
        assert_eq!(fgts.identifier.as_deref(), Some("1234567890123456-7"));
        assert_eq!(fgts.composition.len(), 1);

        let competence = &fgts.composition[0];
        assert_eq!(competence.competence.as_deref(), Some("01/2025"));
        assert_eq!(competence.worker_count, Some(12));
        assert_eq!(competence.payroll, Some(Decimal::new(5000000, 2)));
        assert_eq!(competence.fgts_value, Some(Decimal::new(400000, 2)));
        assert_eq!(competence.total, Some(Decimal::new(5400000, 2)));
    }

    #[test]
    fn test_extract_gps() {
        let text = "\
GUIA DA PREVIDÊNCIA SOCIAL - GPS
Nome: ACME INDUSTRIA LTDA
Código de Pagamento: 2100
Competência: 01/2025
Identificador CNPJ: 11.222.333/0001-81
Vencimento: 20/02/2025
Valor do INSS: 1.200,00
Valor de Outras Entidades: 300,00
Atualização Monetária: 0,00
Juros: 12,00
Multa: 24,00
Total a Pagar: 1.536,00
";
        let gps = extract_gps(text, &default_rule(ExpenseType::Gps), "acme");

        assert_eq!(gps.header.issuer_name.as_deref(), Some(GPS_ISSUER));
        assert_eq!(gps.header.issuer_id.as_deref(), Some("11222333000181"));
        assert_eq!(gps.header.total_value, Some(Decimal::new(153600, 2)));
        assert_eq!(gps.taxpayer_name.as_deref(), Some("ACME INDUSTRIA LTDA"));
        assert_eq!(gps.payment_code.as_deref(), Some("2100"));
        assert_eq!(gps.competence.as_deref(), Some("01/2025"));
        assert_eq!(gps.inss_value, Some(Decimal::new(120000, 2)));
        assert_eq!(gps.other_entities_value, Some(Decimal::new(30000, 2)));
        assert_eq!(gps.monetary_update, Some(Decimal::ZERO));
        assert_eq!(gps.interest, Some(Decimal::new(1200, 2)));
        assert_eq!(gps.fine, Some(Decimal::new(2400, 2)));
    }

    #[test]
    fn test_guide_barcode_prefers_collection_line() {
        let text = "85890000001-2 23450328211-5 12345678901-2 34567890123-4";
        assert_eq!(guide_barcode(text, 44).map(|b| b.len()), Some(COLLECTION_LINE_LEN));
        assert_eq!(guide_barcode("sem código", 44), None);
    }
}
