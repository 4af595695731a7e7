//! Bank slips (boletos) and utility bills (faturas).

use crate::expense::rules::patterns::{
    BENEFICIARY, DISCOUNTS, FINE, GUIDE_DUE_DATE, INTEREST, OUR_NUMBER,
};
use crate::expense::rules::text::collapse_whitespace;
use crate::expense::rules::{
    bank_code_from_line, capture, capture_amount, extract_bank_code, extract_barcode,
    extract_typeable_line,
};
use crate::expense::ruleset::PatternRule;
use crate::models::expense::{BankSlipExpense, BillExpense, BillItem};

use super::invoice::extract_invoice_items;
use super::{extract_header, LabelFallbacks};

/// Digits in a slip barcode.
const SLIP_BARCODE_LEN: usize = 44;

/// Boleto.
pub fn extract_bank_slip(text: &str, rule: &PatternRule, company_id: &str) -> BankSlipExpense {
    let labels = LabelFallbacks {
        due_date: Some(&GUIDE_DUE_DATE),
        ..LabelFallbacks::default()
    };
    let typeable_line = extract_typeable_line(text);
    let issuing_bank = typeable_line
        .as_deref()
        .and_then(bank_code_from_line)
        .or_else(|| extract_bank_code(text));

    BankSlipExpense {
        header: extract_header(text, rule, company_id, labels),
        issuing_bank,
        barcode: extract_barcode(text, SLIP_BARCODE_LEN, SLIP_BARCODE_LEN),
        typeable_line,
        beneficiary: capture(text, &BENEFICIARY).map(|b| collapse_whitespace(&b)),
        our_number: capture(text, &OUR_NUMBER),
        interest: capture_amount(text, &INTEREST),
        fine: capture_amount(text, &FINE),
        discounts: capture_amount(text, &DISCOUNTS),
    }
}

/// Fatura: header plus billed items.
pub fn extract_bill(text: &str, rule: &PatternRule, company_id: &str) -> BillExpense {
    let items = extract_invoice_items(text)
        .into_iter()
        .map(|item| BillItem {
            description: item.description,
            quantity: item.quantity,
            unit_value: item.unit_value,
            item_total: item.item_total,
        })
        .collect();

    BillExpense {
        header: extract_header(text, rule, company_id, LabelFallbacks::default()),
        items,
    }
}
