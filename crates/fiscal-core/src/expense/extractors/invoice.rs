//! Electronic invoices (NF-e, NF3-e, NFC-e, NFS-e) and transport documents (CT-e).

use crate::expense::rules::patterns::{
    BILLING_PERIOD, CARGO_TYPE, CARGO_WEIGHT, CURRENT_READING, DISCOUNTS, DRIVER, FREIGHT,
    INSURANCE, ISS_RATE, ISS_VALUE, ITEM_LINE, METER_NUMBER, NET_VALUE, PREVIOUS_READING,
    SENDER, SERVICE_DESCRIPTION, VEHICLE_PLATE, VERIFICATION_CODE,
};
use crate::expense::rules::text::collapse_whitespace;
use crate::expense::rules::{
    capture, capture_amount, capture_date, extract_access_key, normalize_brl_value, parse_br_date,
};
use crate::expense::ruleset::PatternRule;
use crate::models::expense::{
    ConsumerInvoiceExpense, ElectricityInvoiceExpense, InvoiceExpense, InvoiceItem,
    ServiceInvoiceExpense, TransportExpense,
};

use super::{extract_header, LabelFallbacks};

/// NF-e.
pub fn extract_invoice(text: &str, rule: &PatternRule, company_id: &str) -> InvoiceExpense {
    InvoiceExpense {
        header: extract_header(text, rule, company_id, LabelFallbacks::default()),
        access_key: extract_access_key(text),
        freight: capture_amount(text, &FREIGHT),
        insurance: capture_amount(text, &INSURANCE),
        discounts: capture_amount(text, &DISCOUNTS),
        items: extract_invoice_items(text),
    }
}

/// NF3-e: the standard invoice plus meter and billing period.
pub fn extract_electricity_invoice(
    text: &str,
    rule: &PatternRule,
    company_id: &str,
) -> ElectricityInvoiceExpense {
    let (period_start, period_end) = billing_period(text);
    ElectricityInvoiceExpense {
        invoice: extract_invoice(text, rule, company_id),
        meter_number: capture(text, &METER_NUMBER),
        period_start,
        period_end,
    }
}

/// NFC-e: the standard invoice.
pub fn extract_consumer_invoice(
    text: &str,
    rule: &PatternRule,
    company_id: &str,
) -> ConsumerInvoiceExpense {
    ConsumerInvoiceExpense {
        invoice: extract_invoice(text, rule, company_id),
    }
}

/// NFS-e. No access key.
pub fn extract_service_invoice(
    text: &str,
    rule: &PatternRule,
    company_id: &str,
) -> ServiceInvoiceExpense {
    ServiceInvoiceExpense {
        header: extract_header(text, rule, company_id, LabelFallbacks::default()),
        verification_code: capture(text, &VERIFICATION_CODE),
        service_description: capture(text, &SERVICE_DESCRIPTION).map(|d| collapse_whitespace(&d)),
        iss_rate: capture_amount(text, &ISS_RATE),
        iss_value: capture_amount(text, &ISS_VALUE),
        discounts: capture_amount(text, &DISCOUNTS),
        net_value: capture_amount(text, &NET_VALUE),
    }
}

/// CT-e. No access key.
pub fn extract_transport(text: &str, rule: &PatternRule, company_id: &str) -> TransportExpense {
    TransportExpense {
        header: extract_header(text, rule, company_id, LabelFallbacks::default()),
        sender: capture(text, &SENDER).map(|s| collapse_whitespace(&s)),
        vehicle: capture(text, &VEHICLE_PLATE).map(|plate| plate.replace('-', "").to_uppercase()),
        cargo_weight: capture_amount(text, &CARGO_WEIGHT),
        cargo_type: capture(text, &CARGO_TYPE).map(|s| collapse_whitespace(&s)),
        driver: capture(text, &DRIVER).map(|s| collapse_whitespace(&s)),
    }
}

/// Item rows laid out as `description quantity unit unit-value total`.
pub(crate) fn extract_invoice_items(text: &str) -> Vec<InvoiceItem> {
    ITEM_LINE
        .captures_iter(text)
        .map(|caps| InvoiceItem {
            description: caps.get(1).map(|m| collapse_whitespace(m.as_str())),
            quantity: caps.get(2).and_then(|m| normalize_brl_value(m.as_str())),
            unit_value: caps.get(3).and_then(|m| normalize_brl_value(m.as_str())),
            item_total: caps.get(4).and_then(|m| normalize_brl_value(m.as_str())),
            taxes: Vec::new(),
        })
        .collect()
}

fn billing_period(text: &str) -> (Option<chrono::NaiveDate>, Option<chrono::NaiveDate>) {
    let start = capture_date(text, &PREVIOUS_READING);
    let end = capture_date(text, &CURRENT_READING);
    if start.is_some() || end.is_some() {
        return (start, end);
    }

    BILLING_PERIOD
        .captures(text)
        .map(|caps| {
            (
                caps.get(1).and_then(|m| parse_br_date(m.as_str())),
                caps.get(2).and_then(|m| parse_br_date(m.as_str())),
            )
        })
        .unwrap_or((None, None))
}
