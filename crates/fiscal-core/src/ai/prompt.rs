//! Prompt construction for generative extraction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::expense::{
    BillItem, DarfTaxLine, Expense, ExpenseType, FgtsCompetence, InvoiceItem, ItemTax,
};

/// AI entitlement tier of a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AiPlan {
    /// Header fields only.
    #[default]
    Basic,
    /// Header fields plus line items and tax compositions.
    Complete,
}

impl std::str::FromStr for AiPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASIC" => Ok(AiPlan::Basic),
            "COMPLETE" => Ok(AiPlan::Complete),
            other => Err(format!("unknown AI plan: {other}")),
        }
    }
}

/// Keys of the serialized expense that the model must not fill.
const RESERVED_KEYS: [&str; 2] = ["expenseType", "companyId"];

/// Build the prompt asking for `expense_type` out of `text`.
pub fn build_prompt(plan: AiPlan, expense_type: ExpenseType, text: &str) -> String {
    let template = json_template(plan, expense_type)
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| "{}".to_string());

    let plan_rule = match plan {
        AiPlan::Basic => "- Fill the header fields only; line items and compositions are not needed.",
        AiPlan::Complete => {
            "- List every line item, item tax and tax composition entry found in the document."
        }
    };

    format!(
        "Extract the data of this Brazilian fiscal document ({code}) and answer with a single \
         JSON object shaped like the template below. Use the template as a mold only: do not \
         copy its values, fill in what the text actually says.\n\
         \n\
         Rules:\n\
         - Dates as yyyy-MM-dd.\n\
         - Amounts as plain numbers with a dot as the decimal separator.\n\
         - CPF/CNPJ values as digits only. issuerId belongs to the issuer of the document, \
         not to the carrier, unless the carrier issued it.\n\
         - Look for \"Nº\", \"Número\" and \"Série\" to fill number and series.\n\
         {plan_rule}\n\
         - Use null for any field that is not in the text.\n\
         - Answer with the JSON object only, without comments or explanations.\n\
         \n\
         ### Document text:\n\
         {text}\n\
         \n\
         ### JSON template:\n\
         {template}\n",
        code = expense_type.code(),
    )
}

/// JSON template of the schema of `expense_type`, shaped for `plan`.
pub fn json_template(plan: AiPlan, expense_type: ExpenseType) -> Option<Value> {
    let expense = Expense::empty(expense_type)?;
    let Value::Object(fields) = serde_json::to_value(expense).ok()? else {
        return None;
    };
    let sample = list_sample(expense_type);

    let template: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| match (value, plan) {
            (Value::Array(_), AiPlan::Basic) => None,
            (Value::Array(_), AiPlan::Complete) => {
                let element = sample.clone().unwrap_or(Value::Null);
                Some((key, Value::Array(vec![element])))
            }
            (value, _) => Some((key, value)),
        })
        .collect();

    Some(Value::Object(template))
}

/// One empty element of the list field of a schema.
fn list_sample(expense_type: ExpenseType) -> Option<Value> {
    let sample = match expense_type {
        ExpenseType::Nfe | ExpenseType::Nf3e | ExpenseType::Nfce => {
            serde_json::to_value(InvoiceItem {
                taxes: vec![ItemTax::default()],
                ..InvoiceItem::default()
            })
        }
        ExpenseType::Fatura => serde_json::to_value(BillItem::default()),
        ExpenseType::Darf => serde_json::to_value(DarfTaxLine::default()),
        ExpenseType::Fgts => serde_json::to_value(FgtsCompetence::default()),
        _ => return None,
    };
    sample.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_template_has_no_lists() {
        let template = json_template(AiPlan::Basic, ExpenseType::Nfe).unwrap();
        assert!(template.get("items").is_none());
        assert!(template.get("expenseType").is_none());
        assert!(template.get("companyId").is_none());
        assert!(template.get("accessKey").is_some());
        assert!(template.get("totalValue").is_some());
    }

    #[test]
    fn test_complete_template_samples_lists() {
        let template = json_template(AiPlan::Complete, ExpenseType::Nf3e).unwrap();
        let items = template["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0]["taxes"].as_array().is_some_and(|t| t.len() == 1));
        assert!(template.get("meterNumber").is_some());

        let darf = json_template(AiPlan::Complete, ExpenseType::Darf).unwrap();
        assert!(darf["composition"][0].get("revenueCode").is_some());
    }

    #[test]
    fn test_no_template_for_unclassified() {
        assert!(json_template(AiPlan::Basic, ExpenseType::Outro).is_none());
    }

    #[test]
    fn test_prompt_carries_text_and_tier() {
        let basic = build_prompt(AiPlan::Basic, ExpenseType::Boleto, "Nosso Número 123");
        assert!(basic.contains("(BOLETO)"));
        assert!(basic.contains("Nosso Número 123"));
        assert!(basic.contains("header fields only"));
        assert!(basic.contains("\"ourNumber\""));

        let complete = build_prompt(AiPlan::Complete, ExpenseType::Fatura, "Fatura");
        assert!(complete.contains("every line item"));
        assert!(complete.contains("\"itemTotal\""));
    }

    #[test]
    fn test_plan_names() {
        assert_eq!("complete".parse::<AiPlan>(), Ok(AiPlan::Complete));
        assert_eq!(serde_json::to_string(&AiPlan::Basic).unwrap(), r#""BASIC""#);
    }
}
