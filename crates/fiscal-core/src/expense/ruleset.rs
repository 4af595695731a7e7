//! Per-(expense type, region) pattern rules with a DEFAULT fallback.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::expense::ExpenseType;

/// Region key of the fallback rule set.
pub const DEFAULT_REGION: &str = "DEFAULT";

/// Regex per templated field. A blank pattern means "not defined here".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternRule {
    pub issue_date: String,
    pub due_date: String,
    pub total_value: String,
    pub issuer_id: String,
    pub issuer_name: String,
    pub recipient_id: String,
    pub number: String,
    pub series: String,
}

impl PatternRule {
    /// Fill every blank field from `fallback`.
    pub fn merged_over(&self, fallback: &PatternRule) -> PatternRule {
        fn pick(own: &str, fallback: &str) -> String {
            let chosen = if own.trim().is_empty() { fallback } else { own };
            chosen.to_string()
        }

        PatternRule {
            issue_date: pick(&self.issue_date, &fallback.issue_date),
            due_date: pick(&self.due_date, &fallback.due_date),
            total_value: pick(&self.total_value, &fallback.total_value),
            issuer_id: pick(&self.issuer_id, &fallback.issuer_id),
            issuer_name: pick(&self.issuer_name, &fallback.issuer_name),
            recipient_id: pick(&self.recipient_id, &fallback.recipient_id),
            number: pick(&self.number, &fallback.number),
            series: pick(&self.series, &fallback.series),
        }
    }
}

/// Resolves the pattern rule for an expense type in a region.
pub trait RuleResolver: Send + Sync {
    /// Region-specific rule merged field by field over the type's DEFAULT
    /// rule. Fails only when neither exists.
    fn lookup(&self, expense_type: ExpenseType, region: &str) -> Result<PatternRule, ExtractionError>;
}

/// One entry of a JSON rule file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub expense_type: ExpenseType,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(flatten)]
    pub rule: PatternRule,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// In-memory rule store. Lookups take a read lock only for the copy-out.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RwLock<HashMap<(ExpenseType, String), PatternRule>>,
}

impl RuleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a DEFAULT rule for every schema.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        for expense_type in ExpenseType::SCHEMAS {
            store.insert(expense_type, DEFAULT_REGION, default_rule(expense_type));
        }
        store
    }

    /// Load rule entries from a JSON array over the built-in defaults.
    pub fn from_json(json: &str) -> Result<Self, ExtractionError> {
        let store = Self::with_defaults();
        store.load_json(json)?;
        Ok(store)
    }

    /// Load rule entries from a JSON file over the built-in defaults.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        info!("Loaded pattern rules from {}", path.display());
        Ok(store)
    }

    /// Add entries from a JSON array.
    ///
    /// An entry for a (type, region) already present is merged over the
    /// stored rule, so a partial DEFAULT entry keeps the built-in patterns
    /// it does not name.
    pub fn load_json(&self, json: &str) -> Result<usize, ExtractionError> {
        let entries: Vec<RuleEntry> =
            serde_json::from_str(json).map_err(|e| ExtractionError::InvalidRules(e.to_string()))?;
        if let Some(entry) = entries.iter().find(|e| !e.expense_type.has_schema()) {
            return Err(ExtractionError::InvalidRules(format!(
                "{} has no expense schema",
                entry.expense_type
            )));
        }

        let count = entries.len();
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        for entry in entries {
            let key = (entry.expense_type, entry.region);
            let rule = match rules.get(&key) {
                Some(existing) => entry.rule.merged_over(existing),
                None => entry.rule,
            };
            rules.insert(key, rule);
        }
        debug!("Loaded {} rule entries", count);
        Ok(count)
    }

    /// Add or replace the rule for (type, region).
    pub fn insert(&self, expense_type: ExpenseType, region: &str, rule: PatternRule) {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        rules.insert((expense_type, region.to_string()), rule);
    }

    /// Remove the rule for (type, region).
    pub fn remove(&self, expense_type: ExpenseType, region: &str) -> Option<PatternRule> {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        rules.remove(&(expense_type, region.to_string()))
    }

    /// Number of stored rules.
    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RuleResolver for RuleStore {
    fn lookup(&self, expense_type: ExpenseType, region: &str) -> Result<PatternRule, ExtractionError> {
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        let exact = rules.get(&(expense_type, region.to_string()));
        let fallback = rules.get(&(expense_type, DEFAULT_REGION.to_string()));

        match (exact, fallback) {
            (Some(exact), Some(fallback)) => Ok(exact.merged_over(fallback)),
            (Some(rule), None) | (None, Some(rule)) => Ok(rule.clone()),
            (None, None) => Err(ExtractionError::UnresolvedRuleSet {
                expense_type,
                region: region.to_string(),
            }),
        }
    }
}

const ISSUE_DATE: &str =
    r"(?:Data\s+(?:de\s+)?Emiss[aã]o|Emitid[ao]\s+em|Emiss[aã]o)[:\s]*(\d{2}/\d{2}/\d{4})";
const DUE_DATE: &str = r"(?:Data\s+de\s+)?Vencimento[:\s]*(\d{2}/\d{2}/\d{4})";
const TOTAL_VALUE: &str = r"(?:Valor\s+Total(?:\s+da\s+Nota)?|Total\s+a\s+Pagar|Valor\s+a\s+Pagar)[:\s]*R?\$?\s*([0-9.]*[0-9],[0-9]{2})";
const ISSUER_ID: &str = r"(?:CNPJ|CPF)(?:/(?:CNPJ|CPF|MF))?[:\s]*(\d{2,3}\.?\d{3}\.?\d{3}[/\-]?\d{2,4}-?\d{0,2})";
const ISSUER_NAME: &str = r"(?:Raz[aã]o\s+Social|Nome\s*/\s*Raz[aã]o\s+Social|Emitente)[:\s]*([^\n]+)";
const RECIPIENT_ID: &str = r"(?:Destinat[aá]rio|Tomador|Pagador)[^\n]*?(?:CNPJ|CPF)(?:/(?:CNPJ|CPF))?[:\s]*(\d[0-9./\-]{9,18}\d)";
const INVOICE_NUMBER: &str = r"(?:N[º°o]\.?|N[uú]mero(?:\s+da\s+Nota)?)[:\s]*([0-9][0-9.]*)";
const SERIES: &str = r"S[ée]rie[:\s]*(\d+)";

/// Built-in DEFAULT rule for a schema.
pub fn default_rule(expense_type: ExpenseType) -> PatternRule {
    let base = PatternRule {
        issue_date: ISSUE_DATE.to_string(),
        due_date: DUE_DATE.to_string(),
        total_value: TOTAL_VALUE.to_string(),
        issuer_id: ISSUER_ID.to_string(),
        issuer_name: ISSUER_NAME.to_string(),
        recipient_id: RECIPIENT_ID.to_string(),
        number: INVOICE_NUMBER.to_string(),
        series: SERIES.to_string(),
    };

    match expense_type {
        ExpenseType::Nfe | ExpenseType::Nfce | ExpenseType::Nf3e => base,
        ExpenseType::Nfse => PatternRule {
            issuer_name: r"(?:Prestador\s+de\s+Servi[cç]os?|Raz[aã]o\s+Social)[:\s]*([^\n]+)".to_string(),
            number: r"N[uú]mero\s+da\s+(?:NFS-?e|Nota)[:\s]*([0-9]+)".to_string(),
            total_value: r"Valor\s+(?:Total\s+)?(?:dos\s+Servi[cç]os|da\s+Nota)[:\s]*R?\$?\s*([0-9.]*[0-9],[0-9]{2})".to_string(),
            ..base
        },
        ExpenseType::Cte => PatternRule {
            total_value: r"Valor\s+Total\s+(?:da\s+)?(?:Presta[cç][aã]o|do\s+Servi[cç]o)[:\s]*R?\$?\s*([0-9.]*[0-9],[0-9]{2})".to_string(),
            ..base
        },
        ExpenseType::Boleto => PatternRule {
            issuer_name: r"(?m)(?:Benefici[aá]rio|Cedente)[:\s]*([^\n]+?)(?:[ \t]+(?:CNPJ|CPF)\b|[ \t]*$)".to_string(),
            total_value: r"Valor\s+(?:do\s+)?Documento[:\s]*R?\$?\s*([0-9.]*[0-9],[0-9]{2})".to_string(),
            number: r"N[uú]mero\s+do\s+Documento[:\s]*(\S+)".to_string(),
            series: String::new(),
            ..base
        },
        ExpenseType::Fatura => PatternRule {
            number: r"(?:N[uú]mero\s+da\s+Fatura|Fatura\s+N[º°o]?)[:\s]*([0-9][0-9./\-]*)".to_string(),
            series: String::new(),
            ..base
        },
        ExpenseType::Darf | ExpenseType::Fgts | ExpenseType::Gps => PatternRule {
            issue_date: ISSUE_DATE.to_string(),
            number: String::new(),
            series: String::new(),
            ..PatternRule::default()
        },
        ExpenseType::Outro => PatternRule::default(),
    }
}
