//! Extract command - turn a single document text into an expense.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use fiscal_core::{
    classify, format_fiscal_id, AiPlan, AiProvider, Document, EngineConfig, Expense, ExpenseType,
    ExtractionRouter, TenantPolicy,
};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    #[command(flatten)]
    options: ExtractOptions,
}

/// Routing options shared by `extract` and `batch`.
#[derive(Args, Clone)]
pub struct ExtractOptions {
    /// Expense type; classified from the text when omitted
    #[arg(short = 't', long = "type")]
    expense_type: Option<ExpenseType>,

    /// Region (IBGE municipality) code; the configured default when omitted
    #[arg(short, long)]
    region: Option<String>,

    /// Owning company identifier
    #[arg(long, default_value = "local")]
    company: String,

    /// Additional pattern rule file (JSON)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Enable generative extraction on this plan (basic, complete)
    #[arg(long)]
    ai_plan: Option<AiPlan>,

    /// Generative provider (openai, gemini, mock)
    #[arg(long)]
    provider: Option<AiProvider>,

    /// Fail instead of falling back to rules when the AI call fails
    #[arg(long, requires = "ai_plan")]
    ai_only: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

impl ExtractOptions {
    /// Router built from `config` with the command-line rule file and
    /// provider applied.
    pub fn router(&self, mut config: EngineConfig) -> anyhow::Result<ExtractionRouter> {
        if let Some(rules) = &self.rules {
            config.rules.path = Some(rules.clone());
        }
        if let Some(provider) = self.provider {
            config.ai.provider = provider;
        }
        Ok(ExtractionRouter::from_config(config)?)
    }

    pub fn policy(&self) -> TenantPolicy {
        let mut policy = match self.ai_plan {
            Some(plan) => TenantPolicy::ai(plan),
            None => TenantPolicy::rules_only(),
        };
        if let Some(provider) = self.provider {
            policy = policy.with_provider(provider);
        }
        policy.with_ai_only(self.ai_only)
    }

    /// Document for `text`, classifying it unless a type was given.
    pub fn document(&self, text: String) -> Document {
        let expense_type = self.expense_type.unwrap_or_else(|| classify(&text));
        let region = self.region.clone().unwrap_or_default();
        Document::new(text, expense_type, region, self.company.clone())
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let router = args.options.router(config)?;
    let text = fs::read_to_string(&args.input)?;
    let document = args.options.document(text);
    debug!("Document type: {}", document.expense_type);

    let expense = router
        .extract_with_policy(&document, &args.options.policy())
        .await?;

    let output = format_expense(&expense, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_expense(expense: &Expense, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(expense)?),
        OutputFormat::Csv => format_csv(expense),
        OutputFormat::Text => Ok(format_text(expense)),
    }
}

/// Columns shared by per-file CSV output and the batch summary.
pub const EXPENSE_COLUMNS: [&str; 10] = [
    "expense_type",
    "number",
    "series",
    "issue_date",
    "due_date",
    "issuer_name",
    "issuer_id",
    "recipient_id",
    "total_value",
    "company_id",
];

pub fn expense_row(expense: &Expense) -> [String; 10] {
    let header = expense.header();
    [
        expense.expense_type().to_string(),
        header.number.clone().unwrap_or_default(),
        header.series.clone().unwrap_or_default(),
        header.issue_date.map(|d| d.to_string()).unwrap_or_default(),
        header.due_date.map(|d| d.to_string()).unwrap_or_default(),
        header.issuer_name.clone().unwrap_or_default(),
        header.issuer_id.clone().unwrap_or_default(),
        header.recipient_id.clone().unwrap_or_default(),
        header
            .total_value
            .map(|v| v.to_string())
            .unwrap_or_default(),
        header.company_id.clone().unwrap_or_default(),
    ]
}

fn format_csv(expense: &Expense) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(EXPENSE_COLUMNS)?;
    wtr.write_record(expense_row(expense))?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(expense: &Expense) -> String {
    let header = expense.header();
    let mut output = String::new();

    output.push_str(&format!("Type: {}\n", expense.expense_type()));
    if let Some(number) = &header.number {
        match &header.series {
            Some(series) => output.push_str(&format!("Number: {} (series {})\n", number, series)),
            None => output.push_str(&format!("Number: {}\n", number)),
        }
    }
    if let Some(date) = header.issue_date {
        output.push_str(&format!("Issued: {}\n", date.format("%d/%m/%Y")));
    }
    if let Some(date) = header.due_date {
        output.push_str(&format!("Due: {}\n", date.format("%d/%m/%Y")));
    }
    output.push('\n');

    output.push_str("Issuer:\n");
    output.push_str(&format!(
        "  {}\n",
        header.issuer_name.as_deref().unwrap_or("-")
    ));
    if let Some(id) = &header.issuer_id {
        output.push_str(&format!("  CPF/CNPJ: {}\n", format_fiscal_id(id)));
    }
    if let Some(id) = &header.recipient_id {
        output.push_str(&format!("Recipient: {}\n", format_fiscal_id(id)));
    }
    if let Some(key) = expense.access_key() {
        output.push_str(&format!("Access key: {}\n", key));
    }
    output.push('\n');

    match header.total_value {
        Some(total) => output.push_str(&format!("Total: R$ {}\n", total)),
        None => output.push_str("Total: -\n"),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ExtractOptions {
        ExtractOptions {
            expense_type: None,
            region: None,
            company: "acme".to_string(),
            rules: None,
            ai_plan: None,
            provider: None,
            ai_only: false,
        }
    }

    #[test]
    fn test_policy_from_options() {
        assert_eq!(options().policy(), TenantPolicy::rules_only());

        let ai = ExtractOptions {
            ai_plan: Some(AiPlan::Complete),
            provider: Some(AiProvider::Mock),
            ai_only: true,
            ..options()
        };
        assert_eq!(
            ai.policy(),
            TenantPolicy::ai(AiPlan::Complete)
                .with_provider(AiProvider::Mock)
                .with_ai_only(true)
        );
    }

    #[test]
    fn test_document_type_override() {
        let text = "Documento de Arrecadação de Receitas Federais".to_string();
        let forced = ExtractOptions {
            expense_type: Some(ExpenseType::Gps),
            ..options()
        };
        assert_eq!(forced.document(text).expense_type, ExpenseType::Gps);
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let mut expense = Expense::empty(ExpenseType::Boleto).unwrap();
        expense.header_mut().number = Some("42".to_string());

        let csv = format_expense(&expense, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("expense_type,number"));
        assert!(lines[1].starts_with("BOLETO,42"));
    }
}
