//! Generative (LLM) extraction backends.
//!
//! Providers only turn a prompt into text. Prompting, JSON recovery and
//! decoding into the target schema are shared by [`GenerativeExtractor`],
//! so every provider yields the same concrete expense shapes as the
//! rule-based path.
//!
//! Supported providers:
//! - **OpenAI**: chat completions with bearer auth.
//! - **Gemini**: generate-content with a query-string key.
//! - **Mock**: canned responses, for tests.

mod gemini;
mod mock;
mod openai;
pub mod parsing;
pub mod prompt;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use prompt::{build_prompt, AiPlan};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::GenerativeError;
use crate::expense::ExpenseExtractor;
use crate::models::config::{AiConfig, AiProvider};
use crate::models::document::Document;
use crate::models::expense::{Expense, ExpenseType};

/// A provider that completes a prompt.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw model text.
    async fn complete(&self, prompt: &str) -> Result<String, GenerativeError>;
}

/// Unified generative client with enum dispatch.
#[derive(Clone)]
pub enum AiClient {
    OpenAi(OpenAiBackend),
    Gemini(GeminiBackend),
    Mock(MockBackend),
}

impl AiClient {
    /// Build the client for `provider` from configuration.
    pub fn from_config(provider: AiProvider, config: &AiConfig) -> Result<Self, GenerativeError> {
        match provider {
            AiProvider::OpenAi => OpenAiBackend::from_config(config).map(AiClient::OpenAi),
            AiProvider::Gemini => GeminiBackend::from_config(config).map(AiClient::Gemini),
            AiProvider::Mock => Ok(AiClient::Mock(MockBackend::new())),
        }
    }

    /// Mock client answering `response`.
    pub fn mock(response: impl Into<String>) -> Self {
        AiClient::Mock(MockBackend::with_response(response))
    }

    pub fn provider(&self) -> AiProvider {
        match self {
            AiClient::OpenAi(_) => AiProvider::OpenAi,
            AiClient::Gemini(_) => AiProvider::Gemini,
            AiClient::Mock(_) => AiProvider::Mock,
        }
    }
}

#[async_trait]
impl GenerativeBackend for AiClient {
    fn name(&self) -> &str {
        match self {
            AiClient::OpenAi(b) => b.name(),
            AiClient::Gemini(b) => b.name(),
            AiClient::Mock(b) => b.name(),
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerativeError> {
        match self {
            AiClient::OpenAi(b) => b.complete(prompt).await,
            AiClient::Gemini(b) => b.complete(prompt).await,
            AiClient::Mock(b) => b.complete(prompt).await,
        }
    }
}

/// HTTP client carrying the configured connect and response timeouts.
pub(crate) fn http_client(config: &AiConfig) -> Result<Client, GenerativeError> {
    Ok(Client::builder()
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .timeout(Duration::from_millis(config.response_timeout_ms))
        .build()?)
}

/// Extracts expenses by prompting a generative backend.
#[derive(Clone)]
pub struct GenerativeExtractor {
    client: AiClient,
    plan: AiPlan,
    max_input_chars: usize,
}

impl GenerativeExtractor {
    pub fn new(client: AiClient, plan: AiPlan, max_input_chars: usize) -> Self {
        Self {
            client,
            plan,
            max_input_chars,
        }
    }

    /// Use a different entitlement tier.
    pub fn with_plan(mut self, plan: AiPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn client(&self) -> &AiClient {
        &self.client
    }

    /// Extract `expense_type` from raw document text.
    ///
    /// The returned expense has no company id; the caller owns that field.
    pub async fn extract_text(
        &self,
        raw_text: &str,
        expense_type: ExpenseType,
    ) -> Result<Expense, GenerativeError> {
        if !expense_type.has_schema() {
            return Err(GenerativeError::Schema {
                expense_type,
                reason: "unclassified documents have no schema".to_string(),
            });
        }

        let text = truncate_chars(raw_text, self.max_input_chars);
        info!(
            "Requesting {} extraction from {} ({:?} plan, {} chars)",
            expense_type,
            self.client.name(),
            self.plan,
            text.chars().count()
        );

        let prompt = build_prompt(self.plan, expense_type, text);
        let response = self.client.complete(&prompt).await?;
        debug!("{} answered {} chars", self.client.name(), response.len());

        let json = parsing::extract_json_object(&response)?;
        Expense::from_generated_json(expense_type, json)
    }
}

#[async_trait]
impl ExpenseExtractor for GenerativeExtractor {
    async fn extract(&self, document: &Document) -> crate::error::Result<Expense> {
        let mut expense = self
            .extract_text(&document.text, document.expense_type)
            .await?;
        expense.header_mut().company_id = Some(document.company_id.clone());
        Ok(expense)
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn extractor(response: &str) -> GenerativeExtractor {
        GenerativeExtractor::new(AiClient::mock(response), AiPlan::Basic, 65_500)
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("ação", 10), "ação");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[tokio::test]
    async fn test_generated_json_decodes_into_schema() {
        let response = r#"Aqui está:
```json
{"expenseType": "NFE", "number": "123", "totalValue": "1.234,56",
 "issueDate": "15/03/2025", "accessKey": null, "items": null}
```"#;
        let expense = extractor(response)
            .extract_text("DANFE ...", ExpenseType::Nfe)
            .await
            .unwrap();

        assert_eq!(expense.expense_type(), ExpenseType::Nfe);
        assert_eq!(expense.header().number.as_deref(), Some("123"));
        assert_eq!(expense.header().total_value, Some(Decimal::new(123456, 2)));
        assert_eq!(expense.header().issue_date, NaiveDate::from_ymd_opt(2025, 3, 15));
    }

    #[tokio::test]
    async fn test_document_extraction_sets_company() {
        let document = Document::new("Boleto bancário", ExpenseType::Boleto, "DEFAULT", "acme");
        let expense = extractor(r#"{"ourNumber": "42"}"#)
            .extract(&document)
            .await
            .unwrap();

        assert_eq!(expense.header().company_id.as_deref(), Some("acme"));
        let Expense::BankSlip(slip) = expense else {
            panic!("expected bank slip");
        };
        assert_eq!(slip.our_number.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_unclassified_is_rejected_before_prompting() {
        let client = MockBackend::new();
        let extractor = GenerativeExtractor::new(AiClient::Mock(client.clone()), AiPlan::Basic, 10);

        assert!(matches!(
            extractor.extract_text("texto", ExpenseType::Outro).await,
            Err(GenerativeError::Schema { .. })
        ));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_schema_mismatch() {
        let result = extractor(r#"{"items": "not a list"}"#)
            .extract_text("Fatura", ExpenseType::Fatura)
            .await;
        assert!(matches!(
            result,
            Err(GenerativeError::Schema {
                expense_type: ExpenseType::Fatura,
                ..
            })
        ));
    }

    #[test]
    fn test_mock_provider_needs_no_key() {
        let client = AiClient::from_config(AiProvider::Mock, &AiConfig::default()).unwrap();
        assert_eq!(client.provider(), AiProvider::Mock);
        assert!(AiClient::from_config(AiProvider::OpenAi, &AiConfig::default()).is_err());
    }
}
