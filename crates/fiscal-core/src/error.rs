//! Error types for the fiscal-core library.

use thiserror::Error;

use crate::models::expense::ExpenseType;

/// Main error type for the fiscal library.
#[derive(Error, Debug)]
pub enum FiscalError {
    /// Expense extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Generative backend error.
    #[error("generative backend error: {0}")]
    Generative(#[from] GenerativeError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a document into an expense.
///
/// Missing or unparseable fields are never errors; they surface as `None`
/// on the produced expense.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Neither a region-specific nor a DEFAULT rule set exists for the type.
    #[error("no pattern rules for {expense_type} (region {region}) and no DEFAULT fallback")]
    UnresolvedRuleSet {
        expense_type: ExpenseType,
        region: String,
    },

    /// The document was classified as OUTRO and has no schema.
    #[error("document could not be classified into an expense type")]
    Unclassified,

    /// Text is blank or too short; the document should go back to OCR.
    #[error("document text unavailable ({length} chars), resubmit for OCR")]
    TextUnavailable { length: usize },

    /// The backend cannot produce the requested expense type.
    #[error("expense type {0} is not supported by this extractor")]
    UnsupportedType(ExpenseType),

    /// A rule set could not be loaded.
    #[error("invalid rule set: {0}")]
    InvalidRules(String),
}

/// Errors from generative (LLM) extraction backends.
#[derive(Error, Debug)]
pub enum GenerativeError {
    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The provider answered without any content.
    #[error("empty response from provider")]
    EmptyResponse,

    /// The response envelope did not have the expected shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The generated JSON did not match the target expense schema.
    #[error("generated JSON does not match {expense_type} schema: {reason}")]
    Schema {
        expense_type: ExpenseType,
        reason: String,
    },

    /// The selected provider has no endpoint or key configured.
    #[error("provider {0} is not configured")]
    NotConfigured(String),
}

/// Result type for the fiscal library.
pub type Result<T> = std::result::Result<T, FiscalError>;
