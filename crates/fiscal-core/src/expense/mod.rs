//! Expense classification and extraction.

pub mod classifier;
pub mod extractors;
pub mod router;
pub mod rules;
pub mod ruleset;

pub use classifier::classify;
pub use extractors::{extract_with_rule, RuleBasedExtractor};
pub use router::{Backend, ExtractionRouter, TenantPolicy};
pub use ruleset::{PatternRule, RuleResolver, RuleStore, DEFAULT_REGION};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::document::Document;
use crate::models::expense::Expense;

/// A backend that turns a classified document into a typed expense.
#[async_trait]
pub trait ExpenseExtractor: Send + Sync {
    /// Extract the expense matching `document.expense_type`.
    async fn extract(&self, document: &Document) -> Result<Expense>;
}
